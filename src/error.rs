//! Resolver error types.
//!
//! Only two families ever abort `GitTimes::find`:
//! - configuration errors (`RepoNotFound`, `NotWorkTree`, `SubtreeOutsideRepo`,
//!   `InvalidPattern`, `InvalidPath`)
//! - plumbing failures (`Git`)
//!
//! `Io` and `Serialize` only come out of the commit cache, whose failures the
//! orchestrator logs and swallows.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitTimesError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Repository has no working tree: {0}")]
    NotWorkTree(String),

    #[error("Subtree {} is outside repository {}", subtree.display(), root.display())]
    SubtreeOutsideRepo { subtree: PathBuf, root: PathBuf },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid path {}: {source}", path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl GitTimesError {
    /// True for errors caused by the caller's arguments rather than the repository.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GitTimesError::RepoNotFound(_)
                | GitTimesError::NotWorkTree(_)
                | GitTimesError::SubtreeOutsideRepo { .. }
                | GitTimesError::InvalidPattern { .. }
                | GitTimesError::InvalidPath { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GitTimesError>;
