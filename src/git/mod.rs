//! Git plumbing used by the resolver.
//!
//! `GitPlumbing` is the seam between the orchestrator and the repository;
//! `GitRepository` implements it on top of git2. The commit cache lives here
//! too since it is stored inside the repository's git directory.

pub mod cache;
pub mod history;
pub mod repository;

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::CommitChange;

pub use cache::CommitCache;
pub use repository::GitRepository;

/// Read-only operations on one repository.
pub trait GitPlumbing {
    /// Repo-relative paths of every index entry, like `git ls-files`.
    fn list_tracked_files(&self) -> Result<Vec<String>>;

    /// Oldest commit reachable from HEAD, `None` on an unborn branch.
    fn first_reachable_commit(&self) -> Result<Option<String>>;

    fn head_commit(&self) -> Result<Option<String>>;

    /// Every commit reachable from HEAD that touched any of `paths`, with
    /// the touched subset and the commit time.
    fn commit_times_for(&self, paths: &HashSet<String>, debug: bool) -> Result<Vec<CommitChange>>;

    /// The repository's git directory.
    fn control_dir(&self) -> PathBuf;
}
