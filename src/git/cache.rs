//! Persistent commit-time cache.
//!
//! One JSON file per `(repo_root, subtree)` query, kept inside the
//! repository's git directory so it travels with the checkout but never shows
//! up in the index. An entry is served only when the repository history and
//! the exact path set still match what it was computed for:
//! - `first_commit_id`: changes when history is rewritten
//! - `head_commit_id`: changes when commits are added
//! - `sorted_paths`: changes when filters or the tree change
//!
//! Writes go to a process-unique temp file that is renamed over the entry,
//! so concurrent readers see either the old or the new file, never a partial one.

use git2::{ObjectType, Oid};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{CACHE_FORMAT_VERSION, CacheEntry};

pub const CACHE_DIR_NAME: &str = "git-times";

pub struct CommitCache {
    dir: PathBuf,
}

impl CommitCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache stored under a repository's git directory.
    pub fn in_control_dir(control_dir: &Path) -> Self {
        Self::new(control_dir.join(CACHE_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for one query.
    pub fn entry_path(&self, repo_root: &str, subtree: &str) -> PathBuf {
        let key = format!("{}\0{}", repo_root, subtree);
        let name = match Oid::hash_object(ObjectType::Blob, key.as_bytes()) {
            Ok(oid) => oid.to_string(),
            // hashing in-memory bytes does not fail in practice
            Err(_) => sanitize(&key),
        };
        self.dir.join(format!("{}.json", name))
    }

    /// Cached `path -> epoch` map if the stored entry is still valid.
    pub fn lookup(
        &self,
        repo_root: &str,
        subtree: &str,
        first_commit_id: &str,
        head_commit_id: &str,
        sorted_paths: &[String],
    ) -> Option<BTreeMap<String, i64>> {
        let path = self.entry_path(repo_root, subtree);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No commit cache at {}: {}", path.display(), e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring unreadable commit cache {}: {}", path.display(), e);
                return None;
            }
        };

        let reason = if entry.version != CACHE_FORMAT_VERSION {
            Some("format version")
        } else if entry.repo_root != repo_root || entry.subtree != subtree {
            Some("query")
        } else if entry.first_commit_id != first_commit_id {
            Some("first commit")
        } else if entry.head_commit_id != head_commit_id {
            Some("HEAD")
        } else if entry.sorted_paths != sorted_paths {
            Some("path set")
        } else {
            None
        };

        if let Some(reason) = reason {
            tracing::debug!("Commit cache miss for {}: {} changed", subtree, reason);
            return None;
        }

        tracing::info!(
            "Commit cache hit for {}: {} paths",
            subtree,
            entry.path_to_epoch.len()
        );
        Some(entry.path_to_epoch)
    }

    /// Replace the stored entry for the entry's query.
    pub fn store(&self, entry: &CacheEntry) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.entry_path(&entry.repo_root, &entry.subtree);
        let tmp_path = path.with_extension(format!("{}.tmp", std::process::id()));

        let content = serde_json::to_vec(entry)?;
        if let Err(e) = fs::write(&tmp_path, content).and_then(|_| fs::rename(&tmp_path, &path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::debug!("Saved commit cache to {}", path.display());
        Ok(())
    }

    /// Remove the entry for one query. Returns whether there was one.
    pub fn clear(&self, repo_root: &str, subtree: &str) -> Result<bool> {
        match fs::remove_file(self.entry_path(repo_root, subtree)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
