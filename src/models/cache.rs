use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CACHE_FORMAT_VERSION: u32 = 1;

/// On-disk commit cache record for one `(repo_root, subtree)` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: u32,
    pub repo_root: String,
    pub subtree: String,
    /// Oldest commit reachable from HEAD
    pub first_commit_id: String,
    pub head_commit_id: String,
    pub sorted_paths: Vec<String>,
    pub path_to_epoch: BTreeMap<String, i64>,
}
