use serde::{Deserialize, Serialize};

/// One commit visited by the history walk, limited to the requested paths it touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitChange {
    pub commit_id: String,
    /// Committer time, UTC epoch seconds
    pub timestamp: i64,
    pub paths: Vec<String>,
}
