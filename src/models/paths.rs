//! Path records.
//!
//! Git only knows `TrackedPath::repo_path` and `SymlinkedPath::real_repo_path`;
//! results are always reported under the subtree-relative names.

/// A path listed in the repository index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPath {
    pub repo_path: String,
    /// Relative to the queried subtree, empty when equal to the subtree root
    pub subtree_path: String,
}

/// A file reached by walking through a tracked symlink to a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkedPath {
    /// `<symlink>/<path inside target>`, as seen in the working tree
    pub virtual_repo_path: String,
    pub virtual_subtree_path: String,
    /// Canonical location relative to the canonical repository root
    pub real_repo_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateFile {
    Tracked(TrackedPath),
    Symlinked(SymlinkedPath),
}

impl CandidateFile {
    /// Key the commit time is reported under.
    pub fn subtree_path(&self) -> &str {
        match self {
            CandidateFile::Tracked(p) => &p.subtree_path,
            CandidateFile::Symlinked(p) => &p.virtual_subtree_path,
        }
    }

    /// Path to look up in commit history.
    pub fn history_path(&self) -> &str {
        match self {
            CandidateFile::Tracked(p) => &p.repo_path,
            CandidateFile::Symlinked(p) => &p.real_repo_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symlinked_file_reports_virtual_but_queries_real() {
        let file = CandidateFile::Symlinked(SymlinkedPath {
            virtual_repo_path: "docs/link/file.txt".to_string(),
            virtual_subtree_path: "link/file.txt".to_string(),
            real_repo_path: "realdir/file.txt".to_string(),
        });

        assert_eq!(file.subtree_path(), "link/file.txt");
        assert_eq!(file.history_path(), "realdir/file.txt");
    }

    #[test]
    fn test_tracked_file_paths() {
        let file = CandidateFile::Tracked(TrackedPath {
            repo_path: "docs/a.md".to_string(),
            subtree_path: "a.md".to_string(),
        });

        assert_eq!(file.subtree_path(), "a.md");
        assert_eq!(file.history_path(), "docs/a.md");
    }
}
