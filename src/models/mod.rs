//! Plain data types passed between the resolver's components.
//!
//! - `paths`: TrackedPath, SymlinkedPath, CandidateFile
//! - `commit`: CommitChange reported by the history walk
//! - `cache`: CacheEntry persisted by the commit cache

pub mod cache;
pub mod commit;
pub mod paths;

pub use cache::*;
pub use commit::*;
pub use paths::*;
