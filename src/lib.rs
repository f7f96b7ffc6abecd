//! Latest commit time for every tracked file under a repository subtree.
//!
//! ```no_run
//! use git_times::{FindOptions, GitTimes};
//!
//! let mut times = GitTimes::open("/path/to/repo", "/path/to/repo/docs")?;
//! for (path, epoch) in times.find(&FindOptions::default())? {
//!     println!("{path}: {epoch}");
//! }
//! # Ok::<(), git_times::GitTimesError>(())
//! ```
//!
//! Files inside tracked directory symlinks are reported under the symlinked
//! path with the history of their real location. Results are cached in the
//! repository's git directory until history or the file set changes.

pub mod error;
pub mod filter;
pub mod git;
pub mod models;
pub mod output;
pub mod paths;
pub mod symlinks;
pub mod times;

pub use error::{GitTimesError, Result};
pub use filter::PathFilter;
pub use git::{CommitCache, GitPlumbing, GitRepository};
pub use times::{CommitTimes, FindOptions, GitTimes};
