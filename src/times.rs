//! The resolver entry point.
//!
//! `GitTimes` ties the pieces together for one `(repository, subtree)` pair:
//! list the index, filter, expand directory symlinks, then either serve the
//! cached result or walk history and keep the latest commit time per file.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GitTimesError, Result};
use crate::filter::PathFilter;
use crate::git::{CommitCache, GitPlumbing, GitRepository};
use crate::models::{CACHE_FORMAT_VERSION, CacheEntry, CandidateFile, TrackedPath};
use crate::paths::{SubtreePaths, to_slash};
use crate::symlinks;

/// Subtree-relative path -> latest commit time (UTC epoch seconds).
pub type CommitTimes = BTreeMap<String, i64>;

#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Allow-list; when non-empty a path must match one of these
    pub timestamps_for: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub with_cache: bool,
    /// Log every commit visited by the history walk
    pub debug: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            timestamps_for: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            with_cache: true,
            debug: false,
        }
    }
}

pub struct GitTimes<G: GitPlumbing> {
    plumbing: G,
    root: PathBuf,
    subtree: PathBuf,
    subtree_paths: SubtreePaths,
    control_dir: PathBuf,
    cache: CommitCache,
}

impl GitTimes<GitRepository> {
    /// Resolver for `parent_dir` inside the repository rooted at `root_folder`.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(root_folder: P, parent_dir: Q) -> Result<Self> {
        let repo = GitRepository::open(canonical(root_folder.as_ref())?)?;
        Self::new(repo, root_folder, parent_dir)
    }
}

impl<G: GitPlumbing> GitTimes<G> {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(plumbing: G, root_folder: P, parent_dir: Q) -> Result<Self> {
        let root = canonical(root_folder.as_ref())?;
        let subtree = canonical(parent_dir.as_ref())?;

        let prefix = subtree
            .strip_prefix(&root)
            .ok()
            .and_then(to_slash)
            .ok_or_else(|| GitTimesError::SubtreeOutsideRepo {
                subtree: subtree.clone(),
                root: root.clone(),
            })?;

        let control_dir = plumbing.control_dir();
        let cache = CommitCache::in_control_dir(&control_dir);

        Ok(Self {
            plumbing,
            root,
            subtree,
            subtree_paths: SubtreePaths::new(&prefix),
            control_dir,
            cache,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subtree(&self) -> &Path {
        &self.subtree
    }

    pub fn cache(&self) -> &CommitCache {
        &self.cache
    }

    pub fn plumbing(&self) -> &G {
        &self.plumbing
    }

    /// Latest commit time of every kept file under the subtree.
    ///
    /// Files whose history cannot be found are logged and left out rather
    /// than failing the whole call.
    pub fn find(&mut self, options: &FindOptions) -> Result<CommitTimes> {
        let filter = PathFilter::new(&options.timestamps_for, &options.include, &options.exclude)?;

        let mut use_files = Vec::new();
        for repo_path in self.plumbing.list_tracked_files()? {
            let subtree_path = self.subtree_paths.relative(&repo_path);
            if filter.is_filtered(&subtree_path) {
                continue;
            }
            use_files.push(TrackedPath {
                repo_path,
                subtree_path,
            });
        }

        let extra_files = symlinks::expand(&self.root, &self.control_dir, &use_files, &filter);
        tracing::debug!(
            "{} tracked files kept, {} found through symlinks",
            use_files.len(),
            extra_files.len()
        );

        let mut all_files: Vec<CandidateFile> = use_files
            .into_iter()
            .map(CandidateFile::Tracked)
            .chain(extra_files.into_iter().map(CandidateFile::Symlinked))
            .collect();
        all_files.sort_by(|a, b| a.subtree_path().cmp(b.subtree_path()));
        let sorted_paths: Vec<String> = all_files.iter().map(|f| f.subtree_path().to_string()).collect();

        let (Some(first_commit), Some(head_commit)) =
            (self.plumbing.first_reachable_commit()?, self.plumbing.head_commit()?)
        else {
            tracing::warn!("Repository {} has no commits", self.root.display());
            return Ok(CommitTimes::new());
        };

        let repo_root = self.root.to_string_lossy().to_string();
        let subtree = self.subtree.to_string_lossy().to_string();

        if options.with_cache {
            if let Some(cached) = self
                .cache
                .lookup(&repo_root, &subtree, &first_commit, &head_commit, &sorted_paths)
            {
                return Ok(cached);
            }
        }

        let history_paths: HashSet<String> = all_files.iter().map(|f| f.history_path().to_string()).collect();
        let latest = self.latest_times(&history_paths, options.debug)?;

        let mut times = CommitTimes::new();
        for file in &all_files {
            match latest.get(file.history_path()) {
                Some(&epoch) => {
                    times.insert(file.subtree_path().to_string(), epoch);
                }
                None => tracing::warn!(
                    "No commit found for {} (history path {}), omitting it",
                    file.subtree_path(),
                    file.history_path()
                ),
            }
        }

        if options.with_cache {
            let entry = CacheEntry {
                version: CACHE_FORMAT_VERSION,
                repo_root,
                subtree,
                first_commit_id: first_commit,
                head_commit_id: head_commit,
                sorted_paths,
                path_to_epoch: times.clone(),
            };
            if let Err(e) = self.cache.store(&entry) {
                tracing::warn!("Failed to save commit cache: {}", e);
            }
        }

        Ok(times)
    }

    /// Latest commit time per history path, independent of walk order.
    fn latest_times(&self, paths: &HashSet<String>, debug: bool) -> Result<HashMap<String, i64>> {
        let mut latest: HashMap<String, i64> = HashMap::with_capacity(paths.len());

        for change in self.plumbing.commit_times_for(paths, debug)? {
            for path in change.paths {
                latest
                    .entry(path)
                    .and_modify(|epoch| *epoch = (*epoch).max(change.timestamp))
                    .or_insert(change.timestamp);
            }
        }

        Ok(latest)
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|source| GitTimesError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}
