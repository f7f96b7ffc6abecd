use git2::{ErrorCode, Oid, Repository, Sort};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{GitTimesError, Result};
use crate::git::GitPlumbing;
use crate::git::history::walk_commit_times;
use crate::models::CommitChange;

pub struct GitRepository {
    pub repo: Repository,
}

impl GitRepository {
    /// Open the repository whose working tree root is `path`.
    ///
    /// Unlike discovery this does not search parent directories: a path that
    /// is not itself a repository root is rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::open(&path).map_err(|_| GitTimesError::RepoNotFound(path_str.clone()))?;

        if repo.workdir().is_none() {
            return Err(GitTimesError::NotWorkTree(path_str));
        }

        Ok(Self { repo })
    }

    /// Revwalk starting at HEAD, `None` when the branch is unborn.
    ///
    /// HEAD is resolved first because `push_head` on an unborn branch reports
    /// a generic reference error rather than `UnbornBranch`.
    fn head_revwalk(&self, sorting: Sort) -> Result<Option<git2::Revwalk<'_>>> {
        let Some(head) = self.head_oid()? else {
            return Ok(None);
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(sorting)?;
        revwalk.push(head)?;
        Ok(Some(revwalk))
    }

    fn head_oid(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl GitPlumbing for GitRepository {
    fn list_tracked_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index()?;
        let mut paths = Vec::with_capacity(index.len());

        for entry in index.iter() {
            match String::from_utf8(entry.path) {
                Ok(path) => paths.push(path),
                Err(e) => tracing::warn!(
                    "Skipping non UTF-8 path {}",
                    String::from_utf8_lossy(e.as_bytes())
                ),
            }
        }

        // conflicted files appear once per stage
        paths.dedup();
        Ok(paths)
    }

    /// Root commit at the end of HEAD's first-parent chain.
    ///
    /// This runs on every `find`, cache hits included, so it follows only
    /// first parents in natural order instead of sorting the whole graph.
    /// Cost is still linear in the length of that chain.
    fn first_reachable_commit(&self) -> Result<Option<String>> {
        let Some(mut revwalk) = self.head_revwalk(Sort::NONE)? else {
            return Ok(None);
        };
        revwalk.simplify_first_parent()?;

        let mut root = None;
        for oid in revwalk {
            root = Some(oid?);
        }
        Ok(root.map(|oid| oid.to_string()))
    }

    fn head_commit(&self) -> Result<Option<String>> {
        Ok(self.head_oid()?.map(|oid| oid.to_string()))
    }

    fn commit_times_for(&self, paths: &HashSet<String>, debug: bool) -> Result<Vec<CommitChange>> {
        let Some(revwalk) = self.head_revwalk(Sort::TIME)? else {
            return Ok(Vec::new());
        };

        let oids = revwalk.collect::<std::result::Result<Vec<Oid>, _>>()?;
        walk_commit_times(&self.repo, oids, paths, debug)
    }

    fn control_dir(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}
