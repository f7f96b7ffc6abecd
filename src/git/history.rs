use git2::{Oid, Repository};
use std::collections::HashSet;
use std::time::Instant;

use crate::error::Result;
use crate::models::CommitChange;

/// Report, for each commit in `oids`, which of `paths` it touched.
///
/// Commits touching none of the paths are left out. Merge commits only count
/// a path when it differs from every parent, so a merge does not take over
/// the time of the branch commit that actually changed the file.
pub fn walk_commit_times(
    repo: &Repository,
    oids: Vec<Oid>,
    paths: &HashSet<String>,
    debug: bool,
) -> Result<Vec<CommitChange>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    let total = oids.len();
    let mut changes = Vec::new();

    for oid in oids {
        let commit = repo.find_commit(oid)?;
        let touched = get_touched_paths(repo, &commit, paths)?;

        if debug {
            tracing::debug!(
                "Commit {} at {}: {} requested paths touched",
                oid,
                commit.time().seconds(),
                touched.len()
            );
        }
        if touched.is_empty() {
            continue;
        }

        let mut touched: Vec<String> = touched.into_iter().map(str::to_string).collect();
        touched.sort();
        changes.push(CommitChange {
            commit_id: oid.to_string(),
            timestamp: commit.time().seconds(),
            paths: touched,
        });
    }

    tracing::info!(
        "Walked {} commits for {} paths in {:?}",
        total,
        paths.len(),
        start.elapsed()
    );
    Ok(changes)
}

/// Requested paths this commit changed relative to its parents.
fn get_touched_paths<'a>(
    repo: &Repository,
    commit: &git2::Commit,
    paths: &'a HashSet<String>,
) -> Result<HashSet<&'a str>> {
    let tree = commit.tree()?;

    if commit.parent_count() == 0 {
        return diff_paths(repo, None, &tree, paths);
    }

    let mut touched: Option<HashSet<&'a str>> = None;
    for parent in commit.parents() {
        let parent_tree = parent.tree()?;
        let against_parent = diff_paths(repo, Some(&parent_tree), &tree, paths)?;

        let remaining = match touched {
            None => against_parent,
            Some(prev) => prev.intersection(&against_parent).copied().collect(),
        };
        if remaining.is_empty() {
            return Ok(remaining);
        }
        touched = Some(remaining);
    }

    Ok(touched.unwrap_or_default())
}

fn diff_paths<'a>(
    repo: &Repository,
    old_tree: Option<&git2::Tree>,
    new_tree: &git2::Tree,
    paths: &'a HashSet<String>,
) -> Result<HashSet<&'a str>> {
    let diff = repo.diff_tree_to_tree(old_tree, Some(new_tree), None)?;

    let mut touched = HashSet::new();
    for delta in diff.deltas() {
        // Check both old and new paths (for deletions)
        for file in [delta.new_file(), delta.old_file()] {
            if let Some(path) = file.path().and_then(|p| p.to_str()) {
                if let Some(target) = paths.get(path) {
                    touched.insert(target.as_str());
                }
            }
        }
    }

    Ok(touched)
}
