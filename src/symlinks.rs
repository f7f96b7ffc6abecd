//! Discovery of files reachable through tracked directory symlinks.
//!
//! The index records a symlink as a single entry, so files inside a linked
//! directory are invisible to `git ls-files`. They are found by walking the
//! link target on disk; history is then queried by their real location while
//! results keep the path the user browses through.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::filter::PathFilter;
use crate::models::{SymlinkedPath, TrackedPath};
use crate::paths::{join, normalize, to_slash};

/// Expand every candidate that is a symlink to a directory.
///
/// Broken links, unreadable entries and symlink loops contribute nothing.
/// Nothing under `control_dir` (the git directory) is ever reported, even
/// when a link points at the repository root or one of its ancestors.
/// Discovered files are passed through `filter` by their virtual subtree path.
pub fn expand(
    repo_root: &Path,
    control_dir: &Path,
    candidates: &[TrackedPath],
    filter: &PathFilter,
) -> Vec<SymlinkedPath> {
    let real_root = match fs::canonicalize(repo_root) {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("Cannot resolve repository root {}: {}", repo_root.display(), e);
            return Vec::new();
        }
    };
    let control_dir = fs::canonicalize(control_dir).unwrap_or_else(|_| control_dir.to_path_buf());

    let mut found = Vec::new();
    for candidate in candidates {
        let location = repo_root.join(&candidate.repo_path);
        let Some(target) = linked_directory(&location) else {
            continue;
        };

        let before = found.len();
        walk_link(&real_root, &control_dir, &target, candidate, filter, &mut found);
        tracing::debug!(
            "Symlink {} -> {}: {} files",
            candidate.repo_path,
            target.display(),
            found.len() - before
        );
    }
    found
}

/// Canonical target of `location` if it is a symlink resolving to a directory.
fn linked_directory(location: &Path) -> Option<PathBuf> {
    let meta = fs::symlink_metadata(location).ok()?;
    if !meta.file_type().is_symlink() {
        return None;
    }
    // fails for dangling links
    let target = fs::canonicalize(location).ok()?;
    target.is_dir().then_some(target)
}

fn walk_link(
    real_root: &Path,
    control_dir: &Path,
    target: &Path,
    link: &TrackedPath,
    filter: &PathFilter,
    found: &mut Vec<SymlinkedPath>,
) {
    let walker = WalkDir::new(target)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && in_control_dir(entry.path(), control_dir)));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping entry under {}: {}", target.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = entry.path().strip_prefix(target).ok().and_then(to_slash) else {
            continue;
        };
        let Ok(real) = fs::canonicalize(entry.path()) else {
            continue;
        };
        if real.starts_with(control_dir) {
            continue;
        }
        let Some(real_repo_path) = real_repo_relative(real_root, &real) else {
            continue;
        };

        let virtual_subtree_path = normalize(&join(&link.subtree_path, &rel));
        if filter.is_filtered(&virtual_subtree_path) {
            continue;
        }

        found.push(SymlinkedPath {
            virtual_repo_path: join(&link.repo_path, &rel),
            virtual_subtree_path,
            real_repo_path,
        });
    }
}

fn in_control_dir(path: &Path, control_dir: &Path) -> bool {
    fs::canonicalize(path).is_ok_and(|real| real.starts_with(control_dir))
}

/// `real` relative to `real_root`; targets outside the repository get a `../` prefix.
fn real_repo_relative(real_root: &Path, real: &Path) -> Option<String> {
    if let Ok(inside) = real.strip_prefix(real_root) {
        return to_slash(inside);
    }

    let root = to_slash(real_root.strip_prefix("/").ok()?)?;
    let file = to_slash(real.strip_prefix("/").ok()?)?;
    Some(crate::paths::relative_to(&file, &root))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn tracked(repo_path: &str) -> TrackedPath {
        TrackedPath {
            repo_path: repo_path.to_string(),
            subtree_path: repo_path.to_string(),
        }
    }

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn sorted(mut found: Vec<SymlinkedPath>) -> Vec<SymlinkedPath> {
        found.sort_by(|a, b| a.virtual_subtree_path.cmp(&b.virtual_subtree_path));
        found
    }

    #[test]
    fn test_expands_directory_symlink() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "realdir/file.txt");
        write(dir.path(), "realdir/sub/nested.txt");
        symlink("realdir", dir.path().join("link")).unwrap();

        let found = sorted(expand(
            dir.path(),
            &dir.path().join(".git"),
            &[tracked("link")],
            &PathFilter::default(),
        ));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].virtual_repo_path, "link/file.txt");
        assert_eq!(found[0].virtual_subtree_path, "link/file.txt");
        assert_eq!(found[0].real_repo_path, "realdir/file.txt");
        assert_eq!(found[1].virtual_subtree_path, "link/sub/nested.txt");
        assert_eq!(found[1].real_repo_path, "realdir/sub/nested.txt");
    }

    #[test]
    fn test_virtual_path_is_relative_to_subtree() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "shared/page.md");
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        symlink("../shared", dir.path().join("docs/shared")).unwrap();

        let link = TrackedPath {
            repo_path: "docs/shared".to_string(),
            subtree_path: "shared".to_string(),
        };
        let found = expand(dir.path(), &dir.path().join(".git"), &[link], &PathFilter::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].virtual_repo_path, "docs/shared/page.md");
        assert_eq!(found[0].virtual_subtree_path, "shared/page.md");
        assert_eq!(found[0].real_repo_path, "shared/page.md");
    }

    #[test]
    fn test_broken_symlink_is_skipped() {
        let dir = TempDir::new().unwrap();
        symlink("does-not-exist", dir.path().join("dangling")).unwrap();

        let git_dir = dir.path().join(".git");
        let found = expand(dir.path(), &git_dir, &[tracked("dangling")], &PathFilter::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_link_to_repository_root_skips_git_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt");
        write(dir.path(), ".git/HEAD");
        write(dir.path(), ".git/git-times/entry.json");
        symlink(".", dir.path().join("self")).unwrap();

        let git_dir = dir.path().join(".git");
        let found = expand(dir.path(), &git_dir, &[tracked("self")], &PathFilter::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].virtual_subtree_path, "self/a.txt");
        assert_eq!(found[0].real_repo_path, "a.txt");
    }

    #[test]
    fn test_file_symlinks_and_regular_files_are_not_expanded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt");
        symlink("a.txt", dir.path().join("alias.txt")).unwrap();

        let found = expand(
            dir.path(),
            &dir.path().join(".git"),
            &[tracked("a.txt"), tracked("alias.txt")],
            &PathFilter::default(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_discovered_files_are_refiltered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "realdir/keep.txt");
        write(dir.path(), "realdir/drop.png");
        symlink("realdir", dir.path().join("link")).unwrap();

        let filter = PathFilter::new(&[], &[], &["*.png".to_string()]).unwrap();
        let found = expand(dir.path(), &dir.path().join(".git"), &[tracked("link")], &filter);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].virtual_subtree_path, "link/keep.txt");
    }

    #[test]
    fn test_nested_symlink_is_followed_by_the_walk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "inner/deep.txt");
        fs::create_dir_all(dir.path().join("outer")).unwrap();
        symlink("../inner", dir.path().join("outer/inner")).unwrap();
        symlink("outer", dir.path().join("link")).unwrap();

        let found = expand(dir.path(), &dir.path().join(".git"), &[tracked("link")], &PathFilter::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].virtual_subtree_path, "link/inner/deep.txt");
        assert_eq!(found[0].real_repo_path, "inner/deep.txt");
    }

    #[test]
    fn test_target_outside_repository() {
        let outside = TempDir::new().unwrap();
        write(outside.path(), "ext.txt");
        let dir = TempDir::new().unwrap();
        symlink(outside.path(), dir.path().join("ext")).unwrap();

        let found = expand(dir.path(), &dir.path().join(".git"), &[tracked("ext")], &PathFilter::default());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].virtual_subtree_path, "ext/ext.txt");
        assert!(found[0].real_repo_path.starts_with("../"));
    }
}
