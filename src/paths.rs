//! Repo-relative to subtree-relative path conversion.
//!
//! Paths are handled as `/`-separated strings, the form git reports them in.
//! Converting every index entry separately is the hot loop on large
//! repositories, so `SubtreePaths` memoizes the relative form of each
//! directory and only appends the file name per entry.

use std::collections::HashMap;
use std::path::{Component, Path};

/// Converts repo-relative paths into paths relative to one subtree.
#[derive(Debug, Clone)]
pub struct SubtreePaths {
    /// Subtree location relative to the repository root, `""` for the root itself
    prefix: String,
    /// repo-relative directory -> subtree-relative directory
    dir_cache: HashMap<String, String>,
}

impl SubtreePaths {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize(prefix),
            dir_cache: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Subtree-relative form of `repo_path`. Paths outside the subtree start with `../`.
    pub fn relative(&mut self, repo_path: &str) -> String {
        if repo_path == self.prefix {
            return String::new();
        }

        let (dir, name) = match repo_path.rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", repo_path),
        };

        let prefix = &self.prefix;
        let rel_dir = self
            .dir_cache
            .entry(dir.to_string())
            .or_insert_with(|| relative_to(dir, prefix));

        join(rel_dir, name)
    }

    /// Number of memoized directories.
    pub fn cached_dirs(&self) -> usize {
        self.dir_cache.len()
    }
}

/// Lexical relative path from `base` to `target`, both relative to the same root.
pub fn relative_to(target: &str, base: &str) -> String {
    let target: Vec<&str> = split(target).collect();
    let base: Vec<&str> = split(base).collect();

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; base.len() - common];
    parts.extend_from_slice(&target[common..]);
    parts.join("/")
}

/// Collapse empty, `.` and `dir/..` components.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in split(path) {
        if part == ".." {
            match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(part),
            }
        } else {
            parts.push(part);
        }
    }
    parts.join("/")
}

/// Join two `/`-separated fragments, either of which may be empty.
pub fn join(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, rest),
    }
}

/// `/`-separated form of a relative filesystem path; `None` if not valid UTF-8.
pub fn to_slash(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::ParentDir => parts.push(".."),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|p| !p.is_empty() && *p != ".")
}
