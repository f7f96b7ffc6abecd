//! Include/exclude glob filtering of subtree-relative paths.
//!
//! Patterns use fnmatch semantics: case-sensitive, `*` and `?` may cross `/`,
//! so `docs/*` matches `docs/a/b.md` as well as `docs/a.md`. Backslash is a
//! literal character, and so are `{` and `}`: globset would read `{a,b}` as
//! alternation, so braces outside a character class are rewritten to `[{]`
//! and `[}]` before compiling.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{GitTimesError, Result};

#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// Allow-list applied before include/exclude
    timestamps_for: Option<GlobSet>,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    /// Compile the three pattern lists. An empty list means the list was not supplied.
    pub fn new(timestamps_for: &[String], include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            timestamps_for: compile(timestamps_for)?,
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether `path` (relative to the subtree) should be dropped.
    pub fn is_filtered(&self, path: &str) -> bool {
        if path == ".." || path.starts_with("../") {
            return true;
        }

        if let Some(allowed) = &self.timestamps_for {
            if !allowed.is_match(path) {
                return true;
            }
        }

        let has_exclude = self.exclude.is_some();
        let has_include = self.include.is_some();
        let mut matched = has_exclude || !(has_exclude || has_include);

        if self.exclude.as_ref().is_some_and(|set| set.is_match(path)) {
            matched = false;
        }
        // include is checked last so it overrides exclude
        if self.include.as_ref().is_some_and(|set| set.is_match(path)) {
            matched = true;
        }

        !matched
    }
}

fn compile(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(&literal_braces(pattern))
            .backslash_escape(false)
            .build()
            .map_err(|source| GitTimesError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }

    let set = builder.build().map_err(|source| GitTimesError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })?;
    Ok(Some(set))
}

/// Wrap `{` and `}` outside character classes in a class of their own.
fn literal_braces(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end + 1;
                    continue;
                }
                None => out.push('['),
            },
            '{' => out.push_str("[{]"),
            '}' => out.push_str("[}]"),
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`; a `]` right after
/// `[` or `[!` is part of the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'!') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    chars[i.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| i + offset)
}
