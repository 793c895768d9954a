use std::path::{Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};

use crate::error::SnapshotError;

/// Include/exclude glob patterns restricting a directory tree.
///
/// Patterns use gitignore glob syntax and match paths relative to the tree's
/// directory. When any include is present, files matching no include are
/// skipped; directories are still descended. Excludes win over includes and
/// prune whole directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Compile into an `ignore` override matcher anchored at `dir`.
    pub(crate) fn compile(&self, dir: &Path) -> Result<Override, SnapshotError> {
        let mut builder = OverrideBuilder::new(dir);
        for pattern in &self.includes {
            add(&mut builder, pattern, pattern)?;
        }
        for pattern in &self.excludes {
            add(&mut builder, &format!("!{}", pattern), pattern)?;
        }
        builder.build().map_err(|e| SnapshotError::InvalidPattern {
            pattern: self.describe(),
            message: e.to_string(),
        })
    }

    /// All patterns, excludes prefixed with `!`, comma-separated.
    fn describe(&self) -> String {
        self.includes
            .iter()
            .cloned()
            .chain(self.excludes.iter().map(|p| format!("!{}", p)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn add(builder: &mut OverrideBuilder, glob: &str, pattern: &str) -> Result<(), SnapshotError> {
    builder
        .add(glob)
        .map(|_| ())
        .map_err(|e| SnapshotError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// A directory restricted by a [`PatternSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredTree {
    pub dir: PathBuf,
    pub patterns: PatternSet,
}

impl FilteredTree {
    pub fn new(dir: impl Into<PathBuf>, patterns: PatternSet) -> Self {
        Self {
            dir: dir.into(),
            patterns,
        }
    }
}

/// One top-level member of a collection being snapshotted.
///
/// The three shapes expand differently and cache differently; see
/// [`TreeWalker`](crate::walker::TreeWalker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    /// Paths named directly. Each is probed (and cached) on its own; a
    /// directory among them is followed by its full contents.
    Members(Vec<PathBuf>),

    /// A pattern-restricted tree. Walked fresh on every snapshot.
    FilteredTree(FilteredTree),

    /// Everything under a directory. Cached as a whole listing.
    DirectoryTree(PathBuf),
}

impl Root {
    pub fn members<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::Members(paths.into_iter().map(Into::into).collect())
    }

    pub fn filtered(dir: impl Into<PathBuf>, patterns: PatternSet) -> Self {
        Self::FilteredTree(FilteredTree::new(dir, patterns))
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::DirectoryTree(dir.into())
    }
}

/// Anything that can be snapshotted.
///
/// Implementors report their roots in a stable order — root order is
/// preserved into the snapshot, and the first root to mention a path decides
/// its fingerprint.
pub trait FileCollection {
    fn roots(&self) -> Vec<Root>;
}

impl FileCollection for [Root] {
    fn roots(&self) -> Vec<Root> {
        self.to_vec()
    }
}

impl FileCollection for Vec<Root> {
    fn roots(&self) -> Vec<Root> {
        self.clone()
    }
}

impl FileCollection for Root {
    fn roots(&self) -> Vec<Root> {
        vec![self.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_set_builds() {
        let patterns = PatternSet::new().include("*.txt").exclude("tmp/**");
        assert_eq!(patterns.includes(), ["*.txt".to_string()]);
        assert_eq!(patterns.excludes(), ["tmp/**".to_string()]);
        assert!(!patterns.is_empty());
        assert!(PatternSet::new().is_empty());
    }

    #[test]
    fn describe_lists_every_pattern() {
        let patterns = PatternSet::new().include("*.txt").include("*.md").exclude("tmp");
        assert_eq!(patterns.describe(), "*.txt, *.md, !tmp");
    }

    #[test]
    fn compiled_patterns_match_relative_paths() {
        let dir = Path::new("/proj");
        let ov = PatternSet::new()
            .include("*.txt")
            .exclude("skip.txt")
            .compile(dir)
            .unwrap();
        assert!(ov.matched("/proj/a.txt", false).is_whitelist());
        assert!(ov.matched("/proj/skip.txt", false).is_ignore());
        assert!(ov.matched("/proj/a.rs", false).is_ignore());
        assert!(!ov.matched("/proj/sub", true).is_ignore());
    }

    #[test]
    fn bad_glob_is_reported() {
        let err = PatternSet::new().include("a[").compile(Path::new("/")).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidPattern { ref pattern, .. } if pattern == "a["));
    }

    #[test]
    fn vec_of_roots_is_a_collection() {
        let roots = vec![Root::directory("/a"), Root::members(["/b", "/c"])];
        assert_eq!(roots.roots().len(), 2);
        assert_eq!(Root::directory("/a").roots(), vec![Root::directory("/a")]);
    }
}
