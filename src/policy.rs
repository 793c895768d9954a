use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::intern::StringInterner;
use crate::state::{ContentSnapshot, FileKind, PathState};

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// How two snapshots of the same property are later compared.
///
/// Carried through a snapshot unchanged; nothing in this crate interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareStrategy {
    /// Entry order is significant (e.g. a classpath).
    Ordered,

    /// Entry order is irrelevant.
    Unordered,

    /// Outputs: entries that appeared since the last run are not changes.
    Output,
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// The path component of a [`Fingerprint`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NormalizedPath {
    /// The path plays no part in comparison.
    Ignored,

    /// Absolute, relative or name-only, depending on the strategy.
    Path(Arc<str>),
}

impl NormalizedPath {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ignored => None,
            Self::Path(p) => Some(p),
        }
    }
}

/// Normalized, comparable form of one observed path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub path:    NormalizedPath,
    pub content: ContentSnapshot,
}

impl Fingerprint {
    pub fn new(path: NormalizedPath, content: ContentSnapshot) -> Self {
        Self { path, content }
    }

    pub fn ignoring_path(content: ContentSnapshot) -> Self {
        Self::new(NormalizedPath::Ignored, content)
    }
}

// ---------------------------------------------------------------------------
// NormalizationStrategy
// ---------------------------------------------------------------------------

/// Turns an observed [`PathState`] into a [`Fingerprint`].
///
/// # Thread Safety
///
/// `Send + Sync` are required — one strategy instance is commonly shared by
/// snapshots running on several threads.
///
/// # Example
///
/// ```rust
/// use filesnap::{Fingerprint, NormalizationStrategy, PathState, SnapshotError, StringInterner};
///
/// /// Fingerprints regular files by content only and drops everything else.
/// struct ContentOnly;
///
/// impl NormalizationStrategy for ContentOnly {
///     fn normalize(
///         &self,
///         state: &PathState,
///         _interner: &StringInterner,
///     ) -> Result<Option<Fingerprint>, SnapshotError> {
///         Ok(state
///             .content()
///             .hash()
///             .map(|_| Fingerprint::ignoring_path(state.content().clone())))
///     }
///
///     fn is_path_absolute(&self) -> bool {
///         false
///     }
/// }
/// ```
pub trait NormalizationStrategy: Send + Sync {
    /// Derive the fingerprint of `state`, or `None` to leave it out of the
    /// snapshot entirely.
    fn normalize(
        &self,
        state: &PathState,
        interner: &StringInterner,
    ) -> Result<Option<Fingerprint>, SnapshotError>;

    /// Whether fingerprints produced by this strategy carry absolute paths.
    fn is_path_absolute(&self) -> bool;
}

/// The built-in normalization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathNormalization {
    /// Keep the absolute path.
    Absolute,

    /// Path relative to the root the entry was found under. A root file is
    /// known by its name; a root directory's own path is ignored.
    Relative,

    /// File name only. A root directory's own path is ignored.
    NameOnly,

    /// Content only. Directories are dropped.
    None,
}

impl NormalizationStrategy for PathNormalization {
    fn normalize(
        &self,
        state: &PathState,
        interner: &StringInterner,
    ) -> Result<Option<Fingerprint>, SnapshotError> {
        let content = state.content().clone();
        let root_dir = state.is_root() && state.kind() == FileKind::Directory;

        let fingerprint = match self {
            Self::Absolute => Fingerprint::new(NormalizedPath::Path(Arc::clone(state.path())), content),
            Self::Relative if root_dir => Fingerprint::ignoring_path(content),
            Self::Relative => {
                let rel = state.relative_path().path_string();
                Fingerprint::new(NormalizedPath::Path(interner.intern(&rel)), content)
            }
            Self::NameOnly if root_dir => Fingerprint::ignoring_path(content),
            Self::NameOnly => {
                let name = state.relative_path().last_name();
                Fingerprint::new(NormalizedPath::Path(interner.intern(name)), content)
            }
            Self::None if state.kind() == FileKind::Directory => return Ok(None),
            Self::None => Fingerprint::ignoring_path(content),
        };
        Ok(Some(fingerprint))
    }

    fn is_path_absolute(&self) -> bool {
        matches!(self, Self::Absolute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{HashCode, RelativePath};

    fn file(path: &str, segments: &[&str], root: bool) -> PathState {
        PathState::new(
            Arc::from(path),
            RelativePath::new(true, segments.iter().map(|s| s.to_string()).collect()),
            root,
            ContentSnapshot::RegularFile {
                hash: HashCode::from_bytes(vec![1, 2, 3]),
                last_modified: 7,
            },
        )
    }

    fn dir(path: &str, segments: &[&str], root: bool) -> PathState {
        PathState::new(
            Arc::from(path),
            RelativePath::new(false, segments.iter().map(|s| s.to_string()).collect()),
            root,
            ContentSnapshot::Directory,
        )
    }

    fn path_of(strategy: PathNormalization, state: &PathState) -> Option<NormalizedPath> {
        strategy
            .normalize(state, &StringInterner::new())
            .unwrap()
            .map(|f| f.path)
    }

    fn p(s: &str) -> Option<NormalizedPath> {
        Some(NormalizedPath::Path(Arc::from(s)))
    }

    #[test]
    fn absolute_keeps_full_path() {
        let state = file("/w/src/a/b.txt", &["a", "b.txt"], false);
        assert_eq!(path_of(PathNormalization::Absolute, &state), p("/w/src/a/b.txt"));
        assert!(PathNormalization::Absolute.is_path_absolute());
    }

    #[test]
    fn relative_uses_segments_and_ignores_root_dirs() {
        let nested = file("/w/src/a/b.txt", &["a", "b.txt"], false);
        assert_eq!(path_of(PathNormalization::Relative, &nested), p("a/b.txt"));

        let root_file = file("/w/lib.jar", &["lib.jar"], true);
        assert_eq!(path_of(PathNormalization::Relative, &root_file), p("lib.jar"));

        let root_dir = dir("/w/src", &["src"], true);
        assert_eq!(path_of(PathNormalization::Relative, &root_dir), Some(NormalizedPath::Ignored));

        let inner_dir = dir("/w/src/a", &["a"], false);
        assert_eq!(path_of(PathNormalization::Relative, &inner_dir), p("a"));
        assert!(!PathNormalization::Relative.is_path_absolute());
    }

    #[test]
    fn name_only_keeps_last_segment() {
        let nested = file("/w/src/a/b.txt", &["a", "b.txt"], false);
        assert_eq!(path_of(PathNormalization::NameOnly, &nested), p("b.txt"));

        let root_dir = dir("/w/src", &["src"], true);
        assert_eq!(path_of(PathNormalization::NameOnly, &root_dir), Some(NormalizedPath::Ignored));
    }

    #[test]
    fn none_drops_directories() {
        assert_eq!(path_of(PathNormalization::None, &dir("/w/src/a", &["a"], false)), None);
        let state = file("/w/src/a/b.txt", &["a", "b.txt"], false);
        assert_eq!(path_of(PathNormalization::None, &state), Some(NormalizedPath::Ignored));
    }

    #[test]
    fn missing_keeps_missing_content() {
        let state = PathState::new(
            Arc::from("/w/gone"),
            RelativePath::from_name(true, "gone"),
            true,
            ContentSnapshot::Missing,
        );
        let fp = PathNormalization::Relative
            .normalize(&state, &StringInterner::new())
            .unwrap()
            .unwrap();
        assert_eq!(fp.content, ContentSnapshot::Missing);
        assert_eq!(fp.path, NormalizedPath::Path(Arc::from("gone")));
    }
}
