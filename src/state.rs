use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque content hash produced by a [`FileHasher`](crate::probe::FileHasher).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HashCode(Vec<u8>);

impl HashCode {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// The classification of an observed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    /// Nothing exists at the path.
    Missing,

    /// A regular file.
    RegularFile,

    /// A directory.
    Directory,
}

/// What was observed at a path, beyond its kind.
///
/// Equality, ordering and hashing consider content only: two regular files
/// compare equal when their hashes match, whatever their modification times.
/// The modification time is carried so a persisted snapshot loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentSnapshot {
    Missing,
    Directory,
    RegularFile { hash: HashCode, last_modified: u64 },
}

impl ContentSnapshot {
    pub fn kind(&self) -> FileKind {
        match self {
            Self::Missing => FileKind::Missing,
            Self::Directory => FileKind::Directory,
            Self::RegularFile { .. } => FileKind::RegularFile,
        }
    }

    /// The content hash, for regular files.
    pub fn hash(&self) -> Option<&HashCode> {
        match self {
            Self::RegularFile { hash, .. } => Some(hash),
            _ => None,
        }
    }

    fn key(&self) -> (u8, Option<&HashCode>) {
        match self {
            Self::Missing => (0, None),
            Self::Directory => (1, None),
            Self::RegularFile { hash, .. } => (2, Some(hash)),
        }
    }
}

impl PartialEq for ContentSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ContentSnapshot {}

impl Hash for ContentSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for ContentSnapshot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContentSnapshot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Path of an entry relative to the root it was visited from.
///
/// A bare member's relative path is just its own name. Entries found while
/// walking a tree carry every segment below the tree's directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath {
    segments: Vec<String>,
    ends_with_file: bool,
}

impl RelativePath {
    pub fn new(ends_with_file: bool, segments: Vec<String>) -> Self {
        Self {
            segments,
            ends_with_file,
        }
    }

    pub fn from_name(ends_with_file: bool, name: impl Into<String>) -> Self {
        Self::new(ends_with_file, vec![name.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn ends_with_file(&self) -> bool {
        self.ends_with_file
    }

    /// The final segment, or `""` for an empty path.
    pub fn last_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Segments joined with `/`, independent of the host separator.
    pub fn path_string(&self) -> String {
        self.segments.join("/")
    }
}

/// One classified observation of a filesystem path.
///
/// The kind is derived from the content marker, so the two can never
/// disagree. Immutable once built; transforms produce new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathState {
    path: Arc<str>,
    relative_path: RelativePath,
    root: bool,
    content: ContentSnapshot,
}

impl PathState {
    pub fn new(
        path: Arc<str>,
        relative_path: RelativePath,
        root: bool,
        content: ContentSnapshot,
    ) -> Self {
        Self {
            path,
            relative_path,
            root,
            content,
        }
    }

    /// Interned absolute path.
    pub fn path(&self) -> &Arc<str> {
        &self.path
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// `true` only for a bare member named directly in a collection.
    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn kind(&self) -> FileKind {
        self.content.kind()
    }

    pub fn content(&self) -> &ContentSnapshot {
        &self.content
    }

    pub fn with_relative_path(self, relative_path: RelativePath) -> Self {
        Self {
            relative_path,
            ..self
        }
    }

    pub fn with_root(self, root: bool) -> Self {
        Self { root, ..self }
    }
}

/// Cached, unfiltered recursive expansion of one directory.
///
/// `entries` holds every descendant in walk order; the directory itself is
/// not included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    path: Arc<str>,
    entries: Vec<PathState>,
}

impl DirectoryListing {
    pub fn new(path: Arc<str>, entries: Vec<PathState>) -> Self {
        Self { path, entries }
    }

    pub fn path(&self) -> &Arc<str> {
        &self.path
    }

    pub fn entries(&self) -> &[PathState] {
        &self.entries
    }
}
