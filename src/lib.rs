//! # filesnap
//!
//! Cacheable filesystem snapshots for build up-to-date checks.
//!
//! filesnap turns a collection of paths — bare files, pattern-filtered
//! trees, whole directories — into a [`Snapshot`]: an ordered map from
//! absolute path to [`Fingerprint`], plus the [`CompareStrategy`] a later
//! up-to-date check should diff it with.
//!
//! Repeated snapshots within a process are cheap. Every observed path and
//! every unfiltered directory listing is kept in a shared
//! [`FileSystemMirror`]; later snapshots reuse it without statting or hashing
//! again. The mirror never notices changes by itself — whoever writes to the
//! filesystem must invalidate it.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use filesnap::{CompareStrategy, FileSystemMirror, PathNormalization, Root};
//!
//! let dir = std::env::temp_dir().join(format!("filesnap-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir).unwrap();
//! std::fs::write(dir.join("a.txt"), "hello").unwrap();
//!
//! let mirror = Arc::new(FileSystemMirror::new());
//! let snapshotter = filesnap::snapshotter(Arc::clone(&mirror)).build();
//!
//! let snapshot = snapshotter
//!     .snapshot(
//!         &Root::directory(&dir),
//!         CompareStrategy::Unordered,
//!         &PathNormalization::Relative,
//!     )
//!     .unwrap();
//!
//! assert_eq!(snapshot.len(), 1);
//! assert_eq!(mirror.listing_count(), 1);
//!
//! // After writing below `dir`, tell the mirror.
//! mirror.invalidate_under(&dir.to_string_lossy());
//! assert_eq!(mirror.listing_count(), 0);
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```
//!
//! # Custom probes and strategies
//!
//! Implement [`FileSystem`] / [`FileHasher`] to change how paths are statted
//! and hashed, and [`NormalizationStrategy`] to change how observations
//! become fingerprints. [`PathNormalization`] covers the usual cases.

#![forbid(unsafe_code)]

pub mod walker;

mod builder;
mod collection;
mod error;
mod intern;
mod mirror;
mod pipeline;
mod policy;
mod probe;
mod snapshot;
mod snapshotter;
mod state;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SnapshotterBuilder;
pub use collection::{FileCollection, FilteredTree, PatternSet, Root};
pub use error::SnapshotError;
pub use intern::StringInterner;
pub use mirror::FileSystemMirror;
pub use pipeline::{Pipeline, RootFileNormalizer, Transform, TreeNormalizer};
pub use policy::{
    CompareStrategy, Fingerprint, NormalizationStrategy, NormalizedPath, PathNormalization,
};
pub use probe::{FileHasher, FileMetadata, FileSystem, FileType, LocalFileSystem, Sha256Hasher};
pub use snapshot::Snapshot;
pub use snapshotter::Snapshotter;
pub use state::{ContentSnapshot, DirectoryListing, FileKind, HashCode, PathState, RelativePath};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SnapshotterBuilder`] backed by `mirror`.
///
/// Pass the same mirror to every snapshotter in the process so they share
/// what has already been observed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use filesnap::{CompareStrategy, FileSystemMirror, PathNormalization, Root, Snapshot};
///
/// let snapshotter = filesnap::snapshotter(Arc::new(FileSystemMirror::new())).build();
/// let none: Vec<Root> = Vec::new();
///
/// let snapshot = snapshotter
///     .snapshot(&none, CompareStrategy::Ordered, &PathNormalization::Absolute)
///     .unwrap();
///
/// assert_eq!(snapshot, Snapshot::EMPTY);
/// ```
pub fn snapshotter(mirror: std::sync::Arc<FileSystemMirror>) -> SnapshotterBuilder {
    SnapshotterBuilder::new(mirror)
}
