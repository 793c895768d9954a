use std::sync::Arc;

use crate::intern::StringInterner;
use crate::mirror::FileSystemMirror;
use crate::pipeline::{Pipeline, RootFileNormalizer, Transform, TreeNormalizer};
use crate::probe::{FileHasher, FileSystem, LocalFileSystem, Sha256Hasher};
use crate::snapshotter::Snapshotter;
use crate::walker::TreeWalker;

// ---------------------------------------------------------------------------
// SnapshotterBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring a [`Snapshotter`].
///
/// Created via [`filesnap::snapshotter()`](crate::snapshotter). Configure with
/// chained builder methods, then call [`build()`](SnapshotterBuilder::build).
///
/// # Example
///
/// ```rust,ignore
/// let mirror = Arc::new(FileSystemMirror::new());
/// let snapshotter = filesnap::snapshotter(Arc::clone(&mirror))
///     .hasher(my_hasher)
///     .interner(Arc::clone(&interner))
///     .transform(my_step)
///     .build();
/// ```
pub struct SnapshotterBuilder {
    mirror:               Arc<FileSystemMirror>,
    fs:                   Arc<dyn FileSystem>,
    hasher:               Arc<dyn FileHasher>,
    interner:             Option<Arc<StringInterner>>,
    pipeline:             Pipeline,
    tree_normalizer:      Option<Box<dyn TreeNormalizer>>,
    root_file_normalizer: Option<Box<dyn RootFileNormalizer>>,
}

impl SnapshotterBuilder {
    pub(crate) fn new(mirror: Arc<FileSystemMirror>) -> Self {
        Self {
            mirror,
            fs:                   Arc::new(LocalFileSystem),
            hasher:               Arc::new(Sha256Hasher),
            interner:             None,
            pipeline:             Pipeline::new(),
            tree_normalizer:      None,
            root_file_normalizer: None,
        }
    }

    // ── Probe ─────────────────────────────────────────────────────────────

    /// Replace the filesystem probe. Defaults to [`LocalFileSystem`].
    pub fn file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Replace the content hasher. Defaults to [`Sha256Hasher`].
    pub fn hasher(mut self, hasher: impl FileHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Share a path interner with other snapshotters.
    ///
    /// Each snapshotter gets its own interner otherwise.
    pub fn interner(mut self, interner: Arc<StringInterner>) -> Self {
        self.interner = Some(interner);
        self
    }

    // ── Pipeline ──────────────────────────────────────────────────────────

    /// Append a step to the per-entry transform pipeline.
    ///
    /// Steps run in the order they are added.
    pub fn transform(mut self, step: impl Transform + 'static) -> Self {
        self.pipeline.push(Box::new(step));
        self
    }

    // ── Hooks ─────────────────────────────────────────────────────────────

    /// Post-process the contents of every walked directory. Identity by default.
    pub fn normalize_tree_with(mut self, hook: impl TreeNormalizer + 'static) -> Self {
        self.tree_normalizer = Some(Box::new(hook));
        self
    }

    /// Post-process members that are regular files. Identity by default.
    pub fn normalize_root_file_with(mut self, hook: impl RootFileNormalizer + 'static) -> Self {
        self.root_file_normalizer = Some(Box::new(hook));
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    pub fn build(self) -> Snapshotter {
        let interner = self
            .interner
            .unwrap_or_else(|| Arc::new(StringInterner::new()));

        Snapshotter {
            walker: TreeWalker::new(self.mirror, self.fs, self.hasher, interner),
            pipeline: self.pipeline,
            tree_normalizer: self.tree_normalizer,
            root_file_normalizer: self.root_file_normalizer,
        }
    }
}
