use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::collection::FileCollection;
use crate::error::SnapshotError;
use crate::mirror::FileSystemMirror;
use crate::pipeline::{Pipeline, RootFileNormalizer, TreeNormalizer};
use crate::policy::{CompareStrategy, Fingerprint, NormalizationStrategy};
use crate::snapshot::Snapshot;
use crate::state::{FileKind, PathState};
use crate::walker::{Expansion, TreeWalker};

/// Computes [`Snapshot`]s of file collections.
///
/// Created via [`filesnap::snapshotter()`](crate::snapshotter). Cheap to keep
/// around; all cross-call state lives in the shared
/// [`FileSystemMirror`].
pub struct Snapshotter {
    pub(crate) walker:               TreeWalker,
    pub(crate) pipeline:             Pipeline,
    pub(crate) tree_normalizer:      Option<Box<dyn TreeNormalizer>>,
    pub(crate) root_file_normalizer: Option<Box<dyn RootFileNormalizer>>,
}

impl Snapshotter {
    pub fn mirror(&self) -> &Arc<FileSystemMirror> {
        self.walker.mirror()
    }

    /// Snapshot `input`.
    ///
    /// Roots are walked in order on the calling thread. Each walked sequence
    /// goes through the normalization hooks and the transform pipeline, then
    /// all sequences are concatenated and folded: the first entry seen for a
    /// path is handed to `normalization`, later entries for the same path are
    /// dropped. An entry the strategy declines (returns `None` for) leaves its
    /// path open for a later duplicate.
    ///
    /// Returns [`Snapshot::EMPTY`] when there are no roots or nothing survives
    /// the fold.
    ///
    /// # Errors
    ///
    /// Any probe failure, unrecognized file type, or strategy error aborts
    /// the whole call. No partial snapshot is produced.
    pub fn snapshot<C>(
        &self,
        input: &C,
        compare_strategy: CompareStrategy,
        normalization: &dyn NormalizationStrategy,
    ) -> Result<Snapshot, SnapshotError>
    where
        C: FileCollection + ?Sized,
    {
        let roots = input.roots();
        if roots.is_empty() {
            return Ok(Snapshot::EMPTY);
        }

        let mut elements: Vec<PathState> = Vec::new();
        for root in &roots {
            for expansion in self.walker.walk(root)? {
                let entries = self.normalize(expansion);
                elements.extend(self.pipeline.run(entries));
            }
        }

        let interner = self.walker.interner();
        let mut seen: HashSet<Arc<str>> = HashSet::with_capacity(elements.len());
        let mut fingerprints: Vec<(Arc<str>, Fingerprint)> = Vec::with_capacity(elements.len());

        for entry in &elements {
            if seen.contains(entry.path()) {
                continue;
            }
            if let Some(fingerprint) = normalization.normalize(entry, interner)? {
                seen.insert(Arc::clone(entry.path()));
                fingerprints.push((Arc::clone(entry.path()), fingerprint));
            }
        }

        debug!(
            "snapshot: {} roots, {} entries, {} fingerprints",
            roots.len(),
            elements.len(),
            fingerprints.len()
        );

        if fingerprints.is_empty() {
            return Ok(Snapshot::EMPTY);
        }

        Ok(Snapshot::new(
            fingerprints,
            compare_strategy,
            normalization.is_path_absolute(),
        ))
    }

    /// Apply the root-file and tree hooks, flattening into walk order.
    fn normalize(&self, expansion: Expansion) -> Vec<PathState> {
        match expansion {
            Expansion::Member(state) => match &self.root_file_normalizer {
                Some(hook) if state.kind() == FileKind::RegularFile => {
                    vec![hook.normalize_root_file(state)]
                }
                _ => vec![state],
            },
            Expansion::Directory { root, contents } => Expansion::Directory {
                root,
                contents: self.normalize_tree(contents),
            }
            .into_entries(),
            Expansion::Tree(entries) => self.normalize_tree(entries),
        }
    }

    fn normalize_tree(&self, entries: Vec<PathState>) -> Vec<PathState> {
        match &self.tree_normalizer {
            Some(hook) => hook.normalize_tree(entries),
            None => entries,
        }
    }
}
