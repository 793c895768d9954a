use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::policy::{CompareStrategy, Fingerprint};

/// The fingerprint of a whole file collection.
///
/// An ordered map from absolute path to [`Fingerprint`], in walk order, plus
/// the [`CompareStrategy`] to diff it with and whether the fingerprints carry
/// absolute paths. Immutable. Serializable so a build cache can persist it
/// and read it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotData")]
pub struct Snapshot {
    entries:          Vec<(Arc<str>, Fingerprint)>,
    compare_strategy: CompareStrategy,
    path_absolute:    bool,
    /// Path → position in `entries`. Derived, never persisted.
    #[serde(skip)]
    index:            BTreeMap<Arc<str>, usize>,
}

/// Persisted form of a [`Snapshot`]; the lookup index is rebuilt on load.
#[derive(Deserialize)]
struct SnapshotData {
    entries:          Vec<(Arc<str>, Fingerprint)>,
    compare_strategy: CompareStrategy,
    path_absolute:    bool,
}

impl From<SnapshotData> for Snapshot {
    fn from(data: SnapshotData) -> Self {
        Snapshot::new(data.entries, data.compare_strategy, data.path_absolute)
    }
}

impl Snapshot {
    /// The snapshot of an empty collection.
    pub const EMPTY: Snapshot = Snapshot {
        entries:          Vec::new(),
        compare_strategy: CompareStrategy::Unordered,
        path_absolute:    false,
        index:            BTreeMap::new(),
    };

    /// Build from already-folded entries. Paths are expected to be unique;
    /// see [`Snapshotter::snapshot`](crate::Snapshotter::snapshot).
    pub(crate) fn new(
        entries: Vec<(Arc<str>, Fingerprint)>,
        compare_strategy: CompareStrategy,
        path_absolute: bool,
    ) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (p, _))| (Arc::clone(p), i))
            .collect();
        Self {
            entries,
            compare_strategy,
            path_absolute,
            index,
        }
    }

    pub fn get(&self, path: &str) -> Option<&Fingerprint> {
        self.index.get(path).map(|&i| &self.entries[i].1)
    }

    /// `(absolute path, fingerprint)` pairs in walk order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.entries.iter().map(|(p, f)| (&**p, f))
    }

    /// Absolute paths in walk order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| &**p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn compare_strategy(&self) -> CompareStrategy {
        self.compare_strategy
    }

    /// Whether fingerprint paths are absolute (vs. relative or name-only).
    pub fn is_path_absolute(&self) -> bool {
        self.path_absolute
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::EMPTY
    }
}
