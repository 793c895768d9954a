use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::RwLock;

use crate::state::{DirectoryListing, PathState};

/// Process-wide cache of already-observed filesystem state.
///
/// Holds two independent maps: absolute path → [`PathState`] for paths named
/// directly in a collection, and absolute directory path →
/// [`DirectoryListing`] for unfiltered directory walks.
///
/// The mirror never evicts on its own. Whoever knows the filesystem changed
/// (typically the code that just produced a task's outputs) must call one of
/// the `remove_*`/`invalidate_*` operations; until then cached state is
/// returned as-is, however stale.
///
/// # Thread Safety
///
/// Share one mirror behind an `Arc` across every snapshotter in the process.
/// Each operation is atomic for its own entry; two threads racing to cache
/// the same path simply overwrite each other (last write wins).
#[derive(Debug, Default)]
pub struct FileSystemMirror {
    paths:       RwLock<HashMap<Arc<str>, PathState>>,
    directories: RwLock<HashMap<Arc<str>, Arc<DirectoryListing>>>,
}

impl FileSystemMirror {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Paths ─────────────────────────────────────────────────────────────

    pub fn get_path(&self, path: &str) -> Option<PathState> {
        self.paths.read().get(path).cloned()
    }

    pub fn put_path(&self, state: PathState) {
        trace!("mirror: caching {} as {:?}", state.path(), state.kind());
        self.paths.write().insert(Arc::clone(state.path()), state);
    }

    /// Evict the cached state of one path. Returns whether anything was cached.
    pub fn remove_path(&self, path: &str) -> bool {
        let removed = self.paths.write().remove(path).is_some();
        if removed {
            debug!("mirror: invalidated path {}", path);
        }
        removed
    }

    // ── Directory listings ────────────────────────────────────────────────

    pub fn get_directory_listing(&self, path: &str) -> Option<Arc<DirectoryListing>> {
        self.directories.read().get(path).cloned()
    }

    pub fn put_directory_listing(&self, listing: DirectoryListing) {
        trace!(
            "mirror: caching listing of {} ({} entries)",
            listing.path(),
            listing.entries().len()
        );
        self.directories.write().insert(Arc::clone(listing.path()), Arc::new(listing));
    }

    /// Evict one directory's cached listing. Returns whether one was cached.
    pub fn remove_directory_listing(&self, path: &str) -> bool {
        let removed = self.directories.write().remove(path).is_some();
        if removed {
            debug!("mirror: invalidated listing {}", path);
        }
        removed
    }

    // ── Bulk invalidation ─────────────────────────────────────────────────

    /// Evict everything a write at or below `path` may have made stale.
    ///
    /// Removes cached paths at or under `path`, listings rooted at or under
    /// it, and listings of any ancestor directory (their entries include the
    /// changed subtree).
    pub fn invalidate_under(&self, path: &str) {
        let changed = Path::new(path);

        let paths = {
            let mut map = self.paths.write();
            let before = map.len();
            map.retain(|k, _| !Path::new(&**k).starts_with(changed));
            before - map.len()
        };

        let listings = {
            let mut map = self.directories.write();
            let before = map.len();
            map.retain(|k, _| {
                let dir = Path::new(&**k);
                !dir.starts_with(changed) && !changed.starts_with(dir)
            });
            before - map.len()
        };

        debug!(
            "mirror: invalidated {} paths and {} listings under {}",
            paths, listings, path
        );
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.paths.write().clear();
        self.directories.write().clear();
        debug!("mirror: cleared");
    }

    // ── Stats ─────────────────────────────────────────────────────────────

    /// Number of individually cached paths.
    pub fn path_count(&self) -> usize {
        self.paths.read().len()
    }

    /// Number of cached directory listings.
    pub fn listing_count(&self) -> usize {
        self.directories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_count() == 0 && self.listing_count() == 0
    }
}
