use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Deduplicates path strings so repeated observations share one allocation.
///
/// Thread-safe; share one interner across snapshotters the same way the
/// [`FileSystemMirror`](crate::FileSystemMirror) is shared.
#[derive(Debug, Default)]
pub struct StringInterner {
    strings: Mutex<HashSet<Arc<str>>>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared copy of `text`, storing it on first sight.
    pub fn intern(&self, text: &str) -> Arc<str> {
        let mut strings = self.strings.lock();
        if let Some(existing) = strings.get(text) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(text);
        strings.insert(Arc::clone(&interned));
        interned
    }

    pub fn len(&self) -> usize {
        self.strings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
