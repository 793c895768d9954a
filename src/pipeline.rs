use crate::state::PathState;

/// A per-entry step applied to every walked sequence before folding.
///
/// Steps run in the order they were added, synchronously, on the calling
/// thread, one pass per sequence. A step may retag an entry (adjust its
/// relative path or root flag, say) but sees entries one at a time and
/// cannot reorder or drop them.
///
/// Closures `Fn(PathState) -> PathState` implement this trait.
pub trait Transform: Send + Sync {
    fn apply(&self, entry: PathState) -> PathState;
}

impl<F> Transform for F
where
    F: Fn(PathState) -> PathState + Send + Sync,
{
    fn apply(&self, entry: PathState) -> PathState {
        self(entry)
    }
}

/// Post-processes the contents of a walked directory (everything below it,
/// never the directory itself) before folding.
///
/// Applied to a copy — a cached listing is never altered.
pub trait TreeNormalizer: Send + Sync {
    fn normalize_tree(&self, entries: Vec<PathState>) -> Vec<PathState>;
}

impl<F> TreeNormalizer for F
where
    F: Fn(Vec<PathState>) -> Vec<PathState> + Send + Sync,
{
    fn normalize_tree(&self, entries: Vec<PathState>) -> Vec<PathState> {
        self(entries)
    }
}

/// Post-processes a collection member that is itself a regular file.
pub trait RootFileNormalizer: Send + Sync {
    fn normalize_root_file(&self, entry: PathState) -> PathState;
}

impl<F> RootFileNormalizer for F
where
    F: Fn(PathState) -> PathState + Send + Sync,
{
    fn normalize_root_file(&self, entry: PathState) -> PathState {
        self(entry)
    }
}

/// Ordered list of [`Transform`]s. Empty means identity.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Box<dyn Transform>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step over every entry, in order.
    pub fn run(&self, entries: Vec<PathState>) -> Vec<PathState> {
        if self.steps.is_empty() {
            return entries;
        }
        entries
            .into_iter()
            .map(|entry| self.steps.iter().fold(entry, |e, step| step.apply(e)))
            .collect()
    }
}
