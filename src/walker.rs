use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use log::{debug, trace};

use crate::collection::{PatternSet, Root};
use crate::error::SnapshotError;
use crate::intern::StringInterner;
use crate::mirror::FileSystemMirror;
use crate::probe::{FileHasher, FileMetadata, FileSystem, FileType};
use crate::state::{ContentSnapshot, DirectoryListing, FileKind, PathState, RelativePath};

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// One independently ordered sequence produced while walking a [`Root`].
///
/// A `Members` root yields one expansion per path; tree roots yield exactly
/// one. The variants tell the snapshotter which normalization hook applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// A bare member that is a regular file or does not exist.
    Member(PathState),

    /// A bare member that is a directory, followed by everything below it.
    Directory {
        root:     PathState,
        contents: Vec<PathState>,
    },

    /// The contents of a filtered or unfiltered tree. The tree's own
    /// directory is not included.
    Tree(Vec<PathState>),
}

impl Expansion {
    /// Flatten into walk order.
    pub fn into_entries(self) -> Vec<PathState> {
        match self {
            Self::Member(state) => vec![state],
            Self::Directory { root, contents } => {
                let mut entries = Vec::with_capacity(contents.len() + 1);
                entries.push(root);
                entries.extend(contents);
                entries
            }
            Self::Tree(entries) => entries,
        }
    }
}

// ---------------------------------------------------------------------------
// TreeWalker
// ---------------------------------------------------------------------------

/// Expands roots into ordered [`PathState`] sequences.
///
/// Consults the shared [`FileSystemMirror`] before touching the disk and
/// populates it after:
///
/// - bare members are cached individually by absolute path;
/// - unfiltered directory contents are cached as a [`DirectoryListing`];
/// - filtered trees are never cached — the mirror is keyed by path alone and
///   cannot tell two filters apart.
///
/// Walks are pre-order (a directory before its children), with siblings
/// sorted by file name, so the order is stable for a fixed layout.
/// Everything happens on the calling thread.
pub struct TreeWalker {
    mirror:   Arc<FileSystemMirror>,
    fs:       Arc<dyn FileSystem>,
    hasher:   Arc<dyn FileHasher>,
    interner: Arc<StringInterner>,
}

impl TreeWalker {
    pub fn new(
        mirror: Arc<FileSystemMirror>,
        fs: Arc<dyn FileSystem>,
        hasher: Arc<dyn FileHasher>,
        interner: Arc<StringInterner>,
    ) -> Self {
        Self {
            mirror,
            fs,
            hasher,
            interner,
        }
    }

    pub fn mirror(&self) -> &Arc<FileSystemMirror> {
        &self.mirror
    }

    pub fn interner(&self) -> &Arc<StringInterner> {
        &self.interner
    }

    /// Expand one root.
    ///
    /// # Errors
    ///
    /// Fails on the first probe failure, and with a fatal
    /// [`SnapshotError::UnrecognizedFileType`] on anything that is neither a
    /// regular file, a directory, nor missing. Nothing partial is returned.
    pub fn walk(&self, root: &Root) -> Result<Vec<Expansion>, SnapshotError> {
        match root {
            Root::Members(paths) => paths.iter().map(|p| self.visit_member(p)).collect(),
            Root::FilteredTree(tree) => {
                let dir = absolute(&tree.dir)?;
                Ok(vec![Expansion::Tree(self.visit_filtered_tree(&dir, &tree.patterns)?)])
            }
            Root::DirectoryTree(dir) => {
                let dir = absolute(dir)?;
                Ok(vec![Expansion::Tree(self.visit_directory_tree(&dir)?)])
            }
        }
    }

    // ── Bare members ──────────────────────────────────────────────────────

    fn visit_member(&self, path: &Path) -> Result<Expansion, SnapshotError> {
        let path = absolute(path)?;
        let key = self.intern(&path);

        let state = match self.mirror.get_path(&key) {
            Some(cached) => {
                trace!("walker: member {} from mirror", key);
                cached
            }
            None => {
                let state = self.probe_member(&path, Arc::clone(&key))?;
                self.mirror.put_path(state.clone());
                state
            }
        };

        match state.kind() {
            FileKind::Missing | FileKind::RegularFile => Ok(Expansion::Member(state)),
            FileKind::Directory => {
                let contents = self.directory_contents(&path, key)?;
                Ok(Expansion::Directory {
                    root: state,
                    contents,
                })
            }
        }
    }

    fn probe_member(&self, path: &Path, key: Arc<str>) -> Result<PathState, SnapshotError> {
        let name = file_name(path);
        let meta = self.stat(path)?;
        let state = match meta.file_type {
            FileType::Missing => PathState::new(
                key,
                RelativePath::from_name(true, name),
                true,
                ContentSnapshot::Missing,
            ),
            FileType::Directory => PathState::new(
                key,
                RelativePath::from_name(false, name),
                true,
                ContentSnapshot::Directory,
            ),
            FileType::RegularFile => {
                let content = self.file_content(path, &meta)?;
                PathState::new(key, RelativePath::from_name(true, name), true, content)
            }
            FileType::Unrecognized(file_type) => {
                return Err(SnapshotError::UnrecognizedFileType {
                    path: path.to_path_buf(),
                    file_type,
                })
            }
        };
        Ok(state)
    }

    // ── Trees ─────────────────────────────────────────────────────────────

    fn visit_filtered_tree(
        &self,
        dir: &Path,
        patterns: &PatternSet,
    ) -> Result<Vec<PathState>, SnapshotError> {
        debug!("walker: filtered tree {}", dir.display());
        let meta = self.stat(dir)?;
        match meta.file_type.clone() {
            FileType::Directory => self.walk_dir(dir, Some(patterns)),
            other => self.non_directory_tree(dir, other, &meta),
        }
    }

    fn visit_directory_tree(&self, dir: &Path) -> Result<Vec<PathState>, SnapshotError> {
        let key = self.intern(dir);
        if let Some(listing) = self.mirror.get_directory_listing(&key) {
            debug!("walker: listing of {} from mirror", key);
            return Ok(listing.entries().to_vec());
        }

        let meta = self.stat(dir)?;
        match meta.file_type.clone() {
            FileType::Directory => self.directory_contents(dir, key),
            other => self.non_directory_tree(dir, other, &meta),
        }
    }

    /// Full, unfiltered contents of a known directory, from the mirror when
    /// possible.
    fn directory_contents(&self, dir: &Path, key: Arc<str>) -> Result<Vec<PathState>, SnapshotError> {
        if let Some(listing) = self.mirror.get_directory_listing(&key) {
            debug!("walker: listing of {} from mirror", key);
            return Ok(listing.entries().to_vec());
        }

        debug!("walker: scanning {}", key);
        let entries = self.walk_dir(dir, None)?;
        self.mirror
            .put_directory_listing(DirectoryListing::new(key, entries.clone()));
        Ok(entries)
    }

    /// A tree whose directory turned out not to be one: a missing directory
    /// has no contents, a regular file stands for itself.
    fn non_directory_tree(
        &self,
        dir: &Path,
        file_type: FileType,
        meta: &FileMetadata,
    ) -> Result<Vec<PathState>, SnapshotError> {
        match file_type {
            FileType::Missing => Ok(Vec::new()),
            FileType::RegularFile => {
                let content = self.file_content(dir, meta)?;
                Ok(vec![PathState::new(
                    self.intern(dir),
                    RelativePath::from_name(true, file_name(dir)),
                    false,
                    content,
                )])
            }
            FileType::Directory => self.walk_dir(dir, None),
            FileType::Unrecognized(file_type) => Err(SnapshotError::UnrecognizedFileType {
                path: dir.to_path_buf(),
                file_type,
            }),
        }
    }

    /// Pre-order walk below `dir`, excluding `dir` itself.
    fn walk_dir(
        &self,
        dir: &Path,
        patterns: Option<&PatternSet>,
    ) -> Result<Vec<PathState>, SnapshotError> {
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(true)
            .same_file_system(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if let Some(patterns) = patterns.filter(|p| !p.is_empty()) {
            builder.overrides(patterns.compile(dir)?);
        }

        let mut entries = Vec::new();
        for result in builder.build() {
            let entry = result.map_err(|e| map_ignore_error(e, dir))?;

            // Skip the root itself
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let ft = match entry.file_type() {
                Some(ft) => ft,
                None => {
                    return Err(SnapshotError::UnrecognizedFileType {
                        path: path.to_path_buf(),
                        file_type: "stdin".into(),
                    })
                }
            };

            let segments = relative_segments(dir, path);

            if ft.is_dir() {
                entries.push(PathState::new(
                    self.intern(path),
                    RelativePath::new(false, segments),
                    false,
                    ContentSnapshot::Directory,
                ));
            } else if ft.is_file() {
                let meta = entry.metadata().map_err(|e| map_ignore_error(e, path))?;
                let meta = FileMetadata::from_std(&meta);
                let content = self.file_content(path, &meta)?;
                entries.push(PathState::new(
                    self.intern(path),
                    RelativePath::new(true, segments),
                    false,
                    content,
                ));
            } else {
                let meta = std::fs::symlink_metadata(path).map_err(|e| SnapshotError::io(path, e))?;
                let file_type = match FileMetadata::from_std(&meta).file_type {
                    FileType::Unrecognized(t) => t,
                    other => format!("{:?}", other),
                };
                return Err(SnapshotError::UnrecognizedFileType {
                    path: path.to_path_buf(),
                    file_type,
                });
            }
        }

        trace!("walker: {} entries below {}", entries.len(), dir.display());
        Ok(entries)
    }

    // ── Probe helpers ─────────────────────────────────────────────────────

    fn stat(&self, path: &Path) -> Result<FileMetadata, SnapshotError> {
        self.fs.stat(path).map_err(|e| SnapshotError::io(path, e))
    }

    fn file_content(&self, path: &Path, meta: &FileMetadata) -> Result<ContentSnapshot, SnapshotError> {
        let hash = self
            .hasher
            .hash(path, meta)
            .map_err(|e| SnapshotError::io(path, e))?;
        Ok(ContentSnapshot::RegularFile {
            hash,
            last_modified: meta.last_modified,
        })
    }

    fn intern(&self, path: &Path) -> Arc<str> {
        self.interner.intern(&path.to_string_lossy())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Absolute form of `path`, one spelling per location: trailing separators
/// and `.` components are dropped. Symlinks and `..` are left alone.
fn absolute(path: &Path) -> Result<PathBuf, SnapshotError> {
    let abs = std::path::absolute(path).map_err(|e| SnapshotError::io(path, e))?;
    Ok(abs.components().collect())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn relative_segments(dir: &Path, path: &Path) -> Vec<String> {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}

fn map_ignore_error(e: ignore::Error, at: &Path) -> SnapshotError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => SnapshotError::Io {
                path,
                source: io_err,
            },
            ignore::Error::Loop { child, .. } => SnapshotError::SymlinkLoop(child),
            other => SnapshotError::Walk {
                path,
                message: other.to_string(),
            },
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err, at),
        ignore::Error::Loop { child, .. } => SnapshotError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => SnapshotError::Io {
            path: at.to_path_buf(),
            source: io_err,
        },
        other => SnapshotError::Walk {
            path: at.to_path_buf(),
            message: other.to_string(),
        },
    }
}
