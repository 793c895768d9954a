use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    // Probe
    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink loop at {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("walk error at {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },

    // Classification
    #[error("unrecognized file type `{file_type}` at {}", .path.display())]
    UnrecognizedFileType { path: PathBuf, file_type: String },

    // Config
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    // Third-party extensibility
    #[error("normalization failed at {}: {message}", .path.display())]
    Policy { path: PathBuf, message: String },
}

impl SnapshotError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path: p, .. }
            | Self::SymlinkLoop(p)
            | Self::Walk { path: p, .. }
            | Self::UnrecognizedFileType { path: p, .. }
            | Self::Policy { path: p, .. } => Some(p),
            Self::InvalidPattern { .. } => None,
        }
    }

    /// Whether this error signals a broken environment or probe contract
    /// rather than an ordinary I/O failure.
    ///
    /// Fatal errors must never be caught and ignored by callers.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnrecognizedFileType { .. })
    }

    /// Whether a caller may reasonably retry the whole snapshot.
    ///
    /// Only probe failures qualify. The snapshotter itself never retries.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::SymlinkLoop(_) | Self::Walk { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
