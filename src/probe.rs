use std::fs::File;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

use crate::state::HashCode;

/// Raw classification reported by a [`FileSystem`] probe.
///
/// Wider than [`FileKind`](crate::FileKind): a probe may report things the
/// snapshotter refuses to fingerprint. Those surface as a fatal
/// [`SnapshotError::UnrecognizedFileType`](crate::SnapshotError::UnrecognizedFileType).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Missing,
    RegularFile,
    Directory,

    /// Sockets, pipes, devices, dangling links. Carries a description.
    Unrecognized(String),
}

/// The result of statting a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub file_type: FileType,

    /// Milliseconds since the Unix epoch; `0` when unknown.
    pub last_modified: u64,

    /// Length in bytes; `0` for anything but regular files.
    pub length: u64,
}

impl FileMetadata {
    pub fn missing() -> Self {
        Self {
            file_type: FileType::Missing,
            last_modified: 0,
            length: 0,
        }
    }

    /// Classify metadata obtained from the standard library.
    pub fn from_std(meta: &std::fs::Metadata) -> Self {
        let ft = meta.file_type();
        let file_type = if ft.is_file() {
            FileType::RegularFile
        } else if ft.is_dir() {
            FileType::Directory
        } else {
            FileType::Unrecognized(describe(&ft).to_string())
        };

        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let length = if ft.is_file() { meta.len() } else { 0 };

        Self {
            file_type,
            last_modified,
            length,
        }
    }
}

#[cfg(unix)]
fn describe(ft: &std::fs::FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if ft.is_symlink() {
        "symlink"
    } else if ft.is_socket() {
        "socket"
    } else if ft.is_fifo() {
        "fifo"
    } else if ft.is_block_device() {
        "block device"
    } else if ft.is_char_device() {
        "char device"
    } else {
        "other"
    }
}

#[cfg(not(unix))]
fn describe(ft: &std::fs::FileType) -> &'static str {
    if ft.is_symlink() {
        "symlink"
    } else {
        "other"
    }
}

/// Stats paths.
///
/// `Send + Sync` are required — one probe serves every snapshot running in
/// the process. Retrying transient failures is the probe's business; the
/// snapshotter fails the whole call on the first `Err`.
pub trait FileSystem: Send + Sync {
    /// Stat `path`, following symlinks. A path that does not exist is
    /// `Ok` with [`FileType::Missing`], not an error.
    fn stat(&self, path: &Path) -> io::Result<FileMetadata>;
}

/// Hashes file content.
///
/// `metadata` is whatever the caller already knows about the file, so
/// implementations can skip a second stat.
pub trait FileHasher: Send + Sync {
    fn hash(&self, path: &Path, metadata: &FileMetadata) -> io::Result<HashCode>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileMetadata> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(FileMetadata::from_std(&meta)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileMetadata::missing()),
            Err(e) => Err(e),
        }
    }
}

/// SHA-256 of the file's bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl FileHasher for Sha256Hasher {
    fn hash(&self, path: &Path, _metadata: &FileMetadata) -> io::Result<HashCode> {
        let mut file = File::open(path)?;
        let mut digest = Sha256::new();
        io::copy(&mut file, &mut digest)?;
        Ok(HashCode::from_bytes(digest.finalize().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let meta = LocalFileSystem.stat(&dir.path().join("nope")).unwrap();
        assert_eq!(meta.file_type, FileType::Missing);
    }

    #[test]
    fn classifies_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "hello").unwrap();

        let meta = LocalFileSystem.stat(&file).unwrap();
        assert_eq!(meta.file_type, FileType::RegularFile);
        assert_eq!(meta.length, 5);
        assert!(meta.last_modified > 0);

        let meta = LocalFileSystem.stat(dir.path()).unwrap();
        assert_eq!(meta.file_type, FileType::Directory);
    }

    #[test]
    fn equal_bytes_hash_equal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        std::fs::write(&c, "different").unwrap();

        let meta = FileMetadata::missing();
        let ha = Sha256Hasher.hash(&a, &meta).unwrap();
        assert_eq!(ha, Sha256Hasher.hash(&b, &meta).unwrap());
        assert_ne!(ha, Sha256Hasher.hash(&c, &meta).unwrap());
        assert_eq!(ha.as_bytes().len(), 32);
    }
}
