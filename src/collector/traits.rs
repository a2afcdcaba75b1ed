//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the indexer and parsers walk either a real
//! benchmark output tree or an in-memory [`MockFs`](crate::collector::MockFs).

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for the read-only filesystem operations the indexer needs.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns `true` if the path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns `true` if the path itself is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Size of a regular file in bytes.
    ///
    /// Fails if the file disappeared after it was listed.
    fn file_len(&self, path: &Path) -> io::Result<u64>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}
