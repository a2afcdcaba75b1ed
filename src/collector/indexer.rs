//! Recursive snapshot of an output directory tree.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::traits::FileSystem;
use crate::diagnostics::{Anomaly, Reporter};

/// Entry of a [`DirMap`]: a file's byte size or a nested directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirEntry {
    File(u64),
    Dir(DirMap),
}

/// Entry name -> entry, for one directory.
pub type DirMap = BTreeMap<String, DirEntry>;

/// The root of a walk could not be listed.
#[derive(Debug)]
pub enum IndexError {
    RootDirectoryUnreadable { path: PathBuf, source: io::Error },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::RootDirectoryUnreadable { path, source } => {
                write!(f, "cannot read output directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::RootDirectoryUnreadable { source, .. } => Some(source),
        }
    }
}

/// Walks a directory tree into a [`DirMap`].
///
/// The map reflects the filesystem at call time only. Entries that vanish
/// between listing and inspection are reported and left out. Symbolic links
/// to directories are reported and never descended into.
pub struct DirectoryIndexer<'a, F: FileSystem> {
    fs: &'a F,
    reporter: &'a dyn Reporter,
}

impl<'a, F: FileSystem> DirectoryIndexer<'a, F> {
    pub fn new(fs: &'a F, reporter: &'a dyn Reporter) -> Self {
        Self { fs, reporter }
    }

    /// Indexes `root`. Failing to list `root` itself is the only error.
    pub fn index(&self, root: &Path) -> Result<DirMap, IndexError> {
        let children = self
            .fs
            .read_dir(root)
            .map_err(|source| IndexError::RootDirectoryUnreadable {
                path: root.to_path_buf(),
                source,
            })?;
        let map = self.index_children(children);
        debug!(path = %root.display(), entries = map.len(), "indexed output directory");
        Ok(map)
    }

    fn index_dir(&self, dir: &Path) -> Option<DirMap> {
        match self.fs.read_dir(dir) {
            Ok(children) => Some(self.index_children(children)),
            Err(e) => {
                self.reporter.report(Anomaly::VanishedEntry {
                    path: dir.to_path_buf(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    fn index_children(&self, children: Vec<PathBuf>) -> DirMap {
        let mut map = DirMap::new();
        for child in children {
            let Some(name) = child.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            if self.fs.is_dir(&child) {
                if self.fs.is_symlink(&child) {
                    self.reporter.report(Anomaly::UnexpectedEntry {
                        path: child.clone(),
                        reason: "symlinked directory not followed",
                    });
                    continue;
                }
                if let Some(nested) = self.index_dir(&child) {
                    map.insert(name, DirEntry::Dir(nested));
                }
                continue;
            }

            match self.fs.file_len(&child) {
                Ok(size) => {
                    map.insert(name, DirEntry::File(size));
                }
                Err(e) => self.reporter.report(Anomaly::VanishedEntry {
                    path: child.clone(),
                    error: e.to_string(),
                }),
            }
        }
        map
    }
}
