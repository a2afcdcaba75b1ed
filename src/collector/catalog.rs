//! Index of benchmark output files by run parameters.
//!
//! Expected layout under the output root:
//!
//! ```text
//! <root>/<size class>/<date>/out-<label>-<stripes>-<size>-<date>-<host>-<rank>.<ext>.<seq>
//! ```
//!
//! The size class is the node-count directory ("1", "2", ... "48"). The
//! catalog keys files by size class, then stripe count and stripe size as
//! decoded from each file's own name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::collector::filename::{RunFileName, classify};
use crate::collector::indexer::{DirEntry, DirMap, DirectoryIndexer, IndexError};
use crate::collector::traits::FileSystem;
use crate::diagnostics::{Anomaly, Reporter};
use crate::models::CellKey;

/// One discovered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    pub size: u64,
    pub path: PathBuf,
    pub name: RunFileName,
}

/// Filename -> file, for one (size class, stripe count, stripe size).
pub type CellFiles = BTreeMap<String, RunFile>;

/// Stripe size label -> files.
pub type StripeSizeFiles = BTreeMap<String, CellFiles>;

/// Stripe count -> stripe size -> files.
pub type StripeCountFiles = BTreeMap<u32, StripeSizeFiles>;

/// Earliest and latest run dates among `files`.
///
/// Names whose date field is not a calendar date are left out.
pub fn date_range(files: &CellFiles) -> Option<(NaiveDate, NaiveDate)> {
    files
        .values()
        .filter_map(|f| f.name.run_date())
        .fold(None, |range, date| match range {
            None => Some((date, date)),
            Some((first, last)) => Some((first.min(date), last.max(date))),
        })
}

/// Which catalog level a cell lookup failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMiss {
    SizeClass,
    StripeCount,
    StripeSize,
}

impl CatalogMiss {
    pub fn level(&self) -> &'static str {
        match self {
            CatalogMiss::SizeClass => "node count",
            CatalogMiss::StripeCount => "stripe count",
            CatalogMiss::StripeSize => "stripe size",
        }
    }
}

/// Immutable snapshot of an output tree. Rebuild to observe new files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputCatalog {
    root: PathBuf,
    classes: BTreeMap<String, StripeCountFiles>,
}

impl OutputCatalog {
    /// Walks `root` and classifies every output file found two levels down.
    pub fn build<F: FileSystem>(
        fs: &F,
        root: &Path,
        reporter: &dyn Reporter,
    ) -> Result<Self, IndexError> {
        let tree = DirectoryIndexer::new(fs, reporter).index(root)?;
        Ok(Self::from_dir_map(root, &tree, reporter))
    }

    /// Builds the catalog from an already indexed tree rooted at `root`.
    pub fn from_dir_map(root: &Path, tree: &DirMap, reporter: &dyn Reporter) -> Self {
        let mut classes: BTreeMap<String, StripeCountFiles> = BTreeMap::new();

        for (size_class, entry) in tree {
            let DirEntry::Dir(dates) = entry else {
                reporter.report(Anomaly::UnexpectedEntry {
                    path: root.join(size_class),
                    reason: "expected a node-count directory",
                });
                continue;
            };
            let class = classes.entry(size_class.clone()).or_default();

            for (date_dir, entry) in dates {
                let DirEntry::Dir(files) = entry else {
                    reporter.report(Anomaly::UnexpectedEntry {
                        path: root.join(size_class).join(date_dir),
                        reason: "expected a date directory",
                    });
                    continue;
                };

                for (file_name, entry) in files {
                    let path = root.join(size_class).join(date_dir).join(file_name);
                    let DirEntry::File(size) = entry else {
                        reporter.report(Anomaly::UnexpectedEntry {
                            path,
                            reason: "nested directory inside a date directory",
                        });
                        continue;
                    };

                    let name = match classify(file_name) {
                        Ok(name) => name,
                        Err(_) => {
                            reporter.report(Anomaly::UnrecognizedFilename { path });
                            continue;
                        }
                    };

                    class
                        .entry(name.stripe_count)
                        .or_default()
                        .entry(name.stripe_size.clone())
                        .or_default()
                        .insert(
                            file_name.clone(),
                            RunFile {
                                size: *size,
                                path,
                                name,
                            },
                        );
                }
            }
        }

        debug!(
            root = %root.display(),
            size_classes = classes.len(),
            "built output catalog"
        );
        Self {
            root: root.to_path_buf(),
            classes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Size classes (node-count directory names) in the catalog.
    pub fn size_classes(&self) -> impl Iterator<Item = (&str, &StripeCountFiles)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Files for an exact (size class, stripe count, stripe size) triple.
    pub fn files(&self, size_class: &str, stripe_count: u32, stripe_size: &str) -> Option<&CellFiles> {
        self.classes
            .get(size_class)?
            .get(&stripe_count)?
            .get(stripe_size)
    }

    /// Files for a cell, or the level at which the lookup failed.
    pub fn cell_files(&self, cell: CellKey) -> Result<&CellFiles, CatalogMiss> {
        let counts = self
            .classes
            .get(&cell.node_count.dir_name())
            .ok_or(CatalogMiss::SizeClass)?;
        let sizes = counts
            .get(&cell.stripe_count.count())
            .ok_or(CatalogMiss::StripeCount)?;
        sizes
            .get(cell.stripe_size.label())
            .ok_or(CatalogMiss::StripeSize)
    }

    /// Total number of classified files.
    pub fn file_count(&self) -> usize {
        self.classes
            .values()
            .flat_map(|counts| counts.values())
            .flat_map(|sizes| sizes.values())
            .map(|files| files.len())
            .sum()
    }
}
