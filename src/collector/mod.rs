//! Discovery of raw benchmark output on disk.
//!
//! ```text
//!   <root>/<nodes>/<date>/out-*.txt.N
//!              │
//!      ┌───────▼──────────┐
//!      │ DirectoryIndexer │  nested name -> size map, tolerant of races
//!      └───────┬──────────┘
//!      ┌───────▼──────────┐
//!      │  OutputCatalog   │  size class -> stripe count -> stripe size -> files
//!      └───────┬──────────┘
//!              │
//!       ┌──────▼──────┐
//!       │  FileSystem │ (trait)
//!       └──────┬──────┘
//!        ┌─────┴──────┐
//!   ┌────▼───┐   ┌────▼───┐
//!   │ RealFs │   │ MockFs │
//!   └────────┘   └────────┘
//! ```
//!
//! All filesystem access goes through [`FileSystem`], so tests build trees
//! in memory with [`MockFs`] and the scenarios in [`mock::scenarios`].

pub mod catalog;
pub mod filename;
pub mod indexer;
pub mod mock;
pub mod traits;

pub use catalog::{CatalogMiss, CellFiles, OutputCatalog, RunFile, date_range};
pub use filename::{ClassifyError, RunFileName, classify};
pub use indexer::{DirEntry, DirMap, DirectoryIndexer, IndexError};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
