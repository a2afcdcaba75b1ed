//! iobench - benchmark result aggregation library.
//!
//! Turns raw per-node output of parallel filesystem benchmarks into one
//! normalized record per (node count, stripe count, stripe size) cell:
//! - `collector` - output tree discovery (filename grammar, indexer, catalog)
//! - `parser` - raw report dialects and consolidated summary CSV reports
//! - `aggregate` - per-cell aggregation, the total index and time series
//! - `models` - cell key domain and metric records
//! - `diagnostics` - anomaly reporting handle
//! - `export` - summary CSV writer
//! - `fmt` - shared formatting helpers

pub mod aggregate;
pub mod collector;
pub mod diagnostics;
pub mod export;
pub mod fmt;
pub mod models;
pub mod parser;
