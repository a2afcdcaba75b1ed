//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built output trees so the indexer,
//! parsers and aggregators can be tested without real benchmark runs.

mod filesystem;
pub mod scenarios;

pub use filesystem::MockFs;
