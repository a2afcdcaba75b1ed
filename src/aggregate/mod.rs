//! Aggregation of cataloged output into one record per cell.
//!
//! The strategy is fixed by the dialect: IOR cells pass the coordinating
//! writer's summary through ([`CellAggregator::SingleWriter`]), key-value
//! benchmark cells sum every node's report ([`CellAggregator::Summing`]).

pub mod cell;
pub mod index;
pub mod series;

pub use cell::CellAggregator;
pub use index::AggregationIndex;
pub use series::{SeriesError, TimeSeries};
