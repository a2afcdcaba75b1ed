//! Shared data models: the cell key domain and metric records.

pub mod cell;
pub mod record;

pub use cell::{CellKey, NodeCount, Operation, StripeCount, StripeSize};
pub use record::{
    AggregateRecord, MetricValue, Metrics, SingleRunRecord, SummedMetrics, SummedRecord,
    Throughput,
};
