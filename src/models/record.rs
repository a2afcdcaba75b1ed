//! Normalized per-run and per-cell metric records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::cell::Operation;
use crate::parser::ior;

/// A single metric cell from a raw report.
///
/// Columns in a dialect's numeric set are coerced to `Number`; everything
/// else (API names, flags, values that fail to parse) stays `Text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }
}

/// Column name -> value for one operation.
pub type Metrics = BTreeMap<String, MetricValue>;

/// Parsed output of one raw file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SingleRunRecord {
    pub read: Metrics,
    pub write: Metrics,
}

impl SingleRunRecord {
    pub fn metrics(&self, op: Operation) -> &Metrics {
        match op {
            Operation::Read => &self.read,
            Operation::Write => &self.write,
        }
    }

    pub fn metrics_mut(&mut self, op: Operation) -> &mut Metrics {
        match op {
            Operation::Read => &mut self.read,
            Operation::Write => &mut self.write,
        }
    }

    /// Numeric value of `metric` for `op`, if present and numeric.
    pub fn number(&self, op: Operation, metric: &str) -> Option<f64> {
        self.metrics(op).get(metric).and_then(MetricValue::as_f64)
    }
}

/// Additive totals for one operation across the nodes of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummedMetrics {
    pub max_mib_s: f64,
    pub min_mib_s: f64,
    pub mean_mib_s: f64,
    pub total_mib: f64,
    pub total_ops: f64,
    /// Run configuration, identical on every node. Never summed.
    pub iteration: u64,
}

impl SummedMetrics {
    /// Adds `other`'s additive fields and takes its iteration count.
    pub fn accumulate(&mut self, other: &SummedMetrics) {
        self.max_mib_s += other.max_mib_s;
        self.min_mib_s += other.min_mib_s;
        self.mean_mib_s += other.mean_mib_s;
        self.total_mib += other.total_mib;
        self.total_ops += other.total_ops;
        self.iteration = other.iteration;
    }
}

/// Cell aggregate produced by the summing aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummedRecord {
    pub read: SummedMetrics,
    pub write: SummedMetrics,
    /// Number of per-node records folded in.
    pub participants: usize,
}

impl SummedRecord {
    pub fn metrics(&self, op: Operation) -> &SummedMetrics {
        match op {
            Operation::Read => &self.read,
            Operation::Write => &self.write,
        }
    }

    /// Folds per-node (read, write) pairs in order.
    pub fn from_nodes<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a (SummedMetrics, SummedMetrics)>,
    {
        let mut record = SummedRecord::default();
        for (read, write) in nodes {
            record.read.accumulate(read);
            record.write.accumulate(write);
            record.participants += 1;
        }
        record
    }
}

/// Max / min / mean throughput of one operation in MiB/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Throughput {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

/// Aggregate for one cell of the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum AggregateRecord {
    /// No usable data; placeholder so every cell exists.
    #[default]
    Empty,
    /// The coordinating writer's record, passed through unchanged.
    Single(SingleRunRecord),
    /// Sum over every participating node.
    Summed(SummedRecord),
}

impl AggregateRecord {
    pub fn is_empty(&self) -> bool {
        matches!(self, AggregateRecord::Empty)
    }

    /// Peak throughput of `op`. Empty cells read as 0.0.
    ///
    /// `None` means the record exists but carries no numeric peak column.
    pub fn peak_throughput(&self, op: Operation) -> Option<f64> {
        match self {
            AggregateRecord::Empty => Some(0.0),
            AggregateRecord::Single(record) => record.number(op, ior::MAX_MIB),
            AggregateRecord::Summed(record) => Some(record.metrics(op).max_mib_s),
        }
    }

    pub fn throughput(&self, op: Operation) -> Option<Throughput> {
        match self {
            AggregateRecord::Empty => None,
            AggregateRecord::Single(record) => Some(Throughput {
                max: record.number(op, ior::MAX_MIB)?,
                min: record.number(op, ior::MIN_MIB)?,
                mean: record.number(op, ior::MEAN_MIB)?,
            }),
            AggregateRecord::Summed(record) => {
                let m = record.metrics(op);
                Some(Throughput {
                    max: m.max_mib_s,
                    min: m.min_mib_s,
                    mean: m.mean_mib_s,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(max: f64, iteration: u64) -> SummedMetrics {
        SummedMetrics {
            max_mib_s: max,
            min_mib_s: max / 2.0,
            mean_mib_s: max * 0.75,
            total_mib: 1024.0,
            total_ops: 256.0,
            iteration,
        }
    }

    #[test]
    fn test_summed_record_adds_and_keeps_last_iteration() {
        let nodes = vec![
            (node(100.0, 3), node(200.0, 3)),
            (node(50.0, 3), node(25.0, 3)),
            (node(10.0, 5), node(5.0, 7)),
        ];
        let record = SummedRecord::from_nodes(&nodes);

        assert_eq!(record.participants, 3);
        assert_eq!(record.read.max_mib_s, 160.0);
        assert_eq!(record.read.min_mib_s, 80.0);
        assert_eq!(record.read.total_mib, 3072.0);
        assert_eq!(record.read.total_ops, 768.0);
        assert_eq!(record.read.iteration, 5);
        assert_eq!(record.write.max_mib_s, 230.0);
        assert_eq!(record.write.iteration, 7);
    }

    #[test]
    fn test_empty_record_peak_is_zero() {
        let record = AggregateRecord::Empty;
        assert_eq!(record.peak_throughput(Operation::Read), Some(0.0));
        assert_eq!(record.throughput(Operation::Read), None);
    }

    #[test]
    fn test_single_record_peak() {
        let mut run = SingleRunRecord::default();
        run.write
            .insert(ior::MAX_MIB.to_string(), MetricValue::Number(4214.58));
        run.write
            .insert("API".to_string(), MetricValue::Text("POSIX".to_string()));
        let record = AggregateRecord::Single(run);

        assert_eq!(record.peak_throughput(Operation::Write), Some(4214.58));
        assert_eq!(record.peak_throughput(Operation::Read), None);
        // Min/Mean are missing, so no full throughput triple.
        assert_eq!(record.throughput(Operation::Write), None);
    }
}
