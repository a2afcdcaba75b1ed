//! Peak throughput series across node counts.

use std::fmt;

use serde::Serialize;

use crate::aggregate::index::AggregationIndex;
use crate::models::{CellKey, NodeCount, Operation, StripeCount, StripeSize};

/// Parallel node-count / value sequences, in ascending node order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    pub node_counts: Vec<u32>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn push(&mut self, nodes: u32, value: f64) {
        self.node_counts.push(nodes);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.node_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.node_counts.iter().copied().zip(self.values.iter().copied())
    }

    pub fn into_pair(self) -> (Vec<u32>, Vec<f64>) {
        (self.node_counts, self.values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// A populated cell has no numeric peak column.
    MissingMetric { node_count: u32, metric: &'static str },
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::MissingMetric { node_count, metric } => write!(
                f,
                "record for {} nodes has no numeric '{}' column",
                node_count, metric
            ),
        }
    }
}

impl std::error::Error for SeriesError {}

impl AggregationIndex {
    /// Peak throughput of `operation` for each node count, one point per
    /// node count. Empty cells contribute 0.0.
    pub fn time_series(
        &self,
        operation: Operation,
        stripe_count: StripeCount,
        stripe_size: StripeSize,
    ) -> Result<TimeSeries, SeriesError> {
        let mut series = TimeSeries::default();
        for node_count in NodeCount::ALL {
            let cell = CellKey::new(node_count, stripe_count, stripe_size);
            let value = self.get(cell).peak_throughput(operation).ok_or(
                SeriesError::MissingMetric {
                    node_count: node_count.nodes(),
                    metric: self.dialect().peak_metric(),
                },
            )?;
            series.push(node_count.nodes(), value);
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::collector::mock::MockFs;
    use crate::collector::mock::scenarios::{fixture_write_peak, output_file_name};
    use crate::diagnostics::RecordingReporter;
    use crate::parser::Dialect;

    fn build(fs: &MockFs, dialect: Dialect) -> AggregationIndex {
        AggregationIndex::build(fs, Path::new("/out"), dialect, &RecordingReporter::new()).unwrap()
    }

    #[test]
    fn test_series_follows_node_order() {
        let index = build(&MockFs::ior_campaign("/out"), Dialect::Ior);

        let series = index
            .time_series(Operation::Write, StripeCount::Sixteen, StripeSize::K64)
            .unwrap();

        assert_eq!(series.node_counts, vec![1, 2, 4, 8, 16, 24, 32, 40, 48]);
        let expected: Vec<f64> = NodeCount::ALL
            .iter()
            .map(|&n| fixture_write_peak(CellKey::new(n, StripeCount::Sixteen, StripeSize::K64)))
            .collect();
        assert_eq!(series.values, expected);
    }

    #[test]
    fn test_series_pads_missing_cells_with_zero() {
        let index = build(&MockFs::single_node_campaign("/out"), Dialect::Ior);

        let (nodes, values) = index
            .time_series(Operation::Read, StripeCount::Four, StripeSize::M8)
            .unwrap()
            .into_pair();

        assert_eq!(nodes.len(), NodeCount::COUNT);
        assert_eq!(values[0], 100.75);
        assert!(values[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_series_over_summed_records() {
        let index = build(&MockFs::lsm_campaign("/out"), Dialect::LsmBench);

        let series = index
            .time_series(Operation::Read, StripeCount::Four, StripeSize::M1)
            .unwrap();

        assert_eq!(series.len(), NodeCount::COUNT);
        for (nodes, value) in series.iter() {
            // Read max per node is twice the write base plus the rank.
            let cell = CellKey::new(NodeCount::from_nodes(nodes).unwrap(), StripeCount::Four, StripeSize::M1);
            let ranks: f64 = (0..nodes).map(f64::from).sum();
            let expected = 2.0 * fixture_write_peak(cell) + ranks;
            assert!((value - expected).abs() < 0.01 * nodes as f64, "{} nodes", nodes);
        }
    }

    #[test]
    fn test_series_missing_peak_column() {
        let mut fs = MockFs::new();
        let cell = CellKey::new(NodeCount::N1, StripeCount::Four, StripeSize::K64);
        fs.add_file(
            format!("/out/1/2023-07-21/{}", output_file_name("collective", cell, 0)),
            "Summary of all tests:\nOperation Mean(MiB)\nwrite 1.0\nread 2.0\n",
        );
        let index = build(&fs, Dialect::Ior);

        let err = index
            .time_series(Operation::Write, StripeCount::Four, StripeSize::K64)
            .unwrap_err();
        assert_eq!(
            err,
            SeriesError::MissingMetric {
                node_count: 1,
                metric: "Max(MiB)"
            }
        );
        // Other configurations are unaffected.
        assert!(
            index
                .time_series(Operation::Write, StripeCount::Four, StripeSize::M1)
                .is_ok()
        );
    }
}
