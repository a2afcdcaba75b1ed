//! Total, fixed-shape index of cell aggregates.

use std::path::Path;

use tracing::{debug, info};

use crate::aggregate::cell::CellAggregator;
use crate::collector::catalog::OutputCatalog;
use crate::collector::indexer::IndexError;
use crate::collector::traits::FileSystem;
use crate::diagnostics::{Anomaly, MismatchScope, Reporter};
use crate::models::{AggregateRecord, CellKey, NodeCount, StripeCount, StripeSize};
use crate::parser::Dialect;

type Table = [[[AggregateRecord; StripeSize::COUNT]; StripeCount::COUNT]; NodeCount::COUNT];

/// Aggregate for every (node count, stripe count, stripe size) cell.
///
/// Every cell is present; cells without usable data hold
/// [`AggregateRecord::Empty`]. The index is read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationIndex {
    dialect: Dialect,
    cells: Table,
}

impl AggregationIndex {
    /// Walks `output_dir` and aggregates it with `dialect`'s strategy.
    ///
    /// Only an unreadable `output_dir` fails the build.
    pub fn build<F: FileSystem>(
        fs: &F,
        output_dir: &Path,
        dialect: Dialect,
        reporter: &dyn Reporter,
    ) -> Result<Self, IndexError> {
        let catalog = OutputCatalog::build(fs, output_dir, reporter)?;
        Ok(Self::from_catalog(fs, &catalog, dialect, reporter))
    }

    pub fn from_catalog<F: FileSystem>(
        fs: &F,
        catalog: &OutputCatalog,
        dialect: Dialect,
        reporter: &dyn Reporter,
    ) -> Self {
        let aggregator = CellAggregator::for_dialect(dialect);
        let mut cells: Table = Default::default();
        let mut populated = 0usize;

        for cell in CellKey::all() {
            let files = match catalog.cell_files(cell) {
                Ok(files) => files,
                Err(miss) => {
                    reporter.report(Anomaly::MissingCell {
                        cell,
                        level: miss.level(),
                    });
                    continue;
                }
            };

            let expected = cell.expected_participants();
            if files.len() != expected {
                reporter.report(Anomaly::ParticipantCountMismatch {
                    cell,
                    scope: MismatchScope::Catalog,
                    expected,
                    found: files.len(),
                });
            }

            let record = aggregator.aggregate(fs, cell, files, reporter);
            if !record.is_empty() {
                populated += 1;
            }
            debug!(%cell, files = files.len(), empty = record.is_empty(), "aggregated cell");
            *slot_mut(&mut cells, cell) = record;
        }

        info!(
            root = %catalog.root().display(),
            dialect = %dialect,
            populated,
            total = NodeCount::COUNT * StripeCount::COUNT * StripeSize::COUNT,
            "built aggregation index"
        );
        Self { dialect, cells }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Aggregate for `cell`. Total over the cell domain.
    pub fn get(&self, cell: CellKey) -> &AggregateRecord {
        &self.cells[cell.node_count.index()][cell.stripe_count.index()][cell.stripe_size.index()]
    }

    /// Every cell with its aggregate, in [`CellKey::all`] order.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &AggregateRecord)> {
        CellKey::all().map(move |cell| (cell, self.get(cell)))
    }

    /// Number of cells holding data.
    pub fn populated(&self) -> usize {
        self.cells().filter(|(_, record)| !record.is_empty()).count()
    }
}

fn slot_mut(cells: &mut Table, cell: CellKey) -> &mut AggregateRecord {
    &mut cells[cell.node_count.index()][cell.stripe_count.index()][cell.stripe_size.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::collector::mock::scenarios::{fixture_write_peak, output_file_name};
    use crate::diagnostics::RecordingReporter;
    use crate::models::Operation;

    #[test]
    fn test_ior_campaign_fills_every_cell() {
        let fs = MockFs::ior_campaign("/out");
        let reporter = RecordingReporter::new();

        let index = AggregationIndex::build(&fs, Path::new("/out"), Dialect::Ior, &reporter).unwrap();

        assert_eq!(index.dialect(), Dialect::Ior);
        assert_eq!(index.cells().count(), 54);
        assert_eq!(index.populated(), 54);
        for (cell, record) in index.cells() {
            assert_eq!(
                record.peak_throughput(Operation::Write),
                Some(fixture_write_peak(cell)),
                "{}",
                cell
            );
        }
        assert!(reporter.is_empty(), "{:?}", reporter.anomalies());
    }

    #[test]
    fn test_lsm_campaign_sums_nodes() {
        let fs = MockFs::lsm_campaign("/out");
        let reporter = RecordingReporter::new();

        let index =
            AggregationIndex::build(&fs, Path::new("/out"), Dialect::LsmBench, &reporter).unwrap();

        let cell = CellKey::new(NodeCount::N2, StripeCount::Four, StripeSize::K64);
        let AggregateRecord::Summed(record) = index.get(cell) else {
            panic!("expected summed record");
        };
        assert_eq!(record.participants, 2);
        // Per-node base is 200.25 / 2; ranks add 0 and 1. Reports round to 2 places.
        assert!((record.write.max_mib_s - 201.25).abs() < 0.02);
        assert_eq!(record.write.total_ops, 2.0 * 40960.0);
        assert_eq!(record.write.iteration, 10);
        assert!(reporter.is_empty(), "{:?}", reporter.anomalies());
    }

    #[test]
    fn test_missing_cells_are_empty_and_reported() {
        let fs = MockFs::single_node_campaign("/out");
        let reporter = RecordingReporter::new();

        let index = AggregationIndex::build(&fs, Path::new("/out"), Dialect::Ior, &reporter).unwrap();

        assert_eq!(index.cells().count(), 54);
        assert_eq!(index.populated(), 6);
        let missing = CellKey::new(NodeCount::N48, StripeCount::Sixteen, StripeSize::M8);
        assert!(index.get(missing).is_empty());
        assert_eq!(index.get(missing).peak_throughput(Operation::Read), Some(0.0));

        let anomalies = reporter.anomalies();
        assert_eq!(anomalies.len(), 48);
        assert!(anomalies.iter().all(|a| matches!(
            a,
            Anomaly::MissingCell {
                level: "node count",
                ..
            }
        )));
    }

    #[test]
    fn test_catalog_shortfall_is_reported() {
        let mut fs = MockFs::ior_campaign("/out");
        let cell = CellKey::new(NodeCount::N8, StripeCount::Sixteen, StripeSize::M1);
        let name = output_file_name("collective", cell, 7);
        assert!(fs.remove_file(format!("/out/8/2023-07-21/{}", name)));
        let reporter = RecordingReporter::new();

        let index = AggregationIndex::build(&fs, Path::new("/out"), Dialect::Ior, &reporter).unwrap();

        // Rank 7 was a zero-byte rank, so the cell still has its writer.
        assert!(!index.get(cell).is_empty());
        assert_eq!(
            reporter.anomalies(),
            vec![Anomaly::ParticipantCountMismatch {
                cell,
                scope: MismatchScope::Catalog,
                expected: 8,
                found: 7,
            }]
        );
    }

    #[test]
    fn test_lsm_partial_cells_are_summed() {
        let mut fs = MockFs::lsm_campaign("/out");
        // One node's report is truncated to nothing: listed, but unusable.
        let truncated = CellKey::new(NodeCount::N4, StripeCount::Four, StripeSize::M1);
        fs.add_file(
            format!("/out/4/2023-07-22/{}", output_file_name("lsm", truncated, 3)),
            "",
        );
        // One node's report never landed.
        let short = CellKey::new(NodeCount::N8, StripeCount::Sixteen, StripeSize::K64);
        assert!(fs.remove_file(format!(
            "/out/8/2023-07-22/{}",
            output_file_name("lsm", short, 5)
        )));
        let reporter = RecordingReporter::new();

        let index =
            AggregationIndex::build(&fs, Path::new("/out"), Dialect::LsmBench, &reporter).unwrap();
        assert_eq!(index.populated(), 54);

        let AggregateRecord::Summed(record) = index.get(truncated) else {
            panic!("expected summed record for {}", truncated);
        };
        assert_eq!(record.participants, 3);
        assert_eq!(record.write.total_ops, 3.0 * 40960.0);

        let AggregateRecord::Summed(record) = index.get(short) else {
            panic!("expected summed record for {}", short);
        };
        assert_eq!(record.participants, 7);

        let anomalies = reporter.anomalies();
        let for_cell = |cell: CellKey| -> Vec<&Anomaly> {
            anomalies
                .iter()
                .filter(|a| match a {
                    Anomaly::ParticipantCountMismatch { cell: c, .. } => *c == cell,
                    Anomaly::UnusableFile { path, .. } => {
                        path.to_string_lossy().contains(&output_file_name("lsm", cell, 3))
                    }
                    _ => false,
                })
                .collect()
        };

        // The catalog still lists four files, so only the usable count is short.
        let truncated_anomalies = for_cell(truncated);
        assert_eq!(truncated_anomalies.len(), 2, "{:?}", truncated_anomalies);
        assert!(matches!(truncated_anomalies[0], Anomaly::UnusableFile { .. }));
        assert_eq!(
            *truncated_anomalies[1],
            Anomaly::ParticipantCountMismatch {
                cell: truncated,
                scope: MismatchScope::Usable,
                expected: 4,
                found: 3,
            }
        );

        assert_eq!(
            for_cell(short),
            vec![
                &Anomaly::ParticipantCountMismatch {
                    cell: short,
                    scope: MismatchScope::Catalog,
                    expected: 8,
                    found: 7,
                },
                &Anomaly::ParticipantCountMismatch {
                    cell: short,
                    scope: MismatchScope::Usable,
                    expected: 8,
                    found: 7,
                },
            ]
        );
        assert_eq!(anomalies.len(), 4, "{:?}", anomalies);
    }

    #[test]
    fn test_unreadable_root() {
        let fs = MockFs::new();
        let reporter = RecordingReporter::new();
        let err = AggregationIndex::build(&fs, Path::new("/out"), Dialect::LsmBench, &reporter)
            .unwrap_err();
        assert!(err.to_string().contains("/out"));
    }
}
