//! Per-cell aggregation strategies.

use tracing::debug;

use crate::collector::catalog::CellFiles;
use crate::collector::traits::FileSystem;
use crate::diagnostics::{Anomaly, MismatchScope, Reporter};
use crate::models::{AggregateRecord, CellKey, Operation, SummedMetrics, SummedRecord};
use crate::parser::{Dialect, ParseError, lsm};

/// How the files of one cell are folded into an [`AggregateRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAggregator {
    /// One coordinating writer holds the whole-job summary; the other ranks
    /// leave zero-byte files. Its record is passed through unchanged.
    SingleWriter,
    /// Every node reports its own share; additive columns are summed.
    Summing,
}

impl CellAggregator {
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Ior => CellAggregator::SingleWriter,
            Dialect::LsmBench => CellAggregator::Summing,
        }
    }

    /// Aggregates the files of `cell`. Never fails: unusable files and
    /// participant shortfalls go to `reporter`.
    pub fn aggregate<F: FileSystem>(
        &self,
        fs: &F,
        cell: CellKey,
        files: &CellFiles,
        reporter: &dyn Reporter,
    ) -> AggregateRecord {
        match self {
            CellAggregator::SingleWriter => single_writer(fs, cell, files, reporter),
            CellAggregator::Summing => summing(fs, cell, files, reporter),
        }
    }
}

fn single_writer<F: FileSystem>(
    fs: &F,
    cell: CellKey,
    files: &CellFiles,
    reporter: &dyn Reporter,
) -> AggregateRecord {
    // Zero-byte files are the non-coordinating ranks.
    let writers: Vec<_> = files.values().filter(|f| f.size > 0).collect();
    if writers.len() != 1 {
        reporter.report(Anomaly::ParticipantCountMismatch {
            cell,
            scope: MismatchScope::Usable,
            expected: 1,
            found: writers.len(),
        });
    }

    let mut first = None;
    for file in writers {
        match Dialect::Ior.parse_file(fs, &file.path) {
            Ok(record) => {
                if first.is_none() {
                    first = Some(record);
                }
            }
            Err(e) => reporter.report(Anomaly::UnusableFile {
                path: file.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    match first {
        Some(record) => AggregateRecord::Single(record),
        None => AggregateRecord::Empty,
    }
}

fn node_metrics<F: FileSystem>(
    fs: &F,
    path: &std::path::Path,
) -> Result<(SummedMetrics, SummedMetrics), ParseError> {
    let record = Dialect::LsmBench.parse_file(fs, path)?;
    Ok((
        lsm::summed_metrics(&record, Operation::Read)?,
        lsm::summed_metrics(&record, Operation::Write)?,
    ))
}

fn summing<F: FileSystem>(
    fs: &F,
    cell: CellKey,
    files: &CellFiles,
    reporter: &dyn Reporter,
) -> AggregateRecord {
    // Every node must report, so zero-byte files are parsed (and rejected)
    // like any other.
    let mut nodes = Vec::with_capacity(files.len());
    for file in files.values() {
        match node_metrics(fs, &file.path) {
            Ok(pair) => nodes.push(pair),
            Err(e) => reporter.report(Anomaly::UnusableFile {
                path: file.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    let expected = cell.expected_participants();
    if nodes.len() != expected {
        reporter.report(Anomaly::ParticipantCountMismatch {
            cell,
            scope: MismatchScope::Usable,
            expected,
            found: nodes.len(),
        });
    }

    if nodes.is_empty() {
        return AggregateRecord::Empty;
    }
    let record = SummedRecord::from_nodes(&nodes);
    debug!(%cell, participants = record.participants, "summed cell");
    AggregateRecord::Summed(record)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::collector::catalog::RunFile;
    use crate::collector::classify;
    use crate::collector::mock::MockFs;
    use crate::collector::mock::scenarios::{IOR_REPORT, LsmRun, ior_report, lsm_report, output_file_name};
    use crate::diagnostics::RecordingReporter;
    use crate::models::{NodeCount, StripeCount, StripeSize};
    use crate::parser::ior;

    const DIR: &str = "/out/4/2023-07-21";

    fn cell() -> CellKey {
        CellKey::new(NodeCount::N4, StripeCount::Four, StripeSize::M1)
    }

    /// Adds `contents` as ranks 0.. of `cell()` and returns the cell's files.
    fn populate(fs: &mut MockFs, contents: &[String]) -> CellFiles {
        let mut files = CellFiles::new();
        for (rank, content) in contents.iter().enumerate() {
            let name = output_file_name("collective", cell(), rank as u32);
            let path = PathBuf::from(DIR).join(&name);
            fs.add_file(&path, content.clone());
            files.insert(
                name.clone(),
                RunFile {
                    size: content.len() as u64,
                    path,
                    name: classify(&name).unwrap(),
                },
            );
        }
        files
    }

    fn lsm(write_max: f64, read_max: f64) -> String {
        lsm_report(
            &LsmRun::new(write_max, 1.0, 2.0, 100.0, 400.0, 10),
            &LsmRun::new(read_max, 1.0, 2.0, 100.0, 400.0, 10),
        )
    }

    #[test]
    fn test_single_writer_passes_record_through() {
        let mut fs = MockFs::new();
        let files = populate(
            &mut fs,
            &[IOR_REPORT.to_string(), String::new(), String::new(), String::new()],
        );
        let reporter = RecordingReporter::new();

        let record = CellAggregator::SingleWriter.aggregate(&fs, cell(), &files, &reporter);

        let expected = Dialect::Ior.parse(IOR_REPORT).unwrap();
        assert_eq!(record, AggregateRecord::Single(expected));
        assert_eq!(record.peak_throughput(Operation::Write), Some(4214.58));
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_single_writer_extra_writers_keeps_first() {
        let mut fs = MockFs::new();
        let files = populate(
            &mut fs,
            &[
                ior_report((10.0, 5.0, 7.0), (20.0, 10.0, 15.0)),
                ior_report((99.0, 99.0, 99.0), (99.0, 99.0, 99.0)),
            ],
        );
        let reporter = RecordingReporter::new();

        let record = CellAggregator::SingleWriter.aggregate(&fs, cell(), &files, &reporter);

        assert_eq!(record.peak_throughput(Operation::Write), Some(10.0));
        assert_eq!(
            reporter.anomalies(),
            vec![Anomaly::ParticipantCountMismatch {
                cell: cell(),
                scope: MismatchScope::Usable,
                expected: 1,
                found: 2,
            }]
        );
    }

    #[test]
    fn test_single_writer_all_empty() {
        let mut fs = MockFs::new();
        let files = populate(&mut fs, &[String::new(), String::new()]);
        let reporter = RecordingReporter::new();

        let record = CellAggregator::SingleWriter.aggregate(&fs, cell(), &files, &reporter);

        assert!(record.is_empty());
        assert_eq!(reporter.integrity_violations(), 1);
    }

    #[test]
    fn test_single_writer_malformed_file_is_contained() {
        let mut fs = MockFs::new();
        let files = populate(&mut fs, &["IOR aborted before summary\n".to_string()]);
        let reporter = RecordingReporter::new();

        let record = CellAggregator::SingleWriter.aggregate(&fs, cell(), &files, &reporter);

        assert!(record.is_empty());
        let anomalies = reporter.anomalies();
        assert_eq!(anomalies.len(), 1);
        match &anomalies[0] {
            Anomaly::UnusableFile { path, error } => {
                assert!(path.starts_with(Path::new(DIR)));
                assert!(error.contains("malformed summary"));
            }
            other => panic!("unexpected anomaly: {}", other),
        }
    }

    #[test]
    fn test_summing_adds_every_node() {
        let mut fs = MockFs::new();
        let files = populate(
            &mut fs,
            &[lsm(10.0, 1.0), lsm(20.0, 2.0), lsm(30.0, 3.0), lsm(40.0, 4.0)],
        );
        let reporter = RecordingReporter::new();

        let record = CellAggregator::Summing.aggregate(&fs, cell(), &files, &reporter);

        let AggregateRecord::Summed(summed) = record else {
            panic!("expected summed record, got {:?}", record);
        };
        assert_eq!(summed.participants, 4);
        assert_eq!(summed.write.max_mib_s, 100.0);
        assert_eq!(summed.read.max_mib_s, 10.0);
        assert_eq!(summed.write.total_mib, 400.0);
        assert_eq!(summed.write.iteration, 10);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_summing_partial_failure() {
        let mut fs = MockFs::new();
        let files = populate(
            &mut fs,
            &[lsm(10.0, 1.0), lsm(20.0, 2.0), lsm(30.0, 3.0), String::new()],
        );
        let reporter = RecordingReporter::new();

        let record = CellAggregator::Summing.aggregate(&fs, cell(), &files, &reporter);

        assert_eq!(record.peak_throughput(Operation::Write), Some(60.0));
        let anomalies = reporter.anomalies();
        assert_eq!(anomalies.len(), 2);
        assert!(matches!(anomalies[0], Anomaly::UnusableFile { .. }));
        assert_eq!(
            anomalies[1],
            Anomaly::ParticipantCountMismatch {
                cell: cell(),
                scope: MismatchScope::Usable,
                expected: 4,
                found: 3,
            }
        );
    }

    #[test]
    fn test_summing_rejects_failed_node() {
        let mut fs = MockFs::new();
        let failed = lsm(10.0, 1.0).replace("read,1.00,1.00,2.00,100.00,400,10", "read, FAILED");
        let files = populate(&mut fs, &[failed]);
        let reporter = RecordingReporter::new();

        let record = CellAggregator::Summing.aggregate(&fs, cell(), &files, &reporter);

        assert!(record.is_empty());
        let anomalies = reporter.anomalies();
        assert!(matches!(
            &anomalies[0],
            Anomaly::UnusableFile { error, .. } if error.contains("FAILED")
        ));
    }

    #[test]
    fn test_for_dialect() {
        assert_eq!(CellAggregator::for_dialect(Dialect::Ior), CellAggregator::SingleWriter);
        assert_eq!(CellAggregator::for_dialect(Dialect::LsmBench), CellAggregator::Summing);
        assert_eq!(Dialect::Ior.peak_metric(), ior::MAX_MIB);
    }
}
