//! Consolidated CSV summary reports.
//!
//! Campaigns also keep one CSV per tool with a row per (node count, stripe
//! count, stripe size, operation):
//!
//! ```text
//! N,Stripes,BlockSize,Operation,Max(MiB),Min(MiB),Mean(MiB),StdDev,...
//! 1,16,8M,read,5353.38,5160.61,5293.08,49.88,...
//! ```
//!
//! Columns after Mean are ignored. Fields may be quoted. The header row is
//! optional and may follow blank lines. The same format is produced by
//! [`crate::export::write_summary_csv`].

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use crate::aggregate::TimeSeries;
use crate::collector::traits::FileSystem;
use crate::models::Operation;

/// Error type for summary report parsing.
#[derive(Debug)]
pub enum ReportError {
    Io(io::Error),
    Csv(csv::Error),
    /// 1-based line number and reason.
    Line { line: usize, reason: String },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "I/O error: {}", e),
            ReportError::Csv(e) => write!(f, "CSV error: {}", e),
            ReportError::Line { line, reason } => write!(f, "line {}: {}", line, reason),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<io::Error> for ReportError {
    fn from(e: io::Error) -> Self {
        ReportError::Io(e)
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Csv(e)
    }
}

/// Throughput figures of one report row, MiB/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryPoint {
    pub max_mib: f64,
    pub min_mib: f64,
    pub mean_mib: f64,
}

type SeriesKey = (Operation, u32, String);

/// Parsed summary report: (operation, stripes, size) -> node count -> point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    rows: BTreeMap<SeriesKey, BTreeMap<u32, SummaryPoint>>,
}

impl SummaryReport {
    pub fn parse(content: &str) -> Result<Self, ReportError> {
        let mut report = SummaryReport::default();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut seen_row = false;
        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line_no = record.position().map_or(0, |p| p.line() as usize);

            // The header, if any, is the first non-blank row and starts with
            // a column name instead of a node count.
            let first_row = !seen_row;
            seen_row = true;
            if first_row && record[0].parse::<u32>().is_err() {
                continue;
            }

            let err = |reason: String| ReportError::Line {
                line: line_no,
                reason,
            };
            if record.len() < 7 {
                return Err(err(format!("expected at least 7 fields, got {}", record.len())));
            }

            let nodes: u32 = record[0]
                .parse()
                .map_err(|_| err(format!("invalid node count '{}'", &record[0])))?;
            let stripes: u32 = record[1]
                .parse()
                .map_err(|_| err(format!("invalid stripe count '{}'", &record[1])))?;
            let size = record[2].to_string();
            let operation: Operation = record[3].parse().map_err(err)?;

            let value = |i: usize| -> Result<f64, ReportError> {
                if record[i].is_empty() {
                    return Ok(0.0);
                }
                record[i]
                    .parse()
                    .map_err(|_| err(format!("invalid number '{}'", &record[i])))
            };
            let point = SummaryPoint {
                max_mib: value(4)?,
                min_mib: value(5)?,
                mean_mib: value(6)?,
            };

            report
                .rows
                .entry((operation, stripes, size))
                .or_default()
                .insert(nodes, point);
        }

        Ok(report)
    }

    pub fn parse_file<F: FileSystem>(fs: &F, path: &Path) -> Result<Self, ReportError> {
        let content = fs.read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn point(
        &self,
        operation: Operation,
        stripe_count: u32,
        stripe_size: &str,
        nodes: u32,
    ) -> Option<&SummaryPoint> {
        self.rows
            .get(&(operation, stripe_count, stripe_size.to_string()))?
            .get(&nodes)
    }

    /// Max throughput by node count, ascending over the nodes the report has.
    pub fn time_series(
        &self,
        operation: Operation,
        stripe_count: u32,
        stripe_size: &str,
    ) -> TimeSeries {
        let mut series = TimeSeries::default();
        if let Some(points) = self
            .rows
            .get(&(operation, stripe_count, stripe_size.to_string()))
        {
            for (nodes, point) in points {
                series.push(*nodes, point.max_mib);
            }
        }
        series
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
