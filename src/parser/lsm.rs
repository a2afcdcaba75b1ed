//! Key-value store benchmark report parser.
//!
//! Each node writes one report. The results part looks like:
//!
//! ```text
//! Iteration-WRITE: lsm
//! access,max(MiB)/s,min(MiB/s),mean(MiB/s),total(MiB),total(Ops),iteration
//! iwrite,61.20,61.20,61.20,255.99,4096,1
//!
//! Bench-WRITE: lsm
//! access,max(MiB)/s,min(MiB/s),mean(MiB/s),total(MiB),total(Ops),iteration
//! write,58.48,44.21,55.79,2559.96,40960,10
//!
//! Bench-READ: lsm
//! access,max(MiB)/s,min(MiB/s),mean(MiB/s),total(MiB),total(Ops),iteration
//! read,120.11,98.02,110.47,2559.96,40960,10
//! ```
//!
//! Only the `Bench-*` (or bare `WRITE` / `READ`) sections are read. A failed
//! phase is written as `write, FAILED`.

use crate::models::{MetricValue, Operation, SingleRunRecord, SummedMetrics};
use crate::parser::{ParseError, zip_metrics};

pub const MAX_MIB_S: &str = "max(MiB)/s";
pub const MIN_MIB_S: &str = "min(MiB/s)";
pub const MEAN_MIB_S: &str = "mean(MiB/s)";
pub const TOTAL_MIB: &str = "total(MiB)";
pub const TOTAL_OPS: &str = "total(Ops)";
pub const ITERATION: &str = "iteration";

pub const NUMERIC_METRICS: &[&str] = &[
    "bw",
    "latency",
    MAX_MIB_S,
    MIN_MIB_S,
    MEAN_MIB_S,
    TOTAL_MIB,
    TOTAL_OPS,
    ITERATION,
];

const FAILED: &str = "FAILED";

/// Header and data line captured for one section.
#[derive(Debug, Default)]
struct Section<'a> {
    header: Option<&'a str>,
    data: Option<&'a str>,
}

/// Returns the operation a section banner opens, if `line` is one.
fn section_banner(line: &str) -> Option<Operation> {
    let token = line.split_whitespace().next()?.trim_end_matches(':');
    match token {
        "WRITE" | "Bench-WRITE" => Some(Operation::Write),
        "READ" | "Bench-READ" => Some(Operation::Read),
        _ => None,
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Parses a report into its write and read summary rows.
///
/// Each section is scanned independently; once its data line is captured it
/// stops, and scanning continues for the other one. Both must be found.
pub fn parse_lsm_report(content: &str) -> Result<SingleRunRecord, ParseError> {
    let mut write = Section::default();
    let mut read = Section::default();
    let mut active: Option<Operation> = None;

    for line in content.lines() {
        let line = line.trim();

        if let Some(op) = section_banner(line) {
            let section = match op {
                Operation::Write => &mut write,
                Operation::Read => &mut read,
            };
            active = if section.data.is_none() {
                section.header = None;
                Some(op)
            } else {
                None
            };
            continue;
        }

        if line.is_empty() {
            continue;
        }
        let Some(op) = active else {
            continue;
        };

        let section = match op {
            Operation::Write => &mut write,
            Operation::Read => &mut read,
        };
        if section.header.is_none() {
            section.header = Some(line);
        } else {
            section.data = Some(line);
            active = None;
            if write.data.is_some() && read.data.is_some() {
                break;
            }
        }
    }

    let mut missing = Vec::new();
    for (op, section) in [(Operation::Write, &write), (Operation::Read, &read)] {
        if section.header.is_none() {
            missing.push(match op {
                Operation::Write => "write section",
                Operation::Read => "read section",
            });
        } else if section.data.is_none() {
            missing.push(match op {
                Operation::Write => "write row",
                Operation::Read => "read row",
            });
        }
    }
    if !missing.is_empty() {
        return Err(ParseError::MalformedSummary { missing });
    }

    let mut record = SingleRunRecord::default();
    for (op, section) in [(Operation::Write, &write), (Operation::Read, &read)] {
        let (Some(header), Some(data)) = (section.header, section.data) else {
            continue;
        };
        let values = split_fields(data);
        if values.get(1) == Some(&FAILED) {
            return Err(ParseError::FailedRun { operation: op });
        }
        *record.metrics_mut(op) = zip_metrics(&split_fields(header), &values, NUMERIC_METRICS);
    }
    Ok(record)
}

/// Extracts the summable columns of one operation.
pub fn summed_metrics(
    record: &SingleRunRecord,
    operation: Operation,
) -> Result<SummedMetrics, ParseError> {
    let metrics = record.metrics(operation);
    let number = |metric: &'static str| {
        metrics
            .get(metric)
            .and_then(MetricValue::as_f64)
            .ok_or(ParseError::MissingMetric { operation, metric })
    };

    Ok(SummedMetrics {
        max_mib_s: number(MAX_MIB_S)?,
        min_mib_s: number(MIN_MIB_S)?,
        mean_mib_s: number(MEAN_MIB_S)?,
        total_mib: number(TOTAL_MIB)?,
        total_ops: number(TOTAL_OPS)?,
        iteration: number(ITERATION)? as u64,
    })
}
