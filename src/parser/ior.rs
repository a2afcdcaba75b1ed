//! IOR text report parser.
//!
//! Only the trailing summary table is used:
//!
//! ```text
//! Summary of all tests:
//! Operation   Max(MiB)   Min(MiB)  Mean(MiB)     StdDev   Max(OPs) ...
//! write        4214.58    2850.07    3571.98     466.80    4214.58 ...
//! read        13488.77   10729.26   12152.44    1195.05   13488.77 ...
//! ```
//!
//! Per-iteration result rows earlier in the report also start with
//! `write`/`read`; they are ignored because scanning only starts at the marker.

use crate::models::SingleRunRecord;
use crate::parser::{ParseError, zip_metrics};

/// Line that opens the summary table.
pub const SUMMARY_MARKER: &str = "Summary of all tests:";

pub const MAX_MIB: &str = "Max(MiB)";
pub const MIN_MIB: &str = "Min(MiB)";
pub const MEAN_MIB: &str = "Mean(MiB)";

pub const NUMERIC_METRICS: &[&str] = &[
    MAX_MIB,
    MIN_MIB,
    MEAN_MIB,
    "StdDev",
    "Max(OPs)",
    "Min(OPs)",
    "Mean(OPs)",
    "Mean(s)",
    "Stonewall(s)",
    "Stonewall(MiB)",
    "aggs(MiB)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingMarker,
    CapturingHeader,
    CapturingData,
    Done,
}

/// Parses the summary table of an IOR report.
///
/// The header is the first non-blank line after the marker. The first
/// `write` and first `read` rows after it are taken, in either order.
pub fn parse_ior_summary(content: &str) -> Result<SingleRunRecord, ParseError> {
    let mut state = ScanState::SeekingMarker;
    let mut header: Option<Vec<&str>> = None;
    let mut write: Option<Vec<&str>> = None;
    let mut read: Option<Vec<&str>> = None;

    for line in content.lines() {
        let line = line.trim();
        match state {
            ScanState::SeekingMarker => {
                if line.starts_with(SUMMARY_MARKER) {
                    state = ScanState::CapturingHeader;
                }
            }
            ScanState::CapturingHeader => {
                if !line.is_empty() {
                    header = Some(line.split_whitespace().collect());
                    state = ScanState::CapturingData;
                }
            }
            ScanState::CapturingData => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                match tokens.first() {
                    Some(&"write") if write.is_none() => write = Some(tokens),
                    Some(&"read") if read.is_none() => read = Some(tokens),
                    _ => {}
                }
                if write.is_some() && read.is_some() {
                    state = ScanState::Done;
                }
            }
            ScanState::Done => break,
        }
    }

    match (header, write, read) {
        (Some(header), Some(write), Some(read)) => Ok(SingleRunRecord {
            read: zip_metrics(&header, &read, NUMERIC_METRICS),
            write: zip_metrics(&header, &write, NUMERIC_METRICS),
        }),
        (header, write, read) => {
            let mut missing = Vec::new();
            if header.is_none() {
                missing.push("header");
            }
            if write.is_none() {
                missing.push("write row");
            }
            if read.is_none() {
                missing.push("read row");
            }
            Err(ParseError::MalformedSummary { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios::IOR_REPORT;
    use crate::models::{MetricValue, Operation};

    #[test]
    fn test_parse_ior_report() {
        let record = parse_ior_summary(IOR_REPORT).unwrap();

        assert_eq!(record.number(Operation::Write, "Max(MiB)"), Some(4214.58));
        assert_eq!(record.number(Operation::Write, "StdDev"), Some(466.80));
        assert_eq!(record.number(Operation::Write, "Mean(OPs)"), Some(3571.98));

        assert_eq!(record.number(Operation::Read, "Min(MiB)"), Some(10729.26));
        assert_eq!(record.number(Operation::Read, "StdDev"), Some(1195.05));
        assert_eq!(record.number(Operation::Read, "Min(OPs)"), Some(10729.26));
    }

    #[test]
    fn test_non_numeric_columns_stay_text() {
        let record = parse_ior_summary(IOR_REPORT).unwrap();

        assert_eq!(
            record.write.get("API"),
            Some(&MetricValue::Text("POSIX".into()))
        );
        assert_eq!(
            record.write.get("Operation"),
            Some(&MetricValue::Text("write".into()))
        );
        // Numeric column, but IOR prints NA without stonewalling.
        assert_eq!(
            record.read.get("Stonewall(s)"),
            Some(&MetricValue::Text("NA".into()))
        );
        assert_eq!(
            record.write.get("blksiz"),
            Some(&MetricValue::Text("2147483648".into()))
        );
    }

    #[test]
    fn test_rows_in_either_order() {
        let content = "\
Summary of all tests:
Operation   Max(MiB)   Min(MiB)

read        20.5       10.5
write       8.25       4.0
";
        let record = parse_ior_summary(content).unwrap();
        assert_eq!(record.number(Operation::Read, "Max(MiB)"), Some(20.5));
        assert_eq!(record.number(Operation::Write, "Min(MiB)"), Some(4.0));
    }

    #[test]
    fn test_rows_before_marker_are_ignored() {
        let content = "\
access    bw(MiB/s)  IOPS
write     999.0      999.0
read      999.0      999.0
";
        let err = parse_ior_summary(content).unwrap_err();
        match err {
            ParseError::MalformedSummary { missing } => {
                assert_eq!(missing, vec!["header", "write row", "read row"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_read_row() {
        let content = "\
Summary of all tests:
Operation   Max(MiB)   Min(MiB)
write       8.25       4.0
Finished            : Fri Jul 21 10:00:00 2023
";
        let err = parse_ior_summary(content).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedSummary { ref missing } if missing == &vec!["read row"]
        ));
        assert!(err.to_string().contains("read row"));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            parse_ior_summary(""),
            Err(ParseError::MalformedSummary { .. })
        ));
    }
}
