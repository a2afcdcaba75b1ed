//! Parsers for raw benchmark output.
//!
//! Two dialects are supported, one per benchmark tool:
//!
//! - [`Dialect::Ior`]: IOR text report. A single coordinating rank writes the
//!   whole-job summary table (`Summary of all tests:`), whitespace separated.
//! - [`Dialect::LsmBench`]: key-value store benchmark report. Every node
//!   writes its own file with comma separated `Bench-WRITE` / `Bench-READ`
//!   sections.
//!
//! Both produce a [`SingleRunRecord`]. The pure `parse_*` functions take file
//! content; [`Dialect::parse_file`] reads through a [`FileSystem`].

pub mod ior;
pub mod lsm;
pub mod summary;

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::collector::traits::FileSystem;
use crate::models::{MetricValue, Metrics, Operation, SingleRunRecord};

/// Error type for raw report parsing.
#[derive(Debug)]
pub enum ParseError {
    /// Required header or data rows never appeared.
    MalformedSummary { missing: Vec<&'static str> },
    /// The benchmark marked an operation as failed.
    FailedRun { operation: Operation },
    /// A column required for aggregation is absent or not numeric.
    MissingMetric {
        operation: Operation,
        metric: &'static str,
    },
    /// File could not be read.
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedSummary { missing } => {
                write!(f, "malformed summary: missing {}", missing.join(", "))
            }
            ParseError::FailedRun { operation } => {
                write!(f, "benchmark reported {} as FAILED", operation)
            }
            ParseError::MissingMetric { operation, metric } => {
                write!(f, "{} metric '{}' missing or not numeric", operation, metric)
            }
            ParseError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Raw output dialect, chosen explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// One aggregated writer per cell; whitespace-separated summary table.
    Ior,
    /// One file per node; comma-separated write/read sections.
    LsmBench,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Ior => "ior",
            Dialect::LsmBench => "lsm",
        }
    }

    /// Columns coerced to numbers. The two sets are disjoint.
    pub fn numeric_metrics(&self) -> &'static [&'static str] {
        match self {
            Dialect::Ior => ior::NUMERIC_METRICS,
            Dialect::LsmBench => lsm::NUMERIC_METRICS,
        }
    }

    /// Column holding peak throughput in MiB/s.
    pub fn peak_metric(&self) -> &'static str {
        match self {
            Dialect::Ior => ior::MAX_MIB,
            Dialect::LsmBench => lsm::MAX_MIB_S,
        }
    }

    pub fn parse(&self, content: &str) -> Result<SingleRunRecord, ParseError> {
        match self {
            Dialect::Ior => ior::parse_ior_summary(content),
            Dialect::LsmBench => lsm::parse_lsm_report(content),
        }
    }

    pub fn parse_file<F: FileSystem>(
        &self,
        fs: &F,
        path: &Path,
    ) -> Result<SingleRunRecord, ParseError> {
        let content = fs.read_to_string(path)?;
        self.parse(&content)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ior" => Ok(Dialect::Ior),
            "lsm" | "lsmbench" | "lsm-bench" => Ok(Dialect::LsmBench),
            other => Err(format!("unknown dialect '{}' (expected ior or lsm)", other)),
        }
    }
}

/// Pairs header names with row values by position.
///
/// Extra tokens on either side are dropped. A repeated header name keeps the
/// last value. Numeric columns that fail to parse are kept as text.
pub(crate) fn zip_metrics(header: &[&str], values: &[&str], numeric: &[&str]) -> Metrics {
    let mut metrics = Metrics::new();
    for (name, value) in header.iter().zip(values) {
        let parsed = if numeric.contains(name) {
            value
                .parse::<f64>()
                .map(MetricValue::Number)
                .unwrap_or_else(|_| MetricValue::Text(value.to_string()))
        } else {
            MetricValue::Text(value.to_string())
        };
        metrics.insert(name.to_string(), parsed);
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_zip_metrics() {
        let header = ["access", "bw", "StdDev", "StdDev", "API"];
        let values = ["write", "12.5", "1.0", "2.0", "POSIX", "extra"];
        let metrics = zip_metrics(&header, &values, &["bw", "StdDev", "API"]);

        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics["bw"], MetricValue::Number(12.5));
        assert_eq!(metrics["StdDev"], MetricValue::Number(2.0));
        assert_eq!(metrics["access"], MetricValue::Text("write".into()));
        // In the numeric set but not a number.
        assert_eq!(metrics["API"], MetricValue::Text("POSIX".into()));
    }

    #[test]
    fn test_numeric_sets_are_disjoint() {
        for name in Dialect::Ior.numeric_metrics() {
            assert!(
                !Dialect::LsmBench.numeric_metrics().contains(name),
                "{} in both dialects",
                name
            );
        }
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("ior".parse::<Dialect>().unwrap(), Dialect::Ior);
        assert_eq!("LSM".parse::<Dialect>().unwrap(), Dialect::LsmBench);
        assert!("hdf5".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_parse_file_missing() {
        let fs = MockFs::new();
        let err = Dialect::Ior
            .parse_file(&fs, Path::new("/out/missing.txt.1"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
