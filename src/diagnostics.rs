//! Per-file and per-cell anomalies raised while building an index.
//!
//! None of these abort a build. They are handed to a [`Reporter`] that the
//! caller passes in; [`TracingReporter`] forwards them to `tracing`, and
//! [`RecordingReporter`] additionally keeps them for inspection.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, error};

use crate::models::CellKey;

/// Which count a participant mismatch was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchScope {
    /// Number of files the catalog holds for the cell.
    Catalog,
    /// Number of files the aggregator could actually use.
    Usable,
}

/// A recoverable data problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Filename does not follow the output naming grammar.
    UnrecognizedFilename { path: PathBuf },
    /// Entry sits where the layout expects something else (file vs directory).
    UnexpectedEntry { path: PathBuf, reason: &'static str },
    /// Entry was listed but gone (or unreadable) by the time it was inspected.
    VanishedEntry { path: PathBuf, error: String },
    /// File could not be parsed and is excluded from its cell.
    UnusableFile { path: PathBuf, error: String },
    /// Cell does not have the number of participants it should.
    ParticipantCountMismatch {
        cell: CellKey,
        scope: MismatchScope,
        expected: usize,
        found: usize,
    },
    /// Catalog has no entry for the cell at the named level.
    MissingCell { cell: CellKey, level: &'static str },
}

impl Anomaly {
    /// True for data-integrity violations, false for routine skips.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Anomaly::UnusableFile { .. }
                | Anomaly::ParticipantCountMismatch { .. }
                | Anomaly::MissingCell { .. }
        )
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnrecognizedFilename { path } => {
                write!(f, "unrecognized output filename: {}", path.display())
            }
            Anomaly::UnexpectedEntry { path, reason } => {
                write!(f, "unexpected entry {}: {}", path.display(), reason)
            }
            Anomaly::VanishedEntry { path, error } => {
                write!(f, "entry vanished during walk {}: {}", path.display(), error)
            }
            Anomaly::UnusableFile { path, error } => {
                write!(f, "unusable output file {}: {}", path.display(), error)
            }
            Anomaly::ParticipantCountMismatch {
                cell,
                scope,
                expected,
                found,
            } => {
                let what = match scope {
                    MismatchScope::Catalog => "output files",
                    MismatchScope::Usable => "usable records",
                };
                write!(
                    f,
                    "{}: expected {} {}, found {}",
                    cell, expected, what, found
                )
            }
            Anomaly::MissingCell { cell, level } => {
                write!(f, "{}: {} not found in output directory", cell, level)
            }
        }
    }
}

/// Sink for anomalies.
pub trait Reporter: Send + Sync {
    fn report(&self, anomaly: Anomaly);
}

/// Emits anomalies as `tracing` events: skips at debug, integrity violations at error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

fn emit(anomaly: &Anomaly) {
    if anomaly.is_integrity_violation() {
        error!("{}", anomaly);
    } else {
        debug!("{}", anomaly);
    }
}

impl Reporter for TracingReporter {
    fn report(&self, anomaly: Anomaly) {
        emit(&anomaly);
    }
}

/// Keeps every anomaly in memory and forwards it to `tracing`.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    anomalies: Mutex<Vec<Anomaly>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        match self.anomalies.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn integrity_violations(&self) -> usize {
        self.anomalies()
            .iter()
            .filter(|a| a.is_integrity_violation())
            .count()
    }

    pub fn len(&self) -> usize {
        self.anomalies().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, anomaly: Anomaly) {
        emit(&anomaly);
        match self.anomalies.lock() {
            Ok(mut guard) => guard.push(anomaly),
            Err(poisoned) => poisoned.into_inner().push(anomaly),
        }
    }
}
