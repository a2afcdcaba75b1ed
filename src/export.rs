//! Summary CSV export of an aggregation index.
//!
//! Output uses the consolidated report format read by
//! [`SummaryReport`](crate::parser::summary::SummaryReport).

use std::io::{self, Write};

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::aggregate::AggregationIndex;
use crate::models::{CellKey, NodeCount, Operation, StripeCount, StripeSize};

pub const HEADER: &str = "N,Stripes,BlockSize,Operation,Max(MiB),Min(MiB),Mean(MiB)";

/// Stripe sizes in label order ("1M" < "64K" < "8M"), as the reports sort them.
const SIZES_BY_LABEL: [StripeSize; StripeSize::COUNT] =
    [StripeSize::M1, StripeSize::K64, StripeSize::M8];

fn two_decimals<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&format_args!("{:.2}", value))
}

#[derive(Serialize)]
struct SummaryRow {
    nodes: u32,
    stripes: u32,
    size: &'static str,
    operation: Operation,
    #[serde(serialize_with = "two_decimals")]
    max: f64,
    #[serde(serialize_with = "two_decimals")]
    min: f64,
    #[serde(serialize_with = "two_decimals")]
    mean: f64,
}

/// Writes one row per non-empty cell and operation.
///
/// Rows are ordered by operation, stripe size label (as text), stripe count,
/// then node count. Returns the number of data rows written.
pub fn write_summary_csv<W: Write>(w: &mut W, index: &AggregationIndex) -> io::Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    writer.write_record(HEADER.split(','))?;

    let mut rows = 0;
    for op in Operation::ALL {
        for size in SIZES_BY_LABEL {
            for count in StripeCount::ALL {
                for nodes in NodeCount::ALL {
                    let cell = CellKey::new(nodes, count, size);
                    let record = index.get(cell);
                    if record.is_empty() {
                        continue;
                    }
                    let Some(t) = record.throughput(op) else {
                        warn!(%cell, operation = %op, "record lacks throughput columns, not exported");
                        continue;
                    };
                    writer.serialize(SummaryRow {
                        nodes: nodes.nodes(),
                        stripes: count.count(),
                        size: size.label(),
                        operation: op,
                        max: t.max,
                        min: t.min,
                        mean: t.mean,
                    })?;
                    rows += 1;
                }
            }
        }
    }
    writer.flush()?;

    debug!(rows, dialect = %index.dialect(), "exported summary");
    Ok(rows)
}
