//! iobench - parallel filesystem benchmark result aggregator.
//!
//! Walks a benchmark output tree, aggregates every (node count, stripe count,
//! stripe size) cell and prints catalogs, time series or summary exports.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use iobench::aggregate::{AggregationIndex, TimeSeries};
use iobench::collector::{IndexError, OutputCatalog, RealFs, date_range};
use iobench::diagnostics::{RecordingReporter, TracingReporter};
use iobench::export::write_summary_csv;
use iobench::fmt::{FmtStyle, format_bytes, format_mib_rate, format_opt_f64, truncate};
use iobench::models::{Operation, StripeCount, StripeSize};
use iobench::parser::Dialect;
use iobench::parser::summary::SummaryReport;

/// Benchmark result aggregator.
#[derive(Parser)]
#[command(name = "iobench", about = "Aggregate IOR and key-value benchmark output", version)]
struct Args {
    /// Benchmark output root (<root>/<nodes>/<date>/out-*).
    #[arg(short, long, env = "IOBENCH_ROOT", default_value = "./output")]
    root: PathBuf,

    /// Raw output dialect: ior or lsm.
    #[arg(short, long, default_value = "ior")]
    dialect: Dialect,

    /// Verbose mode (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// Cell selection shared by the series commands.
#[derive(clap::Args)]
struct SeriesArgs {
    /// Operation: read or write.
    #[arg(long)]
    op: Operation,

    /// Stripe count: 4 or 16.
    #[arg(long)]
    stripe_count: StripeCount,

    /// Stripe size: 64K, 1M or 8M.
    #[arg(long)]
    stripe_size: StripeSize,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List cataloged output files per cell.
    Tree,
    /// Peak throughput by node count from raw output.
    Series(SeriesArgs),
    /// Write the aggregation index as a summary CSV.
    Export {
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Peak throughput by node count from a summary CSV report.
    Summary {
        /// Summary CSV report.
        #[arg(long, value_name = "FILE")]
        report: PathBuf,

        #[command(flatten)]
        series: SeriesArgs,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("iobench={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Serialize)]
struct SeriesOutput<'a> {
    operation: Operation,
    stripe_count: u32,
    stripe_size: &'a str,
    #[serde(flatten)]
    series: &'a TimeSeries,
}

fn print_series(args: &SeriesArgs, series: &TimeSeries) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let payload = SeriesOutput {
            operation: args.op,
            stripe_count: args.stripe_count.count(),
            stripe_size: args.stripe_size.label(),
            series,
        };
        serde_json::to_writer_pretty(&mut out, &payload).map_err(io::Error::other)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "{} stripes={} size={}",
        args.op, args.stripe_count, args.stripe_size
    )?;
    writeln!(out, "{:>5}  {:>12}  {:>10}", "NODES", "MAX(MiB/s)", "RATE")?;
    for (nodes, value) in series.iter() {
        writeln!(
            out,
            "{:>5}  {}  {:>10}",
            nodes,
            format_opt_f64(Some(value), 12, 2),
            format_mib_rate(value, FmtStyle::Compact)
        )?;
    }
    Ok(())
}

/// Max, min and mean per node count, straight from a summary report.
fn print_report_points(
    report: &SummaryReport,
    args: &SeriesArgs,
    series: &TimeSeries,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "{} stripes={} size={}",
        args.op, args.stripe_count, args.stripe_size
    )?;
    writeln!(
        out,
        "{:>5}  {:>12}  {:>12}  {:>12}",
        "NODES", "MAX(MiB/s)", "MIN(MiB/s)", "MEAN(MiB/s)"
    )?;
    for (nodes, _) in series.iter() {
        let Some(point) = report.point(
            args.op,
            args.stripe_count.count(),
            args.stripe_size.label(),
            nodes,
        ) else {
            continue;
        };
        writeln!(
            out,
            "{:>5}  {}  {}  {}",
            nodes,
            format_opt_f64(Some(point.max_mib), 12, 2),
            format_opt_f64(Some(point.min_mib), 12, 2),
            format_opt_f64(Some(point.mean_mib), 12, 2)
        )?;
    }
    Ok(())
}

fn print_tree(catalog: &OutputCatalog) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", catalog.root().display())?;
    writeln!(
        out,
        "{:>5}  {:>7}  {:>5}  {:>5}  {:>9}  {:<21}  {}",
        "NODES", "STRIPES", "SIZE", "FILES", "BYTES", "DATES", "FIRST"
    )?;
    for (size_class, counts) in catalog.size_classes() {
        for (count, sizes) in counts {
            for (size, files) in sizes {
                let bytes: u64 = files.values().map(|f| f.size).sum();
                let first = files.keys().next().map(String::as_str).unwrap_or("-");
                let dates = match date_range(files) {
                    Some((from, to)) if from == to => from.to_string(),
                    Some((from, to)) => format!("{}..{}", from, to),
                    None => "-".to_string(),
                };
                writeln!(
                    out,
                    "{:>5}  {:>7}  {:>5}  {:>5}  {:>9}  {:<21}  {}",
                    size_class,
                    count,
                    size,
                    files.len(),
                    format_bytes(bytes, FmtStyle::Compact),
                    dates,
                    truncate(first, 48)
                )?;
            }
        }
    }
    writeln!(out, "{} files", catalog.file_count())?;
    Ok(())
}

fn build_index(
    root: &Path,
    dialect: Dialect,
    reporter: &RecordingReporter,
) -> Result<AggregationIndex, IndexError> {
    let index = AggregationIndex::build(&RealFs::new(), root, dialect, reporter)?;
    let violations = reporter.integrity_violations();
    if violations > 0 {
        warn!(
            anomalies = reporter.len(),
            violations, "index built with data-integrity violations"
        );
    }
    Ok(index)
}

fn run(args: &Args) -> Result<(), String> {
    let reporter = RecordingReporter::new();

    match &args.command {
        Command::Tree => {
            let catalog =
                OutputCatalog::build(&RealFs::new(), &args.root, &TracingReporter::new())
                    .map_err(|e| e.to_string())?;
            print_tree(&catalog).map_err(|e| e.to_string())?;
        }
        Command::Series(series_args) => {
            let index = build_index(&args.root, args.dialect, &reporter).map_err(|e| e.to_string())?;
            let series = index
                .time_series(series_args.op, series_args.stripe_count, series_args.stripe_size)
                .map_err(|e| e.to_string())?;
            print_series(series_args, &series).map_err(|e| e.to_string())?;
        }
        Command::Export { output } => {
            let index = build_index(&args.root, args.dialect, &reporter).map_err(|e| e.to_string())?;
            let rows = match output {
                Some(path) => {
                    let file = File::create(path)
                        .map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
                    let mut w = BufWriter::new(file);
                    let rows = write_summary_csv(&mut w, &index).map_err(|e| e.to_string())?;
                    w.flush().map_err(|e| e.to_string())?;
                    rows
                }
                None => {
                    let stdout = io::stdout();
                    let mut w = stdout.lock();
                    write_summary_csv(&mut w, &index).map_err(|e| e.to_string())?
                }
            };
            info!(rows, "summary exported");
        }
        Command::Summary { report, series } => {
            let parsed = SummaryReport::parse_file(&RealFs::new(), report)
                .map_err(|e| format!("{}: {}", report.display(), e))?;
            let ts = parsed.time_series(
                series.op,
                series.stripe_count.count(),
                series.stripe_size.label(),
            );
            if ts.is_empty() {
                warn!(
                    report = %report.display(),
                    "no rows for {} stripes={} size={}",
                    series.op, series.stripe_count, series.stripe_size
                );
            }
            if series.json {
                print_series(series, &ts).map_err(|e| e.to_string())?;
            } else {
                print_report_points(&parsed, series, &ts).map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
