//! Output filename grammar.
//!
//! Every per-node output file is named
//! `out-<label>-<stripe count>-<stripe size>-<date>-<host>-<rank>.<ext>.<seq>`,
//! e.g. `out-collective-16-1M-2023-07-21-node169-0.txt.2`. The label is
//! free-form and may itself contain dashes and digits.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static OUTPUT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^out-(?P<label>[A-Za-z0-9-]*)-(?P<stripe_count>\d+)-(?P<stripe_size>\d+[KMGTB])-(?P<date>\d+-\d+-\d+)-(?P<host>[A-Za-z0-9]+)-(?P<rank>\d+)\.(?P<ext>\w+)\.(?P<seq>\d+)$",
    )
    .expect("output filename pattern is valid")
});

/// Filename does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyError {
    pub name: String,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized output filename: {}", self.name)
    }
}

impl std::error::Error for ClassifyError {}

/// Fields decoded from an output filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFileName {
    pub label: String,
    pub stripe_count: u32,
    /// Size with its unit suffix, as written ("64K", "1M").
    pub stripe_size: String,
    pub date: String,
    pub host: String,
    pub rank: u32,
    pub ext: String,
    pub seq: u32,
}

impl RunFileName {
    /// Run date as a calendar date, when the date field is a valid one.
    pub fn run_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Decodes stripe parameters (and the rest of the fields) from a filename.
pub fn classify(name: &str) -> Result<RunFileName, ClassifyError> {
    let unrecognized = || ClassifyError {
        name: name.to_string(),
    };
    let caps = OUTPUT_NAME.captures(name).ok_or_else(unrecognized)?;

    // Digit runs can still overflow u32.
    let number = |group: &str| caps[group].parse::<u32>().map_err(|_| unrecognized());

    Ok(RunFileName {
        label: caps["label"].to_string(),
        stripe_count: number("stripe_count")?,
        stripe_size: caps["stripe_size"].to_string(),
        date: caps["date"].to_string(),
        host: caps["host"].to_string(),
        rank: number("rank")?,
        ext: caps["ext"].to_string(),
        seq: number("seq")?,
    })
}
