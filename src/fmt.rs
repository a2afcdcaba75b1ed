//! Formatting helpers for command-line output.
//!
//! Functions that differ between compact table columns and verbose listings
//! are parameterized via [`FmtStyle`].

/// Controls compact (table columns) vs verbose (listings) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("1.5G", "4.1G/s")
    Compact,
    /// Detail: spaces, full suffixes ("1.5 GiB", "4.1 GiB/s")
    Detail,
}

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G", "M", "K", "B"),
        FmtStyle::Detail => (" GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0 * 1024.0), g)
    } else if bytes >= 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0), m)
    } else if bytes >= 1024 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Format a throughput given in MiB/s.
///
/// Rates of 1024 MiB/s and above switch to GiB/s; zero prints `"0"`.
pub fn format_mib_rate(mib_s: f64, style: FmtStyle) -> String {
    if mib_s <= 0.0 {
        return "0".to_string();
    }
    let (g, m) = match style {
        FmtStyle::Compact => ("G/s", "M/s"),
        FmtStyle::Detail => (" GiB/s", " MiB/s"),
    };
    if mib_s >= 1024.0 {
        format!("{:.1}{}", mib_s / 1024.0, g)
    } else {
        format!("{:.1}{}", mib_s, m)
    }
}

/// Right-aligned fixed-precision number, `"-"` when absent.
pub fn format_opt_f64(v: Option<f64>, width: usize, precision: usize) -> String {
    match v {
        Some(v) => format!("{:>width$.precision$}", v, width = width, precision = precision),
        None => format!("{:>width$}", "-", width = width),
    }
}

/// Truncates to `max_len` characters, marking the cut with `~`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep: String = s.chars().take(max_len.saturating_sub(1)).collect();
    format!("{}~", keep)
}
