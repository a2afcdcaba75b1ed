//! Benchmark cell key domain.
//!
//! A cell is one (node count, stripe count, stripe size) combination. All
//! three axes are small fixed enumerations, so they are modeled as enums
//! with a dense `index()` that the aggregation table is addressed by.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// I/O direction of a benchmark phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::Read, Operation::Write];

    /// Lowercase name used by both raw dialects ("read" / "write").
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "write" => Ok(Operation::Write),
            other => Err(format!("unknown operation '{}' (expected read or write)", other)),
        }
    }
}

/// Number of nodes that took part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeCount {
    N1,
    N2,
    N4,
    N8,
    N16,
    N24,
    N32,
    N40,
    N48,
}

impl NodeCount {
    pub const COUNT: usize = 9;

    /// Declared ascending order. Time series follow this order verbatim.
    pub const ALL: [NodeCount; Self::COUNT] = [
        NodeCount::N1,
        NodeCount::N2,
        NodeCount::N4,
        NodeCount::N8,
        NodeCount::N16,
        NodeCount::N24,
        NodeCount::N32,
        NodeCount::N40,
        NodeCount::N48,
    ];

    pub fn nodes(&self) -> u32 {
        match self {
            NodeCount::N1 => 1,
            NodeCount::N2 => 2,
            NodeCount::N4 => 4,
            NodeCount::N8 => 8,
            NodeCount::N16 => 16,
            NodeCount::N24 => 24,
            NodeCount::N32 => 32,
            NodeCount::N40 => 40,
            NodeCount::N48 => 48,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_nodes(nodes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.nodes() == nodes)
    }

    /// Name of the output directory holding runs with this node count.
    pub fn dir_name(&self) -> String {
        self.nodes().to_string()
    }
}

impl fmt::Display for NodeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes())
    }
}

/// Number of OSTs a file is striped across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StripeCount {
    Four,
    Sixteen,
}

impl StripeCount {
    pub const COUNT: usize = 2;
    pub const ALL: [StripeCount; Self::COUNT] = [StripeCount::Four, StripeCount::Sixteen];

    pub fn count(&self) -> u32 {
        match self {
            StripeCount::Four => 4,
            StripeCount::Sixteen => 16,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_count(count: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.count() == count)
    }
}

impl fmt::Display for StripeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

impl FromStr for StripeCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::from_count)
            .ok_or_else(|| format!("unsupported stripe count '{}' (expected 4 or 16)", s))
    }
}

/// Stripe size, written with a binary unit suffix in filenames ("64K", "1M", "8M").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StripeSize {
    K64,
    M1,
    M8,
}

impl StripeSize {
    pub const COUNT: usize = 3;
    pub const ALL: [StripeSize; Self::COUNT] = [StripeSize::K64, StripeSize::M1, StripeSize::M8];

    pub fn label(&self) -> &'static str {
        match self {
            StripeSize::K64 => "64K",
            StripeSize::M1 => "1M",
            StripeSize::M8 => "8M",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for StripeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StripeSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(&s.trim().to_ascii_uppercase())
            .ok_or_else(|| format!("unsupported stripe size '{}' (expected 64K, 1M or 8M)", s))
    }
}

/// One benchmark configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellKey {
    pub node_count: NodeCount,
    pub stripe_count: StripeCount,
    pub stripe_size: StripeSize,
}

impl CellKey {
    pub fn new(node_count: NodeCount, stripe_count: StripeCount, stripe_size: StripeSize) -> Self {
        Self {
            node_count,
            stripe_count,
            stripe_size,
        }
    }

    /// Every cell, node count outermost and stripe size innermost.
    pub fn all() -> impl Iterator<Item = CellKey> {
        NodeCount::ALL.into_iter().flat_map(|n| {
            StripeCount::ALL.into_iter().flat_map(move |c| {
                StripeSize::ALL
                    .into_iter()
                    .map(move |s| CellKey::new(n, c, s))
            })
        })
    }

    /// Number of per-node participants a complete cell is expected to have.
    pub fn expected_participants(&self) -> usize {
        self.node_count.nodes() as usize
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} stripes={} size={}",
            self.node_count, self.stripe_count, self.stripe_size
        )
    }
}
