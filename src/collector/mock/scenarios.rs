//! Pre-built report fixtures and output trees for testing.
//!
//! The trees follow the on-disk layout `<root>/<nodes>/<date>/<output file>`
//! for every cell of the fixed parameter space.

use std::path::Path;

use super::filesystem::MockFs;
use crate::models::{CellKey, NodeCount, StripeCount, StripeSize};

/// IOR report of a 1-node, 3-repetition POSIX run.
pub const IOR_REPORT: &str = "\
IOR-3.3.0: MPI Coordinated Test of Parallel I/O
Began               : Fri Jul 21 09:59:52 2023
Command line        : ior -a POSIX -b 2g -t 1m -i 3 -o /scratch/ior/data/4/1M/testfile
Machine             : Linux node169

Options:
api                 : POSIX
apiVersion          :
test filename       : /scratch/ior/data/4/1M/testfile
access              : single-shared-file
type                : independent
segments            : 1
ordering in a file  : sequential
tasks               : 1
clients per node    : 1
repetitions         : 3
xfersize            : 1 MiB
blocksize           : 2 GiB
aggregate filesize  : 2 GiB

Results:

access    bw(MiB/s)  IOPS       Latency(s)  block(KiB) xfer(KiB)  open(s)    wr/rd(s)   close(s)   total(s)   iter
------    ---------  ----       ----------  ---------- ---------  --------   --------   --------   --------   ----
write     4214.58    4214.60    0.000237    2097152    1024.00    0.000120   0.485937   0.000095   0.485944   0
read      13488.77   13490.12   0.000074    2097152    1024.00    0.000025   0.151833   0.000012   0.151839   0
write     2850.07    2850.11    0.000351    2097152    1024.00    0.000113   0.718580   0.000101   0.718584   1
read      10729.26   10730.02   0.000093    2097152    1024.00    0.000030   0.190878   0.000010   0.190882   1

Summary of all tests:
Operation   Max(MiB)   Min(MiB)  Mean(MiB)     StdDev   Max(OPs)   Min(OPs)  Mean(OPs)     StdDev    Mean(s) Stonewall(s) Stonewall(MiB) Test# #Tasks tPN reps fPP reord reordoff reordrand seed segcnt   blksiz    xsize aggs(MiB)   API RefNum
write        4214.58    2850.07    3571.98     466.80    4214.58    2850.07    3571.98     466.80    0.57420         NA            NA     0      1   1    3   0     0        1         0    0      1 2147483648  1048576    2048.0 POSIX      0
read        13488.77   10729.26   12152.44    1195.05   13488.77   10729.26   12152.44    1195.05    0.16993         NA            NA     0      1   1    3   0     0        1         0    0      1 2147483648  1048576    2048.0 POSIX      0
Finished            : Fri Jul 21 10:00:01 2023
";

/// Minimal IOR summary with the given max/min/mean write and read throughput.
pub fn ior_report(write: (f64, f64, f64), read: (f64, f64, f64)) -> String {
    format!(
        "\
Summary of all tests:
Operation   Max(MiB)   Min(MiB)  Mean(MiB)     StdDev   API
write       {:.2}    {:.2}    {:.2}     0.00    POSIX
read        {:.2}    {:.2}    {:.2}     0.00    POSIX
",
        write.0, write.1, write.2, read.0, read.1, read.2
    )
}

/// Summary numbers of one phase of a key-value benchmark run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LsmRun {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub total_mib: f64,
    pub total_ops: f64,
    pub iterations: u64,
}

impl LsmRun {
    pub fn new(max: f64, min: f64, mean: f64, total_mib: f64, total_ops: f64, iterations: u64) -> Self {
        Self {
            max,
            min,
            mean,
            total_mib,
            total_ops,
            iterations,
        }
    }
}

const LSM_HEADER: &str = "access,max(MiB)/s,min(MiB/s),mean(MiB/s),total(MiB),total(Ops),iteration";

/// Full per-node key-value benchmark report.
pub fn lsm_report(write: &LsmRun, read: &LsmRun) -> String {
    let row = |name: &str, run: &LsmRun| {
        format!(
            "{},{:.2},{:.2},{:.2},{:.2},{:.0},{}",
            name, run.max, run.min, run.mean, run.total_mib, run.total_ops, run.iterations
        )
    };
    let iteration = |name: &str, run: &LsmRun| {
        format!(
            "{},{:.2},{:.2},{:.2},{:.2},{:.0},1",
            name,
            run.mean,
            run.mean,
            run.mean,
            run.total_mib / run.iterations.max(1) as f64,
            run.total_ops / run.iterations.max(1) as f64
        )
    };

    format!(
        "\
BENCHMARK PARAMETERS:

 MPI: Enabled
 MPI Rank: 0
 fileName: kvbench.db
 dirName: /scratch/kv/data/4/1M
 iterations: {iters}
 keyCount: 4096
 valueSize: 65536

BENCHMARK RESULTS:

Iteration-WRITE: lsm
{header}
{iwrite}

Bench-WRITE: lsm
{header}
{write}

Iteration-READ: lsm
{header}
{iread}

Bench-READ: lsm
{header}
{read}
",
        iters = write.iterations,
        header = LSM_HEADER,
        iwrite = iteration("iwrite", write),
        write = row("write", write),
        iread = iteration("iread", read),
        read = row("read", read),
    )
}

/// Output filename for one rank of a cell.
pub fn output_file_name(label: &str, cell: CellKey, rank: u32) -> String {
    format!(
        "out-{}-{}-{}-2023-07-21-node{}-{}.txt.1",
        label,
        cell.stripe_count,
        cell.stripe_size,
        100 + rank,
        rank
    )
}

/// Peak write throughput the campaign fixtures assign to a cell.
pub fn fixture_write_peak(cell: CellKey) -> f64 {
    let stripes = match cell.stripe_count {
        StripeCount::Four => 1.0,
        StripeCount::Sixteen => 2.0,
    };
    let size = match cell.stripe_size {
        StripeSize::K64 => 0.25,
        StripeSize::M1 => 0.5,
        StripeSize::M8 => 0.75,
    };
    100.0 * cell.node_count.nodes() as f64 * stripes + size
}

/// Per-node run numbers used by [`MockFs::lsm_campaign`].
pub fn fixture_lsm_node(cell: CellKey, rank: u32) -> (LsmRun, LsmRun) {
    let base = fixture_write_peak(cell) / cell.node_count.nodes() as f64;
    let write = LsmRun::new(base + rank as f64, base / 2.0, base * 0.75, 2560.0, 40960.0, 10);
    let read = LsmRun::new(2.0 * base + rank as f64, base, base * 1.5, 2560.0, 40960.0, 10);
    (write, read)
}

impl MockFs {
    /// IOR campaign over every cell.
    ///
    /// Each cell has one output file per node; only rank 0 is non-empty.
    pub fn ior_campaign(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut fs = Self::new();
        for cell in CellKey::all() {
            let peak = fixture_write_peak(cell);
            let dir = root.join(cell.node_count.dir_name()).join("2023-07-21");
            for rank in 0..cell.node_count.nodes() {
                let content = if rank == 0 {
                    ior_report((peak, peak / 2.0, peak * 0.75), (peak * 3.0, peak, peak * 2.0))
                } else {
                    String::new()
                };
                fs.add_file(dir.join(output_file_name("collective", cell, rank)), content);
            }
        }
        fs
    }

    /// Key-value benchmark campaign: every node writes a full report.
    pub fn lsm_campaign(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut fs = Self::new();
        for cell in CellKey::all() {
            let dir = root.join(cell.node_count.dir_name()).join("2023-07-22");
            for rank in 0..cell.node_count.nodes() {
                let (write, read) = fixture_lsm_node(cell, rank);
                fs.add_file(
                    dir.join(output_file_name("lsm", cell, rank)),
                    lsm_report(&write, &read),
                );
            }
        }
        fs
    }

    /// Campaign with only the 1-node directory present.
    pub fn single_node_campaign(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut fs = Self::new();
        for cell in CellKey::all().filter(|c| c.node_count == NodeCount::N1) {
            let peak = fixture_write_peak(cell);
            fs.add_file(
                root.join("1")
                    .join("2023-07-21")
                    .join(output_file_name("collective", cell, 0)),
                ior_report((peak, peak, peak), (peak, peak, peak)),
            );
        }
        fs
    }
}
