//! Per-candidate outcome records, ranking and report output.
//!
//! Every profiled candidate produces exactly one [`Outcome`], faulted or not, so the report always
//! accounts for the full candidate set that was requested. Ranking puts measured outcomes first in
//! ascending time order; faulted outcomes carry the sentinel time and a NaN throughput and land at
//! the back in no guaranteed relative order.

use crate::algo::AlgoDesc;
use crate::consts;

use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Write};

/// Measurement of one candidate for one problem configuration. Immutable once created.
#[derive(Clone, Copy, Debug)]
pub struct Outcome {
    pub algo: AlgoDesc,
    /// Per-invocation elapsed time in milliseconds, averaged over the timed loop.
    pub time_ms: f32,
    /// Derived throughput in GFLOP/s.
    pub gflops: f32,
    pub fault: bool,
}

impl Outcome {
    /// A successfully measured candidate.
    pub fn measured(algo: AlgoDesc, time_ms: f32, gflops: f32) -> Self {
        debug_assert!(time_ms.is_finite() && gflops.is_finite());
        Self { algo, time_ms, gflops, fault: false }
    }

    /// A candidate that could not run or failed verification: sentinel time, NaN throughput.
    pub fn faulted(algo: AlgoDesc) -> Self {
        Self {
            algo,
            time_ms: consts::TIME_SENTINEL_MS,
            gflops: f32::NAN,
            fault: true,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:.4}, {:.3}", self.algo, self.time_ms, self.gflops)
    }
}

/// Writes the report's CSV header.
pub fn print_csv_header(output: &mut dyn Write) -> io::Result<()> {
    writeln!(
        output,
        "device, op(A), op(B), m, n, k, ComputeType, Atype, Btype, Ctype, \
         Dp4aRestrictions(lda.ldb), TensorCoreRestrictions(m.k.A.B.C.lda.ldb.ldc), \
         algo, time(ms), GFLOPS"
    )
}

/// Ranks outcomes: non-faulted before faulted, non-faulted in ascending elapsed time.
pub fn rank(mut outcomes: Vec<Outcome>) -> Vec<Outcome> {
    outcomes.sort_by(|x, y| {
        x.fault
            .cmp(&y.fault)
            .then(x.time_ms.partial_cmp(&y.time_ms).unwrap_or(Ordering::Equal))
    });
    outcomes
}

/// Emits one report line per outcome, each prefixed with the caller-supplied configuration
/// description.
pub fn emit(output: &mut dyn Write, config_info: &str, outcomes: &[Outcome]) -> io::Result<()> {
    outcomes
        .iter()
        .try_for_each(|outcome| writeln!(output, "{config_info}{outcome}"))
}
