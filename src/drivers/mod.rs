//! Execution-target drivers and the profiling orchestrator.
//!
//! This module is the seam between the harness and whatever actually runs the GEMM: the
//! [`Target`] trait bundles the collaborators the sweep needs (buffer allocation and transfer, a
//! two-marker timer, and candidate dispatch), and [`profile_gemm`]/[`run`] drive the sweep on any
//! implementation of it.
//!
//! # High-level approach for candidate profiling
//! ## 1. Data initialization
//! Per operand type combination the driver allocates the A/B input operands (seeded with a
//! reproducible pattern), a zeroed candidate output C and a reference output D, computes the
//! reference once on the host and uploads it. Buffers are RAII handles, released when the
//! combination's sweep ends on every exit path.
//!
//! ## 2. Performance evaluation
//! Each candidate is invoked in a timed tight loop (`--loop` repetitions) and the target is
//! synchronized before the elapsed time is read, so measurements of consecutive candidates never
//! overlap. A candidate the backend rejects for this configuration is marked faulted without
//! aborting the sweep; any other backend failure aborts the whole run.
//!
//! ## 3. Post-processing
//! Non-faulted candidates are verified against the reference (a mismatch faults the candidate and
//! dumps the operands), C is cleared for the next candidate, throughput is derived from problem
//! size and averaged time, and the outcomes are ranked and written as CSV records.

#[cfg(feature = "cuda")]
pub mod cuda;
pub mod host;

use crate::algo::{self, AlgoDesc, AlgoSelection, AlgoTable};
use crate::cli::CliArgs;
use crate::error::ProfError;
use crate::kernels;
use crate::perf_report::{self, Outcome};
use crate::types::{ElemKind, GemmShape, GEMM_TYPES};
use crate::utils;
use crate::verify;

use std::io::Write;

/// A buffer resident on the execution target.
pub trait DeviceBuf {
    /// Buffer size in bytes.
    fn size(&self) -> usize;
    /// Base address on the target, for alignment diagnostics.
    fn device_addr(&self) -> usize;
}

/// Status of one backend GEMM invocation.
///
/// Only the two soft variants are absorbed into a faulted outcome; `Fatal` carries every other
/// backend status and terminates the run. Whether further backend statuses should count as soft is
/// a per-backend decision made where this enum is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecStatus {
    Success,
    /// The backend does not support this candidate for this configuration.
    NotSupported,
    /// The backend rejected a parameter for this candidate.
    InvalidValue,
    /// Any other backend failure.
    Fatal(String),
}

/// An execution target: the collaborators the sweep drives, behind one seam.
pub trait Target {
    type Buffer: DeviceBuf;

    /// Device identity reported in the first output column.
    fn name(&self) -> &str;

    /// Whether the target has a tensor-op candidate enumeration worth sweeping.
    fn tensor_op_capable(&self) -> bool;

    fn alloc(&mut self, bytes: usize) -> Result<Self::Buffer, ProfError>;
    fn upload(&mut self, buf: &mut Self::Buffer, bytes: &[u8]) -> Result<(), ProfError>;
    fn download(&mut self, buf: &Self::Buffer) -> Result<Vec<u8>, ProfError>;
    fn zero(&mut self, buf: &mut Self::Buffer) -> Result<(), ProfError>;

    /// Places the timer's start marker.
    fn timer_start(&mut self) -> Result<(), ProfError>;

    /// Places the end marker, synchronizes the target and returns the elapsed milliseconds.
    fn timer_stop(&mut self) -> Result<f32, ProfError>;

    /// Dispatches one GEMM invocation of `algo`, writing into the C buffer of `ops`.
    fn gemm(
        &mut self,
        shape: &GemmShape,
        ops: &mut Operands<Self::Buffer>,
        algo: &AlgoDesc,
    ) -> ExecStatus;

    /// Tuned candidate enumeration of the target's extended backend for this problem, restricted
    /// to a workspace budget in bytes. Targets without an extended backend return no candidates
    /// and the sweep driver skips the extended pass.
    fn lt_candidates(
        &mut self,
        _shape: &GemmShape,
        _workspace_bytes: usize,
    ) -> Result<Vec<AlgoDesc>, ProfError> {
        Ok(Vec::new())
    }
}

/// Operand buffers of one problem configuration.
pub struct Operands<B> {
    pub a: B,
    pub b: B,
    /// Candidate output, cleared between candidates.
    pub c: B,
    /// Reference output, written once per configuration.
    pub d: B,
    /// Optional scratch buffer shared by all candidates.
    pub workspace: Option<B>,
}

/// Profiles every candidate in `algos` for one problem configuration and returns the ranked
/// outcomes.
///
/// Per candidate: timed loop of `loop_count` invocations, soft backend rejections fault the
/// candidate and stop its loop early, verification of C against D, an operand dump on mismatch,
/// and an unconditional clearing of C so no candidate observes a predecessor's output. A fatal
/// backend status aborts the whole sweep.
pub fn profile_gemm<T: Target>(
    target: &mut T,
    shape: &GemmShape,
    ops: &mut Operands<T::Buffer>,
    algos: &[AlgoDesc],
    loop_count: u32,
) -> Result<Vec<Outcome>, ProfError> {
    let mut results = Vec::with_capacity(algos.len());

    for algo in algos {
        let mut fault = false;

        target.timer_start()?;
        for _ in 0..loop_count {
            match target.gemm(shape, ops, algo) {
                ExecStatus::Success => {}
                ExecStatus::NotSupported | ExecStatus::InvalidValue => {
                    fault = true;
                    break;
                }
                ExecStatus::Fatal(msg) => return Err(ProfError::Backend(msg)),
            }
        }
        let elapsed_ms = target.timer_stop()?;

        if !fault {
            let c = target.download(&ops.c)?;
            let d = target.download(&ops.d)?;
            if !verify::verify(shape.dtype.c, &c, &d) {
                fault = true;
                let a = target.download(&ops.a)?;
                let b = target.download(&ops.b)?;
                verify::print_matrix("A", shape.dtype.a, &a, shape.a_rows(), shape.a_cols(), shape.lda);
                verify::print_matrix("B", shape.dtype.b, &b, shape.b_rows(), shape.b_cols(), shape.ldb);
                verify::print_matrix("C", shape.dtype.c, &c, shape.m, shape.n, shape.ldc);
                verify::print_matrix("D", shape.dtype.c, &d, shape.m, shape.n, shape.ldc);
            }
        }

        target.zero(&mut ops.c)?;

        results.push(if fault {
            Outcome::faulted(*algo)
        } else {
            // A coarse host clock can read zero across a trivially small loop; clamping to a
            // nanosecond keeps the derived throughput finite and positive.
            let avg_ms = (elapsed_ms / loop_count as f32).max(1e-6);
            let gflops = (shape.flops() * 1e-9 / (avg_ms as f64 * 1e-3)).min(f32::MAX as f64) as f32;
            Outcome::measured(*algo, avg_ms, gflops)
        });
    }

    Ok(perf_report::rank(results))
}

/// Runs the whole sweep: for every requested type combination, sets up the operands, computes the
/// reference, profiles the standard candidate table, the tensor-op table (on tensor-capable
/// targets) and the extended-backend enumeration (on targets exposing one), and writes the ranked
/// report records.
///
/// The `--workspace` budget is allocated once per combination and handed to every candidate; the
/// extended-backend enumeration is queried against that budget.
pub fn run<T: Target>(target: &mut T, args: &CliArgs, output: &mut dyn Write) -> Result<(), ProfError> {
    let std_algos = AlgoSelection::from_args(args.all_algo, args.algo.as_deref())
        .resolve(&AlgoTable::standard())?;
    let tensor_algos = AlgoSelection::from_args(args.all_algo, args.tensor_algo.as_deref())
        .resolve(&AlgoTable::tensor_op())?;
    let seed = args.seed.unwrap_or(0);

    perf_report::print_csv_header(output)?;

    for &type_id in &args.dtypes {
        let combo = *GEMM_TYPES.get(type_id).ok_or_else(|| {
            ProfError::Config(format!(
                "unknown type combination ID {type_id} (0..={})",
                GEMM_TYPES.len() - 1
            ))
        })?;
        eprint!("Type combination: {type_id}\r");

        let shape = GemmShape::new(
            args.m as usize,
            args.n as usize,
            args.k as usize,
            args.ta,
            args.tb,
            combo,
        );

        let a_host = utils::init_matrix(shape.a_rows(), shape.a_cols(), shape.lda, combo.a, seed);
        let b_host = utils::init_matrix(
            shape.b_rows(),
            shape.b_cols(),
            shape.ldb,
            combo.b,
            seed.wrapping_add(1),
        );
        let d_host = kernels::reference_gemm(&shape, &a_host, &b_host);

        let mut a = target.alloc(a_host.len())?;
        target.upload(&mut a, &a_host)?;
        let mut b = target.alloc(b_host.len())?;
        target.upload(&mut b, &b_host)?;
        let mut c = target.alloc(shape.m * shape.n * combo.c.size())?;
        target.zero(&mut c)?;
        let mut d = target.alloc(d_host.len())?;
        target.upload(&mut d, &d_host)?;
        let workspace = match args.workspace {
            0 => None,
            mib => Some(target.alloc(mib << 20)?),
        };
        let mut ops = Operands { a, b, c, d, workspace };

        let dp4a_info = if combo.a == ElemKind::I8 {
            algo::dp4a_restrictions(&shape)
        } else {
            "NA".to_string()
        };
        let config_info = format!(
            "{}, {}, {}, {dp4a_info}, ",
            target.name(),
            shape.dims_info(),
            combo.info(),
        );

        let outcomes = profile_gemm(target, &shape, &mut ops, &std_algos, args.loop_count)?;
        perf_report::emit(output, &format!("{config_info}NA, "), &outcomes)?;

        if target.tensor_op_capable() {
            let tensor_info = algo::tensor_op_restrictions(
                &shape,
                ops.a.device_addr(),
                ops.b.device_addr(),
                ops.c.device_addr(),
            );
            let outcomes = profile_gemm(target, &shape, &mut ops, &tensor_algos, args.loop_count)?;
            perf_report::emit(output, &format!("{config_info}{tensor_info}, "), &outcomes)?;
        }

        let workspace_bytes = ops.workspace.as_ref().map_or(0, |w| w.size());
        let lt_algos = target.lt_candidates(&shape, workspace_bytes)?;
        if !lt_algos.is_empty() {
            let outcomes = profile_gemm(target, &shape, &mut ops, &lt_algos, args.loop_count)?;
            perf_report::emit(output, &format!("{config_info}NA, "), &outcomes)?;
        }
    }

    Ok(())
}
