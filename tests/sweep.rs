//! End-to-end sweep scenarios driven through the public orchestrator API, using the host target
//! and a scripted mock target.

use gemmprof::algo::{AlgoDesc, AlgoId, AlgoSelection, AlgoTable, GEMM_DEFAULT};
use gemmprof::cli::CliArgs;
use gemmprof::consts;
use gemmprof::drivers::{self, DeviceBuf, ExecStatus, Operands, Target};
use gemmprof::drivers::host::HostTarget;
use gemmprof::error::ProfError;
use gemmprof::kernels;
use gemmprof::perf_report::Outcome;
use gemmprof::types::{GemmShape, GEMM_TYPES};
use gemmprof::utils;

use std::collections::HashSet;

struct MockBuf {
    data: Vec<u8>,
}

impl DeviceBuf for MockBuf {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn device_addr(&self) -> usize {
        self.data.as_ptr() as usize
    }
}

/// Scripted target: each invocation advances a fake clock by a fixed tick, and per-algorithm
/// behavior is programmed up front.
#[derive(Default)]
struct MockTarget {
    clock_ms: f64,
    started_at: Option<f64>,
    tick_ms: f64,
    unsupported: HashSet<i32>,
    fatal: HashSet<i32>,
    corrupt: HashSet<i32>,
}

impl MockTarget {
    fn new(tick_ms: f64) -> Self {
        Self { tick_ms, ..Self::default() }
    }
}

impl Target for MockTarget {
    type Buffer = MockBuf;

    fn name(&self) -> &str {
        "mock"
    }

    fn tensor_op_capable(&self) -> bool {
        true
    }

    fn alloc(&mut self, bytes: usize) -> Result<MockBuf, ProfError> {
        Ok(MockBuf { data: vec![0; bytes] })
    }

    fn upload(&mut self, buf: &mut MockBuf, bytes: &[u8]) -> Result<(), ProfError> {
        buf.data.copy_from_slice(bytes);
        Ok(())
    }

    fn download(&mut self, buf: &MockBuf) -> Result<Vec<u8>, ProfError> {
        Ok(buf.data.clone())
    }

    fn zero(&mut self, buf: &mut MockBuf) -> Result<(), ProfError> {
        buf.data.fill(0);
        Ok(())
    }

    fn timer_start(&mut self) -> Result<(), ProfError> {
        self.started_at = Some(self.clock_ms);
        Ok(())
    }

    fn timer_stop(&mut self) -> Result<f32, ProfError> {
        let started = self
            .started_at
            .take()
            .ok_or_else(|| ProfError::Device("timer not started".into()))?;
        Ok((self.clock_ms - started) as f32)
    }

    fn gemm(&mut self, _shape: &GemmShape, ops: &mut Operands<MockBuf>, algo: &AlgoDesc) -> ExecStatus {
        if self.unsupported.contains(&algo.id.0) {
            return ExecStatus::NotSupported;
        }
        if self.fatal.contains(&algo.id.0) {
            return ExecStatus::Fatal(format!("scripted fatal status for {}", algo.id));
        }
        self.clock_ms += self.tick_ms;
        if self.corrupt.contains(&algo.id.0) {
            ops.c.data.fill(0xAB);
        } else {
            ops.c.data = ops.d.data.clone();
        }
        ExecStatus::Success
    }
}

/// Sets up operands the way the sweep driver does: seeded A/B, zeroed C, reference D.
fn operands<T: Target>(target: &mut T, shape: &GemmShape) -> Operands<T::Buffer> {
    let a_host = utils::init_matrix(shape.a_rows(), shape.a_cols(), shape.lda, shape.dtype.a, 0);
    let b_host = utils::init_matrix(shape.b_rows(), shape.b_cols(), shape.ldb, shape.dtype.b, 1);
    let d_host = kernels::reference_gemm(shape, &a_host, &b_host);

    let mut a = target.alloc(a_host.len()).unwrap();
    target.upload(&mut a, &a_host).unwrap();
    let mut b = target.alloc(b_host.len()).unwrap();
    target.upload(&mut b, &b_host).unwrap();
    let c = target.alloc(d_host.len()).unwrap();
    let mut d = target.alloc(d_host.len()).unwrap();
    target.upload(&mut d, &d_host).unwrap();

    Operands { a, b, c, d, workspace: None }
}

fn descs(ids: &[i32]) -> Vec<AlgoDesc> {
    ids.iter().map(|&id| AlgoDesc::plain(AlgoId(id))).collect()
}

fn base_args() -> CliArgs {
    CliArgs {
        m: 32,
        n: 32,
        k: 32,
        device: 0,
        loop_count: 1,
        ta: false,
        tb: false,
        dtypes: vec![5],
        algo: None,
        tensor_algo: None,
        all_algo: false,
        workspace: 0,
        output_file: None,
        seed: None,
    }
}

#[test]
fn default_candidate_yields_one_measured_outcome() {
    let mut target = HostTarget::new();
    let shape = GemmShape::new(32, 32, 32, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut target, &shape);

    let outcomes =
        drivers::profile_gemm(&mut target, &shape, &mut ops, &descs(&[-1]), 1).unwrap();

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.algo.id, GEMM_DEFAULT);
    assert!(!outcome.fault);
    assert!(outcome.time_ms > 0.0);
    assert!(outcome.gflops.is_finite() && outcome.gflops > 0.0);
}

#[test]
fn c_is_cleared_after_every_candidate() {
    let mut target = HostTarget::new();
    let shape = GemmShape::new(8, 8, 8, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut target, &shape);

    drivers::profile_gemm(&mut target, &shape, &mut ops, &descs(&[-1, 0]), 2).unwrap();
    assert!(ops.c.bytes().iter().all(|&b| b == 0));

    // The clearing is unconditional: a faulted candidate leaves C zeroed too.
    let mut mock = MockTarget::new(1.0);
    mock.corrupt.insert(0);
    let mut ops = operands(&mut mock, &shape);
    let outcomes = drivers::profile_gemm(&mut mock, &shape, &mut ops, &descs(&[0]), 1).unwrap();
    assert!(outcomes[0].fault);
    assert!(ops.c.data.iter().all(|&b| b == 0));
}

#[test]
fn unsupported_candidate_is_isolated() {
    let mut mock = MockTarget::new(1.0);
    mock.unsupported.insert(0);
    let shape = GemmShape::new(4, 4, 4, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut mock, &shape);

    let outcomes =
        drivers::profile_gemm(&mut mock, &shape, &mut ops, &descs(&[-1, 0, 1]), 1).unwrap();

    assert_eq!(outcomes.len(), 3);
    let faulted: Vec<_> = outcomes.iter().filter(|o| o.fault).collect();
    assert_eq!(faulted.len(), 1);
    assert_eq!(faulted[0].algo.id, AlgoId(0));
    assert_eq!(faulted[0].time_ms, consts::TIME_SENTINEL_MS);
    assert!(faulted[0].gflops.is_nan());

    // The sweep still reports the candidates after the faulted one, and ranking puts the fault
    // last.
    assert!(outcomes.iter().any(|o| o.algo.id == AlgoId(1) && !o.fault));
    assert!(outcomes.last().unwrap().fault);
}

#[test]
fn verification_mismatch_faults_and_continues() {
    let mut mock = MockTarget::new(1.0);
    mock.corrupt.insert(-1);
    let shape = GemmShape::new(4, 4, 4, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut mock, &shape);

    let outcomes =
        drivers::profile_gemm(&mut mock, &shape, &mut ops, &descs(&[-1, 0]), 1).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().any(|o| o.algo.id == GEMM_DEFAULT && o.fault));
    assert!(outcomes.iter().any(|o| o.algo.id == AlgoId(0) && !o.fault));
}

#[test]
fn fatal_backend_status_aborts_the_sweep() {
    let mut mock = MockTarget::new(1.0);
    mock.fatal.insert(3);
    let shape = GemmShape::new(4, 4, 4, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut mock, &shape);

    let err = drivers::profile_gemm(&mut mock, &shape, &mut ops, &descs(&[-1, 3, 4]), 1);
    assert!(matches!(err, Err(ProfError::Backend(_))));
}

#[test]
fn elapsed_time_is_averaged_over_the_loop() {
    let shape = GemmShape::new(4, 4, 4, false, false, GEMM_TYPES[5]);

    for loop_count in [1u32, 4] {
        let mut mock = MockTarget::new(2.0);
        let mut ops = operands(&mut mock, &shape);
        let outcomes =
            drivers::profile_gemm(&mut mock, &shape, &mut ops, &descs(&[-1]), loop_count).unwrap();
        // 2 ms per invocation on the scripted clock, whatever the loop length.
        assert_eq!(outcomes[0].time_ms, 2.0);
    }
}

#[test]
fn all_candidates_are_accounted_for() {
    let table = AlgoTable::standard();
    let algos = AlgoSelection::All.resolve(&table).unwrap();
    let mut mock = MockTarget::new(1.0);
    let shape = GemmShape::new(4, 4, 4, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut mock, &shape);

    let outcomes = drivers::profile_gemm(&mut mock, &shape, &mut ops, &algos, 1).unwrap();

    assert_eq!(outcomes.len(), table.len());
    let ids: HashSet<i32> = outcomes.iter().map(|o| o.algo.id.0).collect();
    assert_eq!(ids.len(), table.len());
    assert!(outcomes.iter().all(|o| !o.fault));
}

#[test]
fn host_run_emits_header_and_ranked_records() {
    let mut target = HostTarget::new();
    let mut buf = Vec::new();

    drivers::run(&mut target, &base_args(), &mut buf).unwrap();

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // Header, one record per default candidate of the standard and tensor-op sweeps, and the two
    // workspace-free extended-backend variants.
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("device, op(A), op(B), m, n, k,"));
    for line in &lines[1..] {
        assert!(line.starts_with("host, N, N, 32, 32, 32, f32, f32, f32, f32, NA, "));
        assert_eq!(line.split(", ").count(), 15);
    }
    assert!(lines[1].contains("DEFAULT"));
    assert!(lines[2].contains("DEFAULT_TENSOR_OP"));
    assert!(lines[3].contains("LT_ALGO") && lines[4].contains("LT_ALGO"));
}

#[test]
fn workspace_budget_extends_the_lt_sweep() {
    let mut target = HostTarget::new();
    let mut buf = Vec::new();
    let mut args = base_args();
    args.workspace = 1;

    drivers::run(&mut target, &args, &mut buf).unwrap();

    let text = String::from_utf8(buf).unwrap();
    let lt_lines: Vec<&str> = text.lines().filter(|l| l.contains("LT_ALGO")).collect();
    // A 1 MiB budget admits the split-K variants alongside the workspace-free ones.
    assert_eq!(lt_lines.len(), 4);
    // 32x32 f32 output image staged through the workspace.
    assert!(lt_lines.iter().any(|l| l.contains("red1") && l.contains("ws4096")));
    for line in &lt_lines {
        assert_eq!(line.split(", ").count(), 15);
        assert!(!line.contains("NaN"));
    }
}

#[test]
fn split_k_candidates_fault_without_a_workspace() {
    let mut target = HostTarget::new();
    let shape = GemmShape::new(16, 16, 16, false, false, GEMM_TYPES[5]);
    let algos = target.lt_candidates(&shape, usize::MAX).unwrap();
    assert_eq!(algos.len(), 4);

    // The operands carry no workspace, so the two variants demanding one are rejected as
    // unsupported while the rest measure normally.
    let mut ops = operands(&mut target, &shape);
    let outcomes = drivers::profile_gemm(&mut target, &shape, &mut ops, &algos, 1).unwrap();

    let (faulted, measured): (Vec<&Outcome>, Vec<&Outcome>) =
        outcomes.iter().partition(|o| o.fault);
    assert_eq!(faulted.len(), 2);
    assert_eq!(measured.len(), 2);
    assert!(faulted.iter().all(|o| o.algo.tuning.unwrap().workspace_size > 0));
    assert!(measured.iter().all(|o| o.algo.tuning.unwrap().workspace_size == 0));
}

#[test]
fn integer_combination_reports_dp4a_diagnostic() {
    let mut target = HostTarget::new();
    let mut buf = Vec::new();
    let mut args = base_args();
    args.dtypes = vec![1];

    drivers::run(&mut target, &args, &mut buf).unwrap();

    let text = String::from_utf8(buf).unwrap();
    for line in text.lines().skip(1) {
        // lda and ldb are 32, so both DP4A constraints hold.
        assert!(line.starts_with("host, N, N, 32, 32, 32, i32, i8, i8, i32, all meet, "));
        assert!(!line.contains("NaN"));
    }
}

#[test]
fn complex_combination_sweeps_and_verifies() {
    let mut target = HostTarget::new();
    let mut buf = Vec::new();
    let mut args = base_args();
    args.dtypes = vec![8];

    drivers::run(&mut target, &args, &mut buf).unwrap();

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.len() > 1);
    for line in &lines[1..] {
        assert!(line.starts_with("host, N, N, 32, 32, 32, c32f, c32f, c32f, c32f, NA, "));
        assert!(!line.contains("NaN"));
    }
}

#[test]
fn zero_elapsed_reading_keeps_throughput_finite() {
    // A scripted clock that never advances stands in for a timer too coarse to see the loop.
    let mut mock = MockTarget::new(0.0);
    let shape = GemmShape::new(4, 4, 4, false, false, GEMM_TYPES[5]);
    let mut ops = operands(&mut mock, &shape);

    let outcomes = drivers::profile_gemm(&mut mock, &shape, &mut ops, &descs(&[-1]), 1).unwrap();

    let outcome = &outcomes[0];
    assert!(!outcome.fault);
    assert!(outcome.time_ms > 0.0);
    assert!(outcome.gflops.is_finite() && outcome.gflops > 0.0);
}

#[test]
fn unknown_type_id_is_a_config_error() {
    let mut target = HostTarget::new();
    let mut args = base_args();
    args.dtypes = vec![10];

    let err = drivers::run(&mut target, &args, &mut Vec::new());
    assert!(matches!(err, Err(ProfError::Config(_))));
}
