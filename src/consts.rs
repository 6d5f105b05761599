//! Crate-level constants.

/// Leading dimensions must be multiples of this for the DP4A path to apply.
pub const DP4A_LD_ALIGN: usize = 4;

/// Granularity required of the `m` dimension by the tensor-op path.
pub const TENSOR_DIM_M_GRANULARITY: usize = 4;

/// Granularity required of the `k` dimension by the tensor-op path.
pub const TENSOR_DIM_K_GRANULARITY: usize = 8;

/// Operand base addresses must be aligned to this many bytes for the tensor-op path.
pub const TENSOR_PTR_ALIGN: usize = 16;

/// Leading dimensions must be multiples of this many bytes for the tensor-op path.
pub const TENSOR_LD_ALIGN_BYTES: usize = 16;

/// Verification tolerance for floating-point outputs, as a multiple of the output type's machine
/// epsilon.
pub const VERIFY_TOL_SCALE: f64 = 64.0;

/// Elapsed time reported for faulted candidates, so they sort after every measured one.
pub const TIME_SENTINEL_MS: f32 = f32::MAX;

/// Restriction diagnostic rendering when every constraint is satisfied.
pub const ALL_MEET: &str = "all meet";
