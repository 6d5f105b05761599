//! Element types, operand type combinations and the problem shape.
//!
//! The type-combination table mirrors the real-typed combinations the compute backend accepts for
//! mixed-precision GEMM. It is process-wide immutable configuration: the CLI selects entries by
//! index, nothing ever mutates it.

use half::f16;

use std::fmt;

/// Scalar element kinds an operand or accumulator can have. The `C*` kinds are complex, stored as
/// interleaved (re, im) component pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElemKind {
    F16,
    F32,
    F64,
    I8,
    I32,
    C8I,
    C32F,
    C64F,
}

impl ElemKind {
    /// Size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::F16 => 2,
            Self::F32 => 4,
            Self::F64 => 8,
            Self::I8 => 1,
            Self::I32 => 4,
            Self::C8I => 2,
            Self::C32F => 8,
            Self::C64F => 16,
        }
    }

    /// Whether the kind is complex-valued.
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::C8I | Self::C32F | Self::C64F)
    }

    /// Machine epsilon of the component type for floating kinds, `None` for integer kinds (which
    /// compare exactly).
    pub fn epsilon(self) -> Option<f64> {
        match self {
            Self::F16 => Some(f16::EPSILON.to_f64_const()),
            Self::F32 | Self::C32F => Some(f32::EPSILON as f64),
            Self::F64 | Self::C64F => Some(f64::EPSILON),
            Self::I8 | Self::I32 | Self::C8I => None,
        }
    }

    /// Data-type identifier of the cuBLAS backend (`cudaDataType_t`).
    #[cfg(feature = "cuda")]
    pub fn backend_id(self) -> i32 {
        match self {
            Self::F32 => 0,
            Self::F64 => 1,
            Self::F16 => 2,
            Self::I8 => 3,
            Self::C32F => 4,
            Self::C64F => 5,
            Self::C8I => 7,
            Self::I32 => 10,
        }
    }
}

impl fmt::Display for ElemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F16 => write!(f, "f16"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::I8 => write!(f, "i8"),
            Self::I32 => write!(f, "i32"),
            Self::C8I => write!(f, "c8i"),
            Self::C32F => write!(f, "c32f"),
            Self::C64F => write!(f, "c64f"),
        }
    }
}

/// One operand type combination: accumulation kind plus the A, B and output kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DtypeCombo {
    pub compute: ElemKind,
    pub a: ElemKind,
    pub b: ElemKind,
    pub c: ElemKind,
}

impl DtypeCombo {
    /// Renders the combination in report column order: ComputeType, Atype, Btype, Ctype.
    pub fn info(&self) -> String {
        format!("{}, {}, {}, {}", self.compute, self.a, self.b, self.c)
    }
}

/// Type combinations selectable from the command line, in backend enumeration order. Entry 5
/// (all-f32) is the default selection.
pub const GEMM_TYPES: [DtypeCombo; 10] = [
    DtypeCombo { compute: ElemKind::F16, a: ElemKind::F16, b: ElemKind::F16, c: ElemKind::F16 },
    DtypeCombo { compute: ElemKind::I32, a: ElemKind::I8, b: ElemKind::I8, c: ElemKind::I32 },
    DtypeCombo { compute: ElemKind::F32, a: ElemKind::F16, b: ElemKind::F16, c: ElemKind::F16 },
    DtypeCombo { compute: ElemKind::F32, a: ElemKind::I8, b: ElemKind::I8, c: ElemKind::F32 },
    DtypeCombo { compute: ElemKind::F32, a: ElemKind::F16, b: ElemKind::F16, c: ElemKind::F32 },
    DtypeCombo { compute: ElemKind::F32, a: ElemKind::F32, b: ElemKind::F32, c: ElemKind::F32 },
    DtypeCombo { compute: ElemKind::F64, a: ElemKind::F64, b: ElemKind::F64, c: ElemKind::F64 },
    DtypeCombo { compute: ElemKind::C32F, a: ElemKind::C8I, b: ElemKind::C8I, c: ElemKind::C32F },
    DtypeCombo { compute: ElemKind::C32F, a: ElemKind::C32F, b: ElemKind::C32F, c: ElemKind::C32F },
    DtypeCombo { compute: ElemKind::C64F, a: ElemKind::C64F, b: ElemKind::C64F, c: ElemKind::C64F },
];

/// The fixed GEMM problem one sweep profiles: `C (m x n) = op(A) (m x k) * op(B) (k x n)`,
/// column-major storage.
///
/// Leading dimensions are derived from the transpose flags: an operand's leading dimension equals
/// its stored (non-transposed) row count, and `ldc` is always `m`.
#[derive(Clone, Copy, Debug)]
pub struct GemmShape {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub transa: bool,
    pub transb: bool,
    pub lda: usize,
    pub ldb: usize,
    pub ldc: usize,
    pub dtype: DtypeCombo,
}

impl GemmShape {
    pub fn new(m: usize, n: usize, k: usize, transa: bool, transb: bool, dtype: DtypeCombo) -> Self {
        Self {
            m,
            n,
            k,
            transa,
            transb,
            lda: if transa { k } else { m },
            ldb: if transb { n } else { k },
            ldc: m,
            dtype,
        }
    }

    /// Stored row count of A.
    pub fn a_rows(&self) -> usize {
        if self.transa {
            self.k
        } else {
            self.m
        }
    }

    /// Stored column count of A.
    pub fn a_cols(&self) -> usize {
        if self.transa {
            self.m
        } else {
            self.k
        }
    }

    /// Stored row count of B.
    pub fn b_rows(&self) -> usize {
        if self.transb {
            self.n
        } else {
            self.k
        }
    }

    /// Stored column count of B.
    pub fn b_cols(&self) -> usize {
        if self.transb {
            self.k
        } else {
            self.n
        }
    }

    /// Renders the dimension columns of the report: op(A), op(B), m, n, k.
    pub fn dims_info(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}",
            if self.transa { 'T' } else { 'N' },
            if self.transb { 'T' } else { 'N' },
            self.m,
            self.n,
            self.k,
        )
    }

    /// Floating-point operations of one GEMM invocation.
    pub fn flops(&self) -> f64 {
        2.0 * self.m as f64 * self.n as f64 * self.k as f64
    }
}

/// Byte representation of the scalar `1` in the given kind, used as the GEMM `alpha`. Complex
/// kinds get `1 + 0i`, the imaginary component staying zero.
pub fn one_bytes(kind: ElemKind) -> Vec<u8> {
    match kind {
        ElemKind::F16 => f16::ONE.to_le_bytes().to_vec(),
        ElemKind::F32 => 1.0f32.to_le_bytes().to_vec(),
        ElemKind::F64 => 1.0f64.to_le_bytes().to_vec(),
        ElemKind::I8 => vec![1],
        ElemKind::I32 => 1i32.to_le_bytes().to_vec(),
        ElemKind::C8I => vec![1, 0],
        ElemKind::C32F => {
            let mut bytes = 1.0f32.to_le_bytes().to_vec();
            bytes.extend_from_slice(&0.0f32.to_le_bytes());
            bytes
        }
        ElemKind::C64F => {
            let mut bytes = 1.0f64.to_le_bytes().to_vec();
            bytes.extend_from_slice(&0.0f64.to_le_bytes());
            bytes
        }
    }
}

/// Byte representation of the scalar `0` in the given kind, used as the GEMM `beta`.
pub fn zero_bytes(kind: ElemKind) -> Vec<u8> {
    vec![0; kind.size()]
}
