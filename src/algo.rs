//! Algorithm identifiers, candidate tables and applicability diagnostics.
//!
//! Raw backend identifiers are written down exactly once, in the explicit candidate tables below.
//! Candidate requests are resolved by table lookup, never by arithmetic on the backend's
//! enumeration, so a backend revision that renumbers its algorithms is a table edit here.

use crate::consts;
use crate::error::ProfError;
use crate::types::{ElemKind, GemmShape};

use std::fmt;

/// Raw algorithm identifier of the compute backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AlgoId(pub i32);

/// The backend's default algorithm choice.
pub const GEMM_DEFAULT: AlgoId = AlgoId(-1);

/// The backend's default tensor-op algorithm choice.
pub const GEMM_DEFAULT_TENSOR_OP: AlgoId = AlgoId(99);

impl fmt::Display for AlgoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            -1 => write!(f, "DEFAULT"),
            id @ 0..=23 => write!(f, "ALGO{id}"),
            99 => write!(f, "DEFAULT_TENSOR_OP"),
            id @ 100..=115 => write!(f, "ALGO{}_TENSOR_OP", id - 100),
            id => write!(f, "ALGO_RAW{id}"),
        }
    }
}

/// Tuning attributes an extended backend attaches to an algorithm choice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LtTuning {
    pub tile_id: i32,
    pub reduction_scheme: i32,
    pub swizzle: i32,
    pub custom_option: i32,
    pub workspace_size: usize,
    pub wave_count: f32,
}

/// One candidate: an identifier plus, for extended backends, its tuning attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlgoDesc {
    pub id: AlgoId,
    pub tuning: Option<LtTuning>,
}

impl AlgoDesc {
    /// A candidate carrying no tuning attributes.
    pub const fn plain(id: AlgoId) -> Self {
        Self { id, tuning: None }
    }
}

impl fmt::Display for AlgoDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tuning {
            None => write!(f, "{}", self.id),
            // Extended-backend identifiers are a separate numbering, so the raw value is printed
            // directly instead of through the standard-enumeration names.
            Some(t) => write!(
                f,
                "LT_ALGO{} tile{} red{} swz{} opt{} ws{} waves{:.1}",
                self.id.0, t.tile_id, t.reduction_scheme, t.swizzle, t.custom_option, t.workspace_size, t.wave_count,
            ),
        }
    }
}

/// Ordered candidate enumeration of one backend path: the default choice plus the numbered
/// algorithms addressable from the command line.
pub struct AlgoTable {
    pub default: AlgoId,
    pub numbered: Vec<AlgoId>,
}

impl AlgoTable {
    /// The standard GEMM enumeration: DEFAULT plus ALGO0..=ALGO23.
    pub fn standard() -> Self {
        Self {
            default: GEMM_DEFAULT,
            numbered: (0..=23).map(AlgoId).collect(),
        }
    }

    /// The tensor-op enumeration: DEFAULT_TENSOR_OP plus ALGO0..=ALGO15_TENSOR_OP.
    pub fn tensor_op() -> Self {
        Self {
            default: GEMM_DEFAULT_TENSOR_OP,
            numbered: (100..=115).map(AlgoId).collect(),
        }
    }

    /// Number of entries a full sweep of this table produces.
    pub fn len(&self) -> usize {
        1 + self.numbered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Candidate request from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlgoSelection {
    /// Nothing requested: profile just the backend default.
    Default,
    /// Profile the whole enumeration.
    All,
    /// Profile the numbered algorithms at the given table offsets.
    Offsets(Vec<usize>),
}

impl AlgoSelection {
    pub fn from_args(all_algo: bool, offsets: Option<&[usize]>) -> Self {
        if all_algo {
            Self::All
        } else {
            match offsets {
                Some(ids) => Self::Offsets(ids.to_vec()),
                None => Self::Default,
            }
        }
    }

    /// Resolves the request against a candidate table into a concrete ordered candidate sequence.
    pub fn resolve(&self, table: &AlgoTable) -> Result<Vec<AlgoDesc>, ProfError> {
        match self {
            Self::Default => Ok(vec![AlgoDesc::plain(table.default)]),
            Self::All => Ok(std::iter::once(table.default)
                .chain(table.numbered.iter().copied())
                .map(AlgoDesc::plain)
                .collect()),
            Self::Offsets(ids) => ids
                .iter()
                .map(|&id| {
                    table.numbered.get(id).copied().map(AlgoDesc::plain).ok_or_else(|| {
                        ProfError::Config(format!(
                            "algorithm ID {id} out of range (0..={})",
                            table.numbered.len() - 1
                        ))
                    })
                })
                .collect(),
        }
    }
}

/// Renders an applicability mask: `all meet` when every constraint holds, else each constraint's
/// 0/1 value in declared order.
pub fn mask_to_str(mask: &[bool]) -> String {
    if mask.iter().all(|&bit| bit) {
        consts::ALL_MEET.to_string()
    } else {
        let mut info = String::from("(");
        for &bit in mask {
            info.push(if bit { '1' } else { '0' });
            info.push('.');
        }
        info.push(')');
        info
    }
}

/// DP4A applicability: both input leading dimensions aligned to the 4-element granularity.
pub fn dp4a_restrictions(shape: &GemmShape) -> String {
    let mask = [
        shape.lda % consts::DP4A_LD_ALIGN == 0,
        shape.ldb % consts::DP4A_LD_ALIGN == 0,
    ];
    mask_to_str(&mask)
}

/// Tensor-op applicability: dimension granularities, operand address alignment and leading
/// dimension alignment, in the backend's documented order (m, k, A, B, C, lda, ldb, ldc).
///
/// Purely informational; it never gates execution.
pub fn tensor_op_restrictions(shape: &GemmShape, a_addr: usize, b_addr: usize, c_addr: usize) -> String {
    let ld_align = |ld: usize, kind: ElemKind| ld % (consts::TENSOR_LD_ALIGN_BYTES / kind.size()) == 0;
    let mask = [
        shape.m % consts::TENSOR_DIM_M_GRANULARITY == 0,
        shape.k % consts::TENSOR_DIM_K_GRANULARITY == 0,
        a_addr % consts::TENSOR_PTR_ALIGN == 0,
        b_addr % consts::TENSOR_PTR_ALIGN == 0,
        c_addr % consts::TENSOR_PTR_ALIGN == 0,
        ld_align(shape.lda, shape.dtype.a),
        ld_align(shape.ldb, shape.dtype.b),
        ld_align(shape.ldc, shape.dtype.c),
    ];
    mask_to_str(&mask)
}
