//! Operand initialization and element/byte conversion helpers.
//!
//! Operand buffers are untyped byte vectors interpreted through an [`ElemKind`], the way the
//! backend itself sees them. Conversions to host-side numeric vectors go through `f64` (lossless
//! for every supported kind) except for the exact integer path, which stays in `i32`.

use crate::types::ElemKind;

use half::f16;
use num::Complex;
use rand::distributions::Uniform;
use rand::prelude::*;

/// Fills a column-major `rows x cols` matrix (leading dimension `ld`) with a reproducible test
/// pattern for the given element kind, returning its byte image.
///
/// Floating kinds draw from [0, 1) so that reductions stay well inside f16 range; integer kinds
/// draw small magnitudes so 32-bit accumulation cannot overflow for any practical `k`.
pub fn init_matrix(rows: usize, cols: usize, ld: usize, kind: ElemKind, seed: u64) -> Vec<u8> {
    assert!(ld >= rows);
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = ld * cols;
    match kind {
        ElemKind::F16 => {
            let between = Uniform::new(0.0f32, 1.0f32);
            let vals: Vec<f16> = (0..n).map(|_| f16::from_f32(between.sample(&mut rng))).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        ElemKind::F32 => {
            let between = Uniform::new(0.0f32, 1.0f32);
            let vals: Vec<f32> = (0..n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        ElemKind::F64 => {
            let between = Uniform::new(0.0f64, 1.0f64);
            let vals: Vec<f64> = (0..n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        ElemKind::I8 => {
            let between = Uniform::new_inclusive(-2i8, 2i8);
            let vals: Vec<i8> = (0..n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        ElemKind::I32 => {
            let between = Uniform::new_inclusive(-2i32, 2i32);
            let vals: Vec<i32> = (0..n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        // Complex kinds draw both components, so the image holds 2n scalars.
        ElemKind::C8I => {
            let between = Uniform::new_inclusive(-2i8, 2i8);
            let vals: Vec<i8> = (0..2 * n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        ElemKind::C32F => {
            let between = Uniform::new(0.0f32, 1.0f32);
            let vals: Vec<f32> = (0..2 * n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
        ElemKind::C64F => {
            let between = Uniform::new(0.0f64, 1.0f64);
            let vals: Vec<f64> = (0..2 * n).map(|_| between.sample(&mut rng)).collect();
            bytemuck::cast_slice(&vals).to_vec()
        }
    }
}

/// Decodes a byte image into `f64` values, lossless for every supported kind.
pub fn decode_f64(kind: ElemKind, bytes: &[u8]) -> Vec<f64> {
    match kind {
        ElemKind::F16 => bytes
            .chunks_exact(2)
            .map(|c| f16::from_le_bytes([c[0], c[1]]).to_f64())
            .collect(),
        ElemKind::F32 => bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        ElemKind::F64 => bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().expect("8-byte chunk")))
            .collect(),
        ElemKind::I8 => bytemuck::cast_slice::<u8, i8>(bytes)
            .iter()
            .map(|&v| v as f64)
            .collect(),
        ElemKind::I32 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        ElemKind::C8I | ElemKind::C32F | ElemKind::C64F => {
            unreachable!("real decode of a complex kind")
        }
    }
}

/// Encodes `f64` values into the byte image of the given kind, rounding as the kind requires.
pub fn encode_f64(kind: ElemKind, vals: &[f64]) -> Vec<u8> {
    match kind {
        ElemKind::F16 => {
            let out: Vec<f16> = vals.iter().map(|&v| f16::from_f64(v)).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        ElemKind::F32 => {
            let out: Vec<f32> = vals.iter().map(|&v| v as f32).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        ElemKind::F64 => bytemuck::cast_slice(vals).to_vec(),
        ElemKind::I8 => {
            let out: Vec<i8> = vals.iter().map(|&v| v as i8).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        ElemKind::I32 => {
            let out: Vec<i32> = vals.iter().map(|&v| v as i32).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        ElemKind::C8I | ElemKind::C32F | ElemKind::C64F => {
            unreachable!("real encode of a complex kind")
        }
    }
}

/// Decodes a complex byte image into `Complex<f64>` values, lossless for every complex kind.
pub fn decode_c64(kind: ElemKind, bytes: &[u8]) -> Vec<Complex<f64>> {
    match kind {
        ElemKind::C8I => bytemuck::cast_slice::<u8, i8>(bytes)
            .chunks_exact(2)
            .map(|c| Complex::new(c[0] as f64, c[1] as f64))
            .collect(),
        ElemKind::C32F => bytes
            .chunks_exact(8)
            .map(|c| {
                Complex::new(
                    f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64,
                    f32::from_le_bytes([c[4], c[5], c[6], c[7]]) as f64,
                )
            })
            .collect(),
        ElemKind::C64F => bytes
            .chunks_exact(16)
            .map(|c| {
                Complex::new(
                    f64::from_le_bytes(c[..8].try_into().expect("8-byte chunk")),
                    f64::from_le_bytes(c[8..].try_into().expect("8-byte chunk")),
                )
            })
            .collect(),
        _ => unreachable!("complex decode of a real kind"),
    }
}

/// Encodes `Complex<f64>` values into the byte image of the given complex kind.
pub fn encode_c64(kind: ElemKind, vals: &[Complex<f64>]) -> Vec<u8> {
    match kind {
        ElemKind::C8I => {
            let out: Vec<i8> = vals.iter().flat_map(|v| [v.re as i8, v.im as i8]).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        ElemKind::C32F => {
            let out: Vec<f32> = vals.iter().flat_map(|v| [v.re as f32, v.im as f32]).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        ElemKind::C64F => {
            let out: Vec<f64> = vals.iter().flat_map(|v| [v.re, v.im]).collect();
            bytemuck::cast_slice(&out).to_vec()
        }
        _ => unreachable!("complex encode of a real kind"),
    }
}

/// Decodes an integer byte image into `i32` values for the exact accumulation path.
pub fn decode_i32(kind: ElemKind, bytes: &[u8]) -> Vec<i32> {
    match kind {
        ElemKind::I8 => bytemuck::cast_slice::<u8, i8>(bytes)
            .iter()
            .map(|&v| v as i32)
            .collect(),
        ElemKind::I32 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        _ => unreachable!("integer decode of a floating kind"),
    }
}

/// Encodes `i32` values into the byte image of an `i32` output buffer.
pub fn encode_i32(vals: &[i32]) -> Vec<u8> {
    bytemuck::cast_slice(vals).to_vec()
}
