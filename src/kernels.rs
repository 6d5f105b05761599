//! Host reference GEMM.
//!
//! This is the trusted baseline every profiled candidate is checked against: a straightforward
//! column-major triple loop, independent of any backend-tuned path. Float combinations accumulate
//! in `f64` and complex combinations in `Complex<f64>` (so the reference is at least as accurate
//! as any accumulation kind a candidate uses); the 8-bit integer combination accumulates exactly
//! in `i32`.

use crate::types::{ElemKind, GemmShape};
use crate::utils;

use rayon::prelude::*;

use std::ops::AddAssign;

/// Computes the reference output `D = op(A) * op(B)` for the problem, taking the operand byte
/// images and returning the byte image of D in the output element kind.
///
/// Must run once per problem configuration, before any candidate is measured.
pub fn reference_gemm(shape: &GemmShape, a: &[u8], b: &[u8]) -> Vec<u8> {
    if shape.dtype.compute == ElemKind::I32 {
        let a = utils::decode_i32(shape.dtype.a, a);
        let b = utils::decode_i32(shape.dtype.b, b);
        utils::encode_i32(&naive_gemm(shape, &a, &b))
    } else if shape.dtype.compute.is_complex() {
        let a = utils::decode_c64(shape.dtype.a, a);
        let b = utils::decode_c64(shape.dtype.b, b);
        utils::encode_c64(shape.dtype.c, &naive_gemm(shape, &a, &b))
    } else {
        let a = utils::decode_f64(shape.dtype.a, a);
        let b = utils::decode_f64(shape.dtype.b, b);
        utils::encode_f64(shape.dtype.c, &naive_gemm(shape, &a, &b))
    }
}

/// Naive column-major GEMM over typed slices, parallelized over output columns.
///
/// Indexing honors the transpose flags and leading dimensions of `shape`; the result has leading
/// dimension `ldc`.
pub fn naive_gemm<T>(shape: &GemmShape, a: &[T], b: &[T]) -> Vec<T>
where
    T: num::Num + Copy + AddAssign + Send + Sync,
{
    let (m, k) = (shape.m, shape.k);
    let (lda, ldb, ldc) = (shape.lda, shape.ldb, shape.ldc);
    let (transa, transb) = (shape.transa, shape.transb);

    let mut d = vec![T::zero(); ldc * shape.n];
    d.par_chunks_mut(ldc).enumerate().for_each(|(j, col)| {
        for (i, out) in col.iter_mut().enumerate().take(m) {
            let mut acc = T::zero();
            for l in 0..k {
                let av = if transa { a[i * lda + l] } else { a[l * lda + i] };
                let bv = if transb { b[l * ldb + j] } else { b[j * ldb + l] };
                acc += av * bv;
            }
            *out = acc;
        }
    });
    d
}
