//! Result verification and failure dumps.
//!
//! A candidate's output C is compared element-wise against the reference D. Integer output kinds
//! must match exactly; floating kinds are compared under a tolerance proportional to the output
//! kind's machine epsilon, so narrower outputs get proportionally wider tolerances.

use crate::consts;
use crate::types::ElemKind;
use crate::utils;

/// Returns whether C matches D under the tolerance policy of the output element kind.
///
/// Complex kinds compare by the modulus of the difference against the modulus of the reference
/// value, under the component type's tolerance.
pub fn verify(kind: ElemKind, c: &[u8], d: &[u8]) -> bool {
    let eps = match kind.epsilon() {
        None => return c == d,
        Some(eps) => eps,
    };
    let tol = consts::VERIFY_TOL_SCALE * eps;
    if kind.is_complex() {
        let c = utils::decode_c64(kind, c);
        let d = utils::decode_c64(kind, d);
        c.len() == d.len()
            && c.iter()
                .zip(d.iter())
                .all(|(&cv, &dv)| (cv - dv).norm() <= tol * f64::max(1.0, dv.norm()))
    } else {
        let c = utils::decode_f64(kind, c);
        let d = utils::decode_f64(kind, d);
        c.len() == d.len()
            && c.iter()
                .zip(d.iter())
                .all(|(&cv, &dv)| (cv - dv).abs() <= tol * f64::max(1.0, dv.abs()))
    }
}

/// Dumps a column-major matrix to stderr for mismatch diagnostics.
pub fn print_matrix(label: &str, kind: ElemKind, bytes: &[u8], rows: usize, cols: usize, ld: usize) {
    eprintln!("{label} ({rows}x{cols}, ld {ld}, {kind}):");
    if kind.is_complex() {
        let vals = utils::decode_c64(kind, bytes);
        for i in 0..rows {
            let mut line = String::new();
            for j in 0..cols {
                let v = vals[j * ld + i];
                line.push_str(&format!("{:>9.3}{:+.3}i ", v.re, v.im));
            }
            eprintln!("{line}");
        }
    } else {
        let vals = utils::decode_f64(kind, bytes);
        for i in 0..rows {
            let mut line = String::new();
            for j in 0..cols {
                line.push_str(&format!("{:>12.4} ", vals[j * ld + i]));
            }
            eprintln!("{line}");
        }
    }
}
