//! Softmax (spec §4.10, component C14): two passes over one `IFM`-wide
//! batch — accumulate `e^x_i · 2^FP` as `i32`, then divide each term by the
//! batch sum and return the quotient in `2^FP` fixed point.

use crate::element::Scalar;
use num_traits::AsPrimitive;

/// Softmax over one batch of `IFM` values, fixed-point position `fp`.
///
/// The exp buffer (spec §5's "softmax's one-IFM exp buffer") is exactly
/// `exp_q`: the whole batch's exponentials must be known before any
/// quotient can be emitted, so both passes run over the same `IFM`-sized
/// array rather than streaming.
pub fn softmax<T: Scalar, const IFM: usize>(fp: u32, batch: &[T; IFM]) -> [T; IFM] {
    let scale = (1u64 << fp) as f32;
    let mut exp_q = [0i64; IFM];
    let mut sum: i64 = 0;
    for i in 0..IFM {
        let x: f32 = AsPrimitive::as_(batch[i]);
        let q = (x.exp() * scale).round() as i64;
        exp_q[i] = q;
        sum += q;
    }

    let mut out = [T::zero(); IFM];
    for i in 0..IFM {
        let numerator = exp_q[i] * (1i64 << fp);
        out[i] = T::from_i64(numerator / sum);
    }
    out
}
