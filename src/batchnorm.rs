//! Batch normalisation (spec §4.9, component C12): a pre-parameterised
//! affine flavour and an on-line flavour that derives mean/variance from
//! the batch itself.

use crate::element::Scalar;
use crate::fixed::{max_of, min_of, saturate, RoundPolicy};
use num_traits::AsPrimitive;

/// Per-feature parameters for flavour A.
#[derive(Clone, Copy, Debug)]
pub struct AffineParams<T> {
    pub fill: T,
    pub mean: T,
    pub inv_sqrt_var: T,
    pub bias: T,
}

fn round_shift(v: i64, fp: u32, round: RoundPolicy) -> i64 {
    match round {
        RoundPolicy::ToZero => v >> fp,
        RoundPolicy::NearestEven => (v + (1i64 << (fp.max(1) - 1))) >> fp,
    }
}

/// Flavour A: `fill * ((x - mean) * inv_sqrt_var) + bias`, `fill` and
/// `inv_sqrt_var` are `fp`-bit fixed-point scale factors, with a rounding
/// step after each of the two multiplies.
pub fn flavor_a<T: Scalar>(params: &AffineParams<T>, x: T, fp: u32, round: RoundPolicy) -> T {
    let wide = |v: T| -> i64 { AsPrimitive::<i64>::as_(v) };
    let diff = wide(x) - wide(params.mean);
    let step1 = round_shift(diff * wide(params.inv_sqrt_var), fp, round);
    let step2 = round_shift(step1 * wide(params.fill), fp, round);
    let result = step2 + wide(params.bias);
    let lo: i64 = AsPrimitive::<i64>::as_(min_of::<T>());
    let hi: i64 = AsPrimitive::<i64>::as_(max_of::<T>());
    T::from_i64(saturate(result, lo, hi))
}

/// Flavour B: three logical passes over one batch of `IFM` feature
/// values — sum for the mean, then sum of squared residuals for the
/// variance, then the normalise-and-scale pass. The original pipelines
/// these three passes across three successive batches so steady-state
/// throughput is one element per cycle; that pipelining is purely an
/// internal scheduling decision with no effect on the sequence of
/// per-batch results a single-threaded caller observes, so this port runs
/// the three passes for one batch straight through.
pub fn flavor_b<T: Scalar, const IFM: usize>(gamma: T, beta: T, batch: &[T; IFM]) -> [T; IFM] {
    const EPS: f32 = 1e-6;

    let values: [f32; IFM] = {
        let mut v = [0f32; IFM];
        for i in 0..IFM {
            v[i] = AsPrimitive::<f32>::as_(batch[i]);
        }
        v
    };

    let mean = values.iter().sum::<f32>() / IFM as f32;
    let variance = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / IFM as f32;
    let inv_std = 1.0 / (variance + EPS).sqrt();

    let g: f32 = AsPrimitive::as_(gamma);
    let b: f32 = AsPrimitive::as_(beta);

    let mut out = [T::zero(); IFM];
    for i in 0..IFM {
        let y = g * (values[i] - mean) * inv_std + b;
        out[i] = T::from_i64(y.round() as i64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavor_a_identity_when_fill_is_one_and_mean_zero() {
        let fp = 8;
        let one = 1i64 << fp;
        let params = AffineParams {
            fill: one as i32,
            mean: 0,
            inv_sqrt_var: one as i32,
            bias: 0,
        };
        let out = flavor_a(&params, 42i32, fp, RoundPolicy::ToZero);
        assert_eq!(out, 42);
    }

    #[test]
    fn flavor_b_normalizes_a_symmetric_batch_to_zero_mean() {
        let batch: [i32; 4] = [10, 20, 30, 40];
        let out = flavor_b(1i32, 0i32, &batch);
        let sum: i32 = out.iter().sum();
        assert!(sum.abs() <= 1, "sum={sum}");
    }

    #[test]
    fn flavor_b_constant_batch_has_zero_variance_result_near_beta() {
        let batch: [i32; 4] = [7, 7, 7, 7];
        let out = flavor_b(2i32, 5i32, &batch);
        for v in out {
            assert!((v - 5).abs() <= 1);
        }
    }
}
