//! Fully connected (spec §4.10, component C15): a vector-by-matrix
//! product, accumulated in fixed point with `P`-wide lanes, with optional
//! on-chip weight/bias buffering from the first batch onward.

use crate::element::Scalar;
use crate::fixed::{max_of, min_of, saturate, OverflowPolicy, RoundPolicy};

#[derive(Clone, Copy, Debug)]
pub struct FcConfig {
    /// Fractional-point position of the fixed-point weights/bias.
    pub fp: u32,
    pub round: RoundPolicy,
    pub overflow: OverflowPolicy,
    /// When set, the weight/bias tables passed on the first call are kept
    /// and every later call ignores whatever tables it is given, the way
    /// the original's on-chip RAM fill runs once and then serves every
    /// subsequent batch from that table.
    pub buffer_coeffs: bool,
}

fn round_shift(v: i64, fp: u32, round: RoundPolicy) -> i64 {
    match round {
        RoundPolicy::ToZero => v >> fp,
        RoundPolicy::NearestEven => (v + (1i64 << fp.max(1) - 1)) >> fp,
    }
}

/// `W[ofm][ifm]` weight matrix, fixed-point scaled by `2^fp`.
pub type WeightMatrix<const IFM: usize, const OFM: usize> = [[i64; IFM]; OFM];

/// Holds the build-time config plus whatever weight/bias table the
/// coefficient-buffering flag has latched, if any.
pub struct FullyConnected<const IFM: usize, const OFM: usize> {
    cfg: FcConfig,
    cached: Option<(WeightMatrix<IFM, OFM>, [i64; OFM])>,
}

impl<const IFM: usize, const OFM: usize> FullyConnected<IFM, OFM> {
    pub fn new(cfg: FcConfig) -> Self {
        FullyConnected { cfg, cached: None }
    }

    /// Runs one batch's vector-by-matrix product. `weights`/`bias` are
    /// read fresh every call unless `buffer_coeffs` is set, in which case
    /// only the first call's tables are ever used.
    pub fn run<T: Scalar>(
        &mut self,
        weights: &WeightMatrix<IFM, OFM>,
        bias: &[i64; OFM],
        input: &[T; IFM],
    ) -> [T; OFM] {
        let (w, b): (&WeightMatrix<IFM, OFM>, &[i64; OFM]) = if self.cfg.buffer_coeffs {
            if self.cached.is_none() {
                self.cached = Some((*weights, *bias));
            }
            let cached = self.cached.as_ref().unwrap();
            (&cached.0, &cached.1)
        } else {
            (weights, bias)
        };

        let mut out = [T::zero(); OFM];
        for p in 0..OFM {
            let mut sum: i64 = 0;
            for ifm in 0..IFM {
                let tap: i64 = num_traits::AsPrimitive::<i64>::as_(input[ifm]);
                sum += tap * w[p][ifm];
            }
            let rounded = round_shift(sum, self.cfg.fp, self.cfg.round) + b[p];
            out[p] = match self.cfg.overflow {
                OverflowPolicy::Saturate => {
                    let lo: i64 = num_traits::AsPrimitive::<i64>::as_(min_of::<T>());
                    let hi: i64 = num_traits::AsPrimitive::<i64>::as_(max_of::<T>());
                    T::from_i64(saturate(rounded, lo, hi))
                }
                OverflowPolicy::Wrap => T::from_i64(rounded),
            };
        }
        out
    }
}
