//! Convolution engines (spec §4.7, component C10): point-wise (full
//! cross-channel reduction) and depth-wise (per-channel only), both built
//! on the window engine of [`crate::window`].
//!
//! The original parameterises parallelism separately from the feature-map
//! totals (`P_ifm`/`P_ofm` lanes vs. `IFM`/`OFM` channels, looped over in
//! `ifm_v`/`ofm_v` groups whose partial sums accumulate into the same
//! result) purely to trade hardware resources against throughput; since
//! addition is associative, computing every input/output channel in one
//! pass (`P_ifm = IFM`, `P_ofm = OFM`) is bit-for-bit the same sum. This
//! port takes that fully-parallel instantiation directly, with `IFM`/`OFM`
//! as the window/output lane counts.

use crate::element::{Elem, Scalar};
use crate::fixed::{max_of, min_of, saturate, OverflowPolicy, RoundPolicy};
use crate::window::{stream_windows, BorderMode, WindowConfig};

/// Build-time parameters shared by both convolution flavours.
#[derive(Clone, Copy, Debug)]
pub struct ConvConfig {
    pub rows: u32,
    pub cols: u32,
    pub batches: u32,
    pub stride_y: u32,
    pub stride_x: u32,
    /// Fractional-point position of the fixed-point coefficients/bias.
    pub fp: u32,
    pub round: RoundPolicy,
    pub overflow: OverflowPolicy,
    pub border: BorderMode,
}

impl ConvConfig {
    fn window_config(&self) -> WindowConfig {
        WindowConfig {
            rows: self.rows,
            cols: self.cols,
            batches: self.batches,
            stride_y: self.stride_y,
            stride_x: self.stride_x,
            border: self.border,
        }
    }

    fn round_shift(&self, sum: i64) -> i64 {
        match self.round {
            RoundPolicy::ToZero => sum >> self.fp,
            RoundPolicy::NearestEven => (sum + (1i64 << (self.fp.max(1) - 1))) >> self.fp,
        }
    }

    fn narrow<T: Scalar>(&self, v: i64) -> T {
        match self.overflow {
            OverflowPolicy::Saturate => {
                let lo: i64 = num_traits::AsPrimitive::<i64>::as_(min_of::<T>());
                let hi: i64 = num_traits::AsPrimitive::<i64>::as_(max_of::<T>());
                T::from_i64(saturate(v, lo, hi))
            }
            OverflowPolicy::Wrap => T::from_i64(v),
        }
    }
}

/// `K[ofm][ifm][ky][kx]` coefficient cube, in the fixed-point domain
/// (already scaled by `2^fp`).
pub type PointwiseKernel<const IFM: usize, const OFM: usize, const KY: usize, const KX: usize> =
    [[[[i64; KX]; KY]; IFM]; OFM];

/// Point-wise (full cross-channel) convolution: `conv3d[p] = sum over
/// ifm,ky,kx of window[ky][kx][ifm] * kernel[p][ifm][ky][kx]`, rounded by
/// `fp` fractional bits and biased after rounding (spec §4.7).
pub fn point_wise<T, const IFM: usize, const OFM: usize, const KY: usize, const KX: usize>(
    cfg: &ConvConfig,
    kernel: &PointwiseKernel<IFM, OFM, KY, KX>,
    bias: &[i64; OFM],
    input: impl IntoIterator<Item = Elem<T, IFM>>,
) -> Vec<Elem<T, OFM>>
where
    T: Scalar,
{
    let mut out = Vec::new();
    stream_windows::<T, IFM, KY, KX>(&cfg.window_config(), input, |w| {
        let mut lanes = [T::zero(); OFM];
        for p in 0..OFM {
            let mut sum: i64 = 0;
            for ifm in 0..IFM {
                for ky in 0..KY {
                    for kx in 0..KX {
                        let tap: i64 = num_traits::AsPrimitive::<i64>::as_(w.taps[ky][kx][ifm]);
                        sum += tap * kernel[p][ifm][ky][kx];
                    }
                }
            }
            let rounded = cfg.round_shift(sum) + bias[p];
            lanes[p] = cfg.narrow(rounded);
        }
        out.push(Elem::with_flags(lanes, w.sof, w.eof));
    });
    out
}

/// `K[fm][ky][kx]` coefficient plane per channel, fixed-point scaled.
pub type DepthwiseKernel<const FM: usize, const KY: usize, const KX: usize> =
    [[[i64; KX]; KY]; FM];

/// Depth-wise convolution: each output lane depends only on its own
/// channel's `K_y x K_x` kernel, no cross-channel reduction.
pub fn depth_wise<T, const FM: usize, const KY: usize, const KX: usize>(
    cfg: &ConvConfig,
    kernel: &DepthwiseKernel<FM, KY, KX>,
    bias: &[i64; FM],
    input: impl IntoIterator<Item = Elem<T, FM>>,
) -> Vec<Elem<T, FM>>
where
    T: Scalar,
{
    let mut out = Vec::new();
    stream_windows::<T, FM, KY, KX>(&cfg.window_config(), input, |w| {
        let mut lanes = [T::zero(); FM];
        for p in 0..FM {
            let mut sum: i64 = 0;
            for ky in 0..KY {
                for kx in 0..KX {
                    let tap: i64 = num_traits::AsPrimitive::<i64>::as_(w.taps[ky][kx][p]);
                    sum += tap * kernel[p][ky][kx];
                }
            }
            let rounded = cfg.round_shift(sum) + bias[p];
            lanes[p] = cfg.narrow(rounded);
        }
        out.push(Elem::with_flags(lanes, w.sof, w.eof));
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame<const N: usize>(rows: u32, cols: u32, f: impl Fn(u32, u32) -> [u8; N]) -> Vec<Elem<u8, N>> {
        let total = rows * cols;
        let mut out = Vec::new();
        let mut i = 0;
        for r in 0..rows {
            for c in 0..cols {
                out.push(Elem::with_flags(f(r, c), i == 0, i == total - 1));
                i += 1;
            }
        }
        out
    }

    #[test]
    fn identity_1x1_kernel_passes_through() {
        let cfg = ConvConfig {
            rows: 3,
            cols: 3,
            batches: 1,
            stride_y: 1,
            stride_x: 1,
            fp: 8,
            round: RoundPolicy::ToZero,
            overflow: OverflowPolicy::Saturate,
            border: BorderMode::Replicate,
        };
        let one = 1i64 << cfg.fp;
        let kernel: PointwiseKernel<1, 1, 1, 1> = [[[[one]]]];
        let bias = [0i64];
        let input = frame::<1>(3, 3, |r, c| [(r * 3 + c) as u8]);
        let out = point_wise::<u8, 1, 1, 1, 1>(&cfg, &kernel, &bias, input.clone());
        let got: Vec<u8> = out.iter().map(|e| e.lanes[0]).collect();
        let expect: Vec<u8> = input.iter().map(|e| e.lanes[0]).collect();
        assert_eq!(got, expect);
    }

    #[test]
    fn depthwise_box_blur_averages_constant_image() {
        let cfg = ConvConfig {
            rows: 4,
            cols: 4,
            batches: 1,
            stride_y: 1,
            stride_x: 1,
            fp: 8,
            round: RoundPolicy::NearestEven,
            overflow: OverflowPolicy::Saturate,
            border: BorderMode::Replicate,
        };
        let w = (1i64 << cfg.fp) / 9;
        let kernel: DepthwiseKernel<1, 3, 3> = [[[w; 3]; 3]];
        let bias = [0i64];
        let input = frame::<1>(4, 4, |_, _| [50u8]);
        let out = depth_wise::<u8, 1, 3, 3>(&cfg, &kernel, &bias, input);
        for e in out {
            assert!((e.lanes[0] as i32 - 50).abs() <= 1);
        }
    }

    #[test]
    fn stride_two_halves_output_extent() {
        let cfg = ConvConfig {
            rows: 4,
            cols: 4,
            batches: 1,
            stride_y: 2,
            stride_x: 2,
            fp: 8,
            round: RoundPolicy::ToZero,
            overflow: OverflowPolicy::Saturate,
            border: BorderMode::Replicate,
        };
        let one = 1i64 << cfg.fp;
        let kernel: PointwiseKernel<1, 1, 1, 1> = [[[[one]]]];
        let bias = [0i64];
        let input = frame::<1>(4, 4, |r, c| [(r * 4 + c) as u8]);
        let out = point_wise::<u8, 1, 1, 1, 1>(&cfg, &kernel, &bias, input);
        assert_eq!(out.len(), 4);
    }
}
