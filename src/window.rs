//! The streaming window / line-buffer engine (spec §4.2, component C3).
//!
//! Turns a raster pixel stream into a stream of sliding `K_y x K_x`
//! windows, reading each input element exactly once. The original hardware
//! description keeps a `K_y-1`-row line buffer plus a `K_x-1`-column window
//! buffer storing pixels in reverse-chronological order (newest first), and
//! has the downstream convolution engines un-reverse that order with a
//! `(K_y-1-ky, K_x-1-kx)` index flip so that the net effect is an ordinary
//! cross-correlation against a kernel stored in the usual top-left-first
//! order. This port stores the same bounded history — the last `K_y` rows,
//! each long enough to look back `K_x` columns — but in natural spatial
//! order, so `taps[ky][kx]` is simply the pixel at row offset
//! `ky - K_y/2` and column offset `kx - K_x/2` from the window's center; the
//! index flip in the hardware is purely an artifact of its shift-register
//! bookkeeping and has no externally observable effect (see DESIGN.md).
//!
//! Padding is symmetric ("same"-style): the window is centered on every
//! input pixel, with `K_y/2` / `K_x/2` border taps on each side filled
//! according to [`BorderMode`]. This matches spec §4.2's single-sided
//! `ROWS + K_y/2` / `COLS + K_x/2` outer loop bound, whose extra rows/cols
//! flush the trailing half of the kernel past the last real pixel; the
//! leading half is supplied by pre-seeding the line buffer the same way
//! before the first real row is read.

use crate::element::{Elem, Scalar};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// How out-of-frame taps are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderMode {
    /// Reuse the nearest in-frame pixel.
    Replicate,
    /// Use the scalar zero value.
    Zero,
}

/// One `K_y x K_x` window of `LANES`-wide pixels, with the side-band flags
/// of the pixel at its center.
#[derive(Clone, Debug, PartialEq)]
pub struct Window<T: Scalar, const LANES: usize, const KY: usize, const KX: usize> {
    /// `taps[ky][kx]` is the pixel at spatial offset `(ky - KY/2, kx -
    /// KX/2)` from the output location.
    pub taps: [[[T; LANES]; KX]; KY],
    pub out_row: u32,
    pub out_col: u32,
    pub sof: bool,
    pub eof: bool,
}

/// Build-time parameters for the window engine.
#[derive(Clone, Copy, Debug)]
pub struct WindowConfig {
    pub rows: u32,
    pub cols: u32,
    pub batches: u32,
    pub stride_y: u32,
    pub stride_x: u32,
    pub border: BorderMode,
}

impl WindowConfig {
    pub fn output_rows(&self, ky: u32) -> u32 {
        let _ = ky; // same-padding: output has the same extent as the input.
        (self.rows + self.stride_y - 1) / self.stride_y
    }

    pub fn output_cols(&self, kx: u32) -> u32 {
        let _ = kx;
        (self.cols + self.stride_x - 1) / self.stride_x
    }
}

/// Runs the window engine over one batch's worth of `Elem<T, LANES>`
/// raster elements (row-major, `rows * cols` of them), invoking `emit` for
/// every output location the stride schedule selects. Reads every input
/// element exactly once, in order.
pub fn stream_windows<T, const LANES: usize, const KY: usize, const KX: usize>(
    cfg: &WindowConfig,
    input: impl IntoIterator<Item = Elem<T, LANES>>,
    mut emit: impl FnMut(Window<T, LANES, KY, KX>),
) where
    T: Scalar,
{
    assert!(KY % 2 == 1, "kernel height must be odd for symmetric padding");
    assert!(KX % 2 == 1, "kernel width must be odd for symmetric padding");
    let pad_y = (KY / 2) as u32;
    let pad_x = (KX / 2) as u32;
    let zero_row = || vec![[T::zero(); LANES]; (cfg.cols + 2 * pad_x) as usize];

    // `rows` holds the last KY padded rows (oldest at the front), each
    // already extended by `pad_x` border columns on both sides. This is the
    // line buffer / window buffer of §4.2, kept together as one ring since
    // nothing downstream is sensitive to how the two are split internally.
    let mut rows: VecDeque<Vec<[T; LANES]>> = VecDeque::with_capacity(KY);

    let mut input = input.into_iter().peekable();
    let mut last_sof = false;
    let mut last_eof = false;

    let make_padded_row = |row: &[[T; LANES]]| -> Vec<[T; LANES]> {
        let mut padded = Vec::with_capacity(cfg.cols as usize + 2 * pad_x as usize);
        if pad_x > 0 {
            trace!(pad_x, ?cfg.border, "window engine: padding row on left/right border");
        }
        let left = match cfg.border {
            BorderMode::Replicate => row[0],
            BorderMode::Zero => [T::zero(); LANES],
        };
        for _ in 0..pad_x {
            padded.push(left);
        }
        padded.extend_from_slice(row);
        let right = match cfg.border {
            BorderMode::Replicate => row[row.len() - 1],
            BorderMode::Zero => [T::zero(); LANES],
        };
        for _ in 0..pad_x {
            padded.push(right);
        }
        padded
    };

    for y in 0..(cfg.rows + pad_y) {
        let row: Vec<[T; LANES]> = if y < cfg.rows {
            let mut buf = Vec::with_capacity(cfg.cols as usize);
            for _ in 0..cfg.cols {
                let e = input.next().expect("window engine: input stream too short");
                last_sof = e.sof;
                last_eof = e.eof;
                buf.push(e.lanes);
            }
            make_padded_row(&buf)
        } else {
            warn!(y, ?cfg.border, "window engine: synthesizing a border row past the last input row");
            match cfg.border {
                BorderMode::Replicate => rows.back().cloned().unwrap_or_else(zero_row),
                BorderMode::Zero => zero_row(),
            }
        };

        if rows.is_empty() {
            // Pre-seed the leading pad rows from the very first row so
            // that the first output location already has a full window.
            for _ in 0..pad_y {
                rows.push_back(match cfg.border {
                    BorderMode::Replicate => row.clone(),
                    BorderMode::Zero => zero_row(),
                });
            }
        }
        rows.push_back(row);
        if rows.len() > KY {
            rows.pop_front();
        }

        if y < pad_y {
            continue;
        }
        let src_y = y - pad_y;
        if src_y % cfg.stride_y != 0 {
            continue;
        }
        let out_row = src_y / cfg.stride_y;

        for x in 0..(cfg.cols + pad_x) {
            if x < pad_x {
                continue;
            }
            let src_x = x - pad_x;
            if src_x % cfg.stride_x != 0 {
                continue;
            }
            let out_col = src_x / cfg.stride_x;

            let mut taps = [[[T::zero(); LANES]; KX]; KY];
            for (ky, row) in rows.iter().enumerate() {
                for kx in 0..KX {
                    taps[ky][kx] = row[x as usize + kx];
                }
            }

            let sof = last_sof && out_row == 0 && out_col == 0;
            let eof = last_eof
                && out_row == cfg.output_rows(KY as u32) - 1
                && out_col == cfg.output_cols(KX as u32) - 1;
            if sof {
                debug!(out_row, out_col, "window engine: start of frame");
            }
            if eof {
                debug!(out_row, out_col, "window engine: end of frame");
            }

            emit(Window {
                taps,
                out_row,
                out_col,
                sof,
                eof,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(rows: u32, cols: u32, f: impl Fn(u32, u32) -> u8) -> Vec<Elem<u8, 1>> {
        let mut out = Vec::new();
        let total = rows * cols;
        let mut i = 0;
        for r in 0..rows {
            for c in 0..cols {
                out.push(Elem::with_flags([f(r, c)], i == 0, i == total - 1));
                i += 1;
            }
        }
        out
    }

    #[test]
    fn identity_3x3_stride1_replicate_center_tap_matches_source() {
        let cfg = WindowConfig {
            rows: 4,
            cols: 4,
            batches: 1,
            stride_y: 1,
            stride_x: 1,
            border: BorderMode::Replicate,
        };
        let src = frame(4, 4, |r, c| (r * 4 + c) as u8);
        let mut seen = vec![vec![0u8; 4]; 4];
        stream_windows::<u8, 1, 3, 3>(&cfg, src, |w| {
            seen[w.out_row as usize][w.out_col as usize] = w.taps[1][1][0];
        });
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(seen[r][c], (r * 4 + c) as u8);
            }
        }
    }

    #[test]
    fn every_pixel_read_exactly_once_reads_total() {
        let cfg = WindowConfig {
            rows: 5,
            cols: 7,
            batches: 1,
            stride_y: 1,
            stride_x: 1,
            border: BorderMode::Zero,
        };
        let src = frame(5, 7, |r, c| (r + c) as u8);
        let mut count = 0;
        stream_windows::<u8, 1, 3, 3>(&cfg, src, |_| count += 1);
        assert_eq!(count, 5 * 7);
    }

    #[test]
    fn zero_border_produces_zero_taps_at_corner() {
        let cfg = WindowConfig {
            rows: 3,
            cols: 3,
            batches: 1,
            stride_y: 1,
            stride_x: 1,
            border: BorderMode::Zero,
        };
        let src = frame(3, 3, |_, _| 5u8);
        let mut corner = [[0u8; 3]; 3];
        stream_windows::<u8, 1, 3, 3>(&cfg, src, |w| {
            if w.out_row == 0 && w.out_col == 0 {
                for ky in 0..3 {
                    for kx in 0..3 {
                        corner[ky][kx] = w.taps[ky][kx][0];
                    }
                }
            }
        });
        assert_eq!(corner[0], [0, 0, 0]);
        assert_eq!(corner[1], [0, 5, 5]);
        assert_eq!(corner[2], [0, 5, 5]);
    }

    #[test]
    fn stride_two_halves_output_extent() {
        let cfg = WindowConfig {
            rows: 4,
            cols: 4,
            batches: 1,
            stride_y: 2,
            stride_x: 2,
            border: BorderMode::Replicate,
        };
        let src = frame(4, 4, |r, c| (r * 4 + c) as u8);
        let mut count = 0;
        stream_windows::<u8, 1, 3, 3>(&cfg, src, |_| count += 1);
        assert_eq!(count, 2 * 2);
    }
}
