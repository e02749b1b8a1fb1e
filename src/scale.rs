//! Scale-down (spec §4.3, component C9): nearest-neighbour and bilinear
//! image downscaling.
//!
//! Both variants are expressed here as a gather over a buffered input grid
//! rather than the original's single forward pass that emits each input
//! pixel once and keeps it only when it happens to match a needed output
//! coordinate — the two produce identical output values (the forward pass
//! is a resource-bounded way to compute the same `x_dst -> x_src` mapping),
//! and a gather is far easier to read and to test against directly.

use crate::element::Scalar;
use crate::fixed::{max_of, saturate};

/// Fixed-point fraction width shared by both the nearest-neighbour index
/// formula and the bilinear position/weight computation.
const FRAC: u32 = 12;

fn round_div_u64(a: u64, b: u64) -> u64 {
    (a + b / 2) / b
}

/// `scale = ROUND(dim_in/dim_out * 2^FRAC)`.
fn axis_scale(dim_in: u32, dim_out: u32) -> u64 {
    round_div_u64((dim_in as u64) << FRAC, dim_out as u64)
}

/// `x_src = ((((x_dst*2+1)*scale) >> FRAC) - 1) >> 1`.
fn nn_src_index(dst: u32, scale: u64, dim_in: u32) -> u32 {
    let v = (((dst as u64 * 2 + 1) * scale) >> FRAC) as i64 - 1;
    ((v >> 1).max(0) as u32).min(dim_in - 1)
}

/// Build-time parameters for a scale-down.
#[derive(Clone, Copy, Debug)]
pub struct ScaleConfig {
    pub rows_in: u32,
    pub cols_in: u32,
    pub rows_out: u32,
    pub cols_out: u32,
}

/// Nearest-neighbour scale-down over a fully buffered `rows_in x cols_in`
/// grid (row-major, one `[T; LANES]` per pixel).
pub fn nearest_neighbor<T: Scalar, const LANES: usize>(
    cfg: &ScaleConfig,
    input: &[[T; LANES]],
) -> Vec<[T; LANES]> {
    assert_eq!(input.len(), (cfg.rows_in * cfg.cols_in) as usize);
    let sx = axis_scale(cfg.cols_in, cfg.cols_out);
    let sy = axis_scale(cfg.rows_in, cfg.rows_out);

    let mut out = Vec::with_capacity((cfg.rows_out * cfg.cols_out) as usize);
    for yd in 0..cfg.rows_out {
        let ys = nn_src_index(yd, sy, cfg.rows_in);
        for xd in 0..cfg.cols_out {
            let xs = nn_src_index(xd, sx, cfg.cols_in);
            out.push(input[(ys * cfg.cols_in + xs) as usize]);
        }
    }
    out
}

/// Bilinear scale-down for `u8`-lane pixels, weights carried in 12-bit
/// fixed point and the final sum clamped to the lane type's maximum. The
/// last row/column of the source is replicated at the border; each axis
/// clamps independently against its *own* extent, so there is no way for
/// this implementation to read the wrong axis's bound at the corner the
/// way a literal `y_t == COLS_IN - 1` check would.
pub fn bilinear<const LANES: usize>(cfg: &ScaleConfig, input: &[[u8; LANES]]) -> Vec<[u8; LANES]> {
    assert_eq!(input.len(), (cfg.rows_in * cfg.cols_in) as usize);
    let sx = axis_scale(cfg.cols_in, cfg.cols_out);
    let sy = axis_scale(cfg.rows_in, cfg.rows_out);
    let one: u64 = 1 << FRAC;

    let sample = |y: u32, x: u32| input[(y * cfg.cols_in + x) as usize];

    let mut out = Vec::with_capacity((cfg.rows_out * cfg.cols_out) as usize);
    for yd in 0..cfg.rows_out {
        let pos_y = (yd as u64 * cfg.rows_in as u64 * one) / cfg.rows_out as u64;
        let y_l = (pos_y >> FRAC) as u32;
        let frac_y = pos_y & (one - 1);
        let y_h = (y_l + 1).min(cfg.rows_in - 1);
        let y_l = y_l.min(cfg.rows_in - 1);

        for xd in 0..cfg.cols_out {
            let pos_x = (xd as u64 * cfg.cols_in as u64 * one) / cfg.cols_out as u64;
            let x_l = (pos_x >> FRAC) as u32;
            let frac_x = pos_x & (one - 1);
            let x_h = (x_l + 1).min(cfg.cols_in - 1);
            let x_l = x_l.min(cfg.cols_in - 1);

            let w_tl = (one - frac_x) * (one - frac_y);
            let w_tr = frac_x * (one - frac_y);
            let w_bl = (one - frac_x) * frac_y;
            let w_br = frac_x * frac_y;

            let tl = sample(y_l, x_l);
            let tr = sample(y_l, x_h);
            let bl = sample(y_h, x_l);
            let br = sample(y_h, x_h);

            let mut lanes = [0u8; LANES];
            for lane in 0..LANES {
                let sum = w_tl * u64::from(tl[lane])
                    + w_tr * u64::from(tr[lane])
                    + w_bl * u64::from(bl[lane])
                    + w_br * u64::from(br[lane]);
                let rounded = (sum + (1 << (2 * FRAC - 1))) >> (2 * FRAC);
                lanes[lane] = saturate(rounded as i64, 0, max_of::<u8>() as i64) as u8;
            }
            out.push(lanes);
        }
    }
    out
}
