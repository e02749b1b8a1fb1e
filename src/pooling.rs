//! Pooling (spec §4.8, component C11): max or average reduction over a
//! `K_y x K_x` window, with its own padding (independent of, and generally
//! smaller than, the window engine's fixed `K/2`) and its own per-op
//! border fill.
//!
//! Reads the whole `rows_in x cols_in` grid up front rather than streaming
//! through a bounded line buffer — for the same reason as
//! [`crate::scale`]: the output values are identical either way, and a
//! direct gather is far simpler to get right than re-deriving the window
//! engine's register bookkeeping for a second, differently-padded client.

use crate::element::{Elem, Scalar};
use crate::fixed::{max_of, min_of};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolOp {
    Max,
    Average,
}

#[derive(Clone, Copy, Debug)]
pub struct PoolConfig {
    pub rows_in: u32,
    pub cols_in: u32,
    pub pad_y: u32,
    pub pad_x: u32,
    pub stride_y: u32,
    pub stride_x: u32,
    /// Fractional-point position used by the integer average's
    /// `(sum * (2^fp/(Ky*Kx))) >> fp` reduction.
    pub fp: u32,
    pub op: PoolOp,
}

impl PoolConfig {
    pub fn rows_out(&self, ky: u32) -> u32 {
        (self.rows_in + 2 * self.pad_y - ky) / self.stride_y + 1
    }
    pub fn cols_out(&self, kx: u32) -> u32 {
        (self.cols_in + 2 * self.pad_x - kx) / self.stride_x + 1
    }
}

/// Runs pooling over one batch's `rows_in * cols_in` raster elements.
pub fn pool<T, const FM: usize, const KY: usize, const KX: usize>(
    cfg: &PoolConfig,
    input: impl IntoIterator<Item = Elem<T, FM>>,
) -> Vec<Elem<T, FM>>
where
    T: Scalar,
{
    let grid: Vec<Elem<T, FM>> = input.into_iter().collect();
    assert_eq!(grid.len(), (cfg.rows_in * cfg.cols_in) as usize);

    let border_fill = |lane: usize| -> T {
        let _ = lane;
        match cfg.op {
            PoolOp::Average => T::zero(),
            PoolOp::Max => min_of::<T>(),
        }
    };

    let rows_out = cfg.rows_out(KY as u32);
    let cols_out = cfg.cols_out(KX as u32);
    let mut out = Vec::with_capacity((rows_out * cols_out) as usize);
    let total_out = rows_out * cols_out;
    let mut idx = 0u32;

    for oy in 0..rows_out {
        let y0 = oy * cfg.stride_y;
        for ox in 0..cols_out {
            let x0 = ox * cfg.stride_x;
            let is_float = T::KIND == crate::element::ScalarKind::F32;
            let mut lanes = [T::zero(); FM];
            for lane in 0..FM {
                let mut acc_sum: i64 = 0;
                let mut acc_sum_f: f32 = 0.0;
                let mut acc_max: T = min_of::<T>();
                for ky in 0..KY as u32 {
                    let y = y0 as i64 + ky as i64 - cfg.pad_y as i64;
                    for kx in 0..KX as u32 {
                        let x = x0 as i64 + kx as i64 - cfg.pad_x as i64;
                        let v = if y >= 0 && y < cfg.rows_in as i64 && x >= 0 && x < cfg.cols_in as i64 {
                            grid[(y as u32 * cfg.cols_in + x as u32) as usize].lanes[lane]
                        } else {
                            border_fill(lane)
                        };
                        match cfg.op {
                            PoolOp::Average if is_float => {
                                acc_sum_f += num_traits::AsPrimitive::<f32>::as_(v);
                            }
                            PoolOp::Average => {
                                acc_sum += num_traits::AsPrimitive::<i64>::as_(v);
                            }
                            PoolOp::Max => {
                                if num_traits::AsPrimitive::<i64>::as_(v)
                                    > num_traits::AsPrimitive::<i64>::as_(acc_max)
                                {
                                    acc_max = v;
                                }
                            }
                        }
                    }
                }
                lanes[lane] = match cfg.op {
                    PoolOp::Max => acc_max,
                    PoolOp::Average if is_float => {
                        num_traits::NumCast::from(acc_sum_f / (KY * KX) as f32)
                            .unwrap_or_else(T::zero)
                    }
                    PoolOp::Average => {
                        let count = (KY * KX) as i64;
                        let mult = (1i64 << cfg.fp) / count;
                        T::from_i64((acc_sum * mult) >> cfg.fp)
                    }
                };
            }
            out.push(Elem::with_flags(
                lanes,
                idx == 0,
                idx == total_out - 1,
            ));
            idx += 1;
        }
    }
    out
}
