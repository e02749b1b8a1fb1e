//! Bit-depth converter (spec §4.6 table, component C6): per-lane up/down
//! conversion with a shift and a saturate/wrap policy.

use crate::element::{Elem, Scalar};
use crate::error::ConfigError;
use crate::fixed::{arith_shr, max_of, min_of, saturate, OverflowPolicy};

/// Which way [`DepthConfig::shift`] is applied: widening conversions
/// left-shift to make room for the extra low-order bits, narrowing
/// conversions right-shift to discard them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDir {
    Widen,
    Narrow,
}

/// Build-time parameters for one bit-depth conversion.
#[derive(Clone, Copy, Debug)]
pub struct DepthConfig {
    pub shift: u32,
    pub dir: ShiftDir,
    pub overflow: OverflowPolicy,
}

impl DepthConfig {
    pub fn new(shift: u32, dir: ShiftDir, overflow: OverflowPolicy) -> Result<Self, ConfigError> {
        if shift > 63 {
            return Err(ConfigError::ShiftOutOfRange { shift, bits: 63 });
        }
        Ok(DepthConfig {
            shift,
            dir,
            overflow,
        })
    }
}

/// Converts every lane of one element from `In` to `Out`, widening through
/// `i64` so the shift and the saturating clamp both happen at full
/// precision before the final narrowing cast.
pub fn convert_elem<In, Out, const N: usize>(cfg: &DepthConfig, e: Elem<In, N>) -> Elem<Out, N>
where
    In: Scalar,
    Out: Scalar,
{
    let mut lanes = [Out::zero(); N];
    for i in 0..N {
        let wide: i64 = num_traits::AsPrimitive::<i64>::as_(e.lanes[i]);
        let shifted = match cfg.dir {
            ShiftDir::Widen => wide << cfg.shift,
            ShiftDir::Narrow => arith_shr(wide, cfg.shift, In::SIGNED),
        };
        lanes[i] = match cfg.overflow {
            OverflowPolicy::Saturate => {
                let lo: i64 = num_traits::AsPrimitive::<i64>::as_(min_of::<Out>());
                let hi: i64 = num_traits::AsPrimitive::<i64>::as_(max_of::<Out>());
                Out::from_i64(saturate(shifted, lo, hi))
            }
            OverflowPolicy::Wrap => Out::from_i64(shifted),
        };
    }
    Elem {
        lanes,
        sof: e.sof,
        eof: e.eof,
    }
}
