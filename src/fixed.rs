//! Fixed-point arithmetic primitives (spec §4.1, component C1).
//!
//! Ported term-for-term from `vx_helper.h`'s `SaturateMaxMin`,
//! `ShiftArithmeticRight`, `atan2Cordic`, `SqrtLester` and
//! `ComputeNormalization`: these are total functions, so (per spec §4.1)
//! there is no error path here — callers supply shifts and sizes already
//! validated by the owning kernel's `ConfigError`-returning constructor.

use crate::element::Scalar;

/// The largest representable value of `T` (spec: `max_of<T>()`).
pub fn max_of<T: Scalar>() -> T {
    T::max_value()
}

/// The smallest representable value of `T` (spec: `min_of<T>()`).
pub fn min_of<T: Scalar>() -> T {
    T::min_value()
}

/// Clamps `v` into `[lo, hi]`.
pub fn saturate<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v > hi {
        hi
    } else if v < lo {
        lo
    } else {
        v
    }
}

/// An arithmetic right shift that matches division semantics for signed
/// values: one is added back after the shift when the shifted signed value
/// landed negative (`vx_helper.h::ShiftArithmeticRight`).
pub fn arith_shr(data: i64, shift: u32, signed: bool) -> i64 {
    let a = data >> shift;
    if signed && a < 0 {
        a + 1
    } else {
        a
    }
}

/// Rounding policy shared by every fixed-point re-narrowing step (spec §4.4,
/// §4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPolicy {
    ToZero,
    NearestEven,
}

/// Saturation policy shared by arithmetic and re-narrowing operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    Saturate,
    Wrap,
}

/// Bit-by-bit integer square root (`vx_helper.h::SqrtLester`).
///
/// Each of the `output_bits` stages tentatively sets bit `n`, keeping it
/// only if `(partial + B)^2 = partial^2 + 2^n·partial + 2^(2n) <= value`.
/// `round_nearest` rounds the truncated result up by one when the residual
/// exceeds half a step and the result does not already sit at the type's
/// maximum (the `CHECK_MAX` guard in the original, needed so rounding never
/// pushes the result past what `output_bits` can represent).
pub fn isqrt(value: u128, output_bits: u32, round_nearest: bool) -> u128 {
    debug_assert!(output_bits > 0 && output_bits <= 64);
    let max_val: u128 = (1u128 << output_bits) - 1;

    let mut a1: u128 = 0;
    let mut a2: u128 = 0;

    for n in (0..output_bits).rev() {
        let b1 = 1u128 << n;
        let b2 = b1 << n;
        let ab = a1 << n;
        let a2_next = a2 + b2 + (ab << 1);
        if a2_next <= value {
            a1 |= b1;
            a2 = a2_next;
        }
    }

    if round_nearest && a1 != max_val && (value - a2) > a1 {
        a1 += 1;
    }

    a1
}

/// Number of CORDIC rotation steps used by [`atan2_cordic`]; this is the
/// full table depth from `vx_helper.h` and gives maximal angular accuracy.
pub const CORDIC_MAX_STEPS: u16 = 15;

const ATAN_TAB: [i64; 16] = [
    16384, 9672, 5110, 2594, 1302, 652, 326, 163, 81, 41, 20, 10, 5, 3, 1, 1,
];

/// Signed integer CORDIC `atan2` (`vx_helper.h::atan2Cordic`).
///
/// This is the raw rotation primitive: its output lands in an internal
/// reference frame that is rotated and scaled relative to the `2^16`
/// full-turn, 0-points-east convention the spec describes for the
/// pixel-wise `phase` operator. [`crate::pixelwise`]'s `phase` applies the
/// same renormalisation the original `Phase()` wrapper does (reduce
/// precision and round, fold negative angles into `[0, turn)`, rotate the
/// origin to east, wrap `360°` back to `0`) before quantising — do not read
/// this function's return value as an angle directly.
pub fn atan2_cordic(x0: i64, y0: i64, steps: u16) -> i64 {
    let steps = steps.min(CORDIC_MAX_STEPS) as usize;

    let mut sgn = if y0 >= 0 { -1i64 } else { 1 };
    let mut x = -sgn * y0;
    let mut y = sgn * x0;
    let mut winkel = sgn * ATAN_TAB[0];
    let mut k: u32 = 0;

    for i in 1..=steps {
        sgn = if y >= 0 { -1 } else { 1 };
        winkel += sgn * ATAN_TAB[i];
        let xh = x - sgn * (y >> k);
        let yh = y + sgn * (x >> k);
        x = xh;
        y = yh;
        k += 1;
        if y == 0 {
            break;
        }
    }

    -winkel
}

/// Computes a `(mult, shift)` pair such that `(a * mult) >> shift`
/// approximates `a / kernel_sum`, choosing the exact power-of-two shift when
/// `kernel_sum` is itself a power of two and otherwise the greatest
/// `(mult, shift)` pair found in a 48-bit search window whose `mult` still
/// fits in 16 bits (`vx_helper.h::ComputeNormalization`).
pub fn normalize_kernel(kernel_sum: u64) -> (u64, u32) {
    const MAX_SHIFT: u32 = 48;
    const MIN_SHIFT: u32 = 15;

    assert!(kernel_sum > 0, "kernel_sum must be positive");

    let mut old_mult = (1u64 << MAX_SHIFT) / kernel_sum;
    let mut old_shift: u32 = 0;
    {
        let mut temp = old_mult;
        for i in 0..MAX_SHIFT {
            if temp > 0 {
                temp >>= 1;
                old_shift = i;
            }
        }
    }

    let (norm_mult_a, norm_shift_a) = if old_shift > 16 {
        let new_shift = MAX_SHIFT - (old_shift - MIN_SHIFT);
        let new_mult = old_mult >> (old_shift - MIN_SHIFT);
        (new_mult, new_shift)
    } else {
        (old_mult, MAX_SHIFT)
    };

    let mut norm_shift_b: u32 = 0;
    for i in 0..32 {
        if (kernel_sum & (1u64 << i)) != 0 {
            norm_shift_b = i;
        }
    }
    let norm_mult_b: u64 = 1;

    let is_power_two = (kernel_sum & (kernel_sum - 1)) == 0;

    if is_power_two {
        (norm_mult_b, norm_shift_b)
    } else {
        (norm_mult_a, norm_shift_a)
    }
}
