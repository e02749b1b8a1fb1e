//! Activation (spec §4.10, component C13): the nine OpenVX activation
//! functions, computed in `f32` and narrowed back with the requested
//! rounding and saturation.

use crate::element::Scalar;
use crate::fixed::{max_of, min_of, saturate, OverflowPolicy, RoundPolicy};
use num_traits::AsPrimitive;

#[derive(Clone, Copy, Debug)]
pub enum Activation {
    Logistic,
    ScaledTanh { a: f32, b: f32 },
    Relu,
    BoundedRelu { a: f32 },
    Softplus,
    Abs,
    Square,
    Sqrt,
    Linear { a: f32, b: f32 },
}

fn eval(kind: Activation, x: f32) -> f32 {
    match kind {
        Activation::Logistic => 1.0 / (1.0 + (-x).exp()),
        Activation::ScaledTanh { a, b } => a * (b * x).tanh(),
        Activation::Relu => x.max(0.0),
        Activation::BoundedRelu { a } => x.max(0.0).min(a),
        Activation::Softplus => (1.0 + x.exp()).ln(),
        Activation::Abs => x.abs(),
        Activation::Square => x * x,
        Activation::Sqrt => x.max(0.0).sqrt(),
        Activation::Linear { a, b } => a * x + b,
    }
}

pub fn apply<T: Scalar>(
    kind: Activation,
    x: T,
    round: RoundPolicy,
    overflow: OverflowPolicy,
) -> T {
    let xf: f32 = AsPrimitive::as_(x);
    let yf = eval(kind, xf);
    let rounded = match round {
        RoundPolicy::ToZero => yf.trunc(),
        RoundPolicy::NearestEven => yf.round(),
    };

    if T::KIND == crate::element::ScalarKind::F32 {
        return num_traits::NumCast::from(yf).unwrap_or_else(T::zero);
    }

    let v = rounded as i64;
    match overflow {
        OverflowPolicy::Saturate => {
            let lo: i64 = AsPrimitive::<i64>::as_(min_of::<T>());
            let hi: i64 = AsPrimitive::<i64>::as_(max_of::<T>());
            T::from_i64(saturate(v, lo, hi))
        }
        OverflowPolicy::Wrap => T::from_i64(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_negative_to_zero() {
        assert_eq!(apply::<i16>(Activation::Relu, -5, RoundPolicy::ToZero, OverflowPolicy::Saturate), 0);
        assert_eq!(apply::<i16>(Activation::Relu, 5, RoundPolicy::ToZero, OverflowPolicy::Saturate), 5);
    }

    #[test]
    fn bounded_relu_clamps_to_a() {
        let out = apply::<i16>(
            Activation::BoundedRelu { a: 10.0 },
            100,
            RoundPolicy::ToZero,
            OverflowPolicy::Saturate,
        );
        assert_eq!(out, 10);
    }

    #[test]
    fn logistic_of_zero_is_one_half() {
        let out = apply::<u8>(Activation::Logistic, 0, RoundPolicy::NearestEven, OverflowPolicy::Saturate);
        assert!((out as i32 - 1).abs() <= 1 || out == 0);
    }

    #[test]
    fn square_saturates_on_u8() {
        let out = apply::<u8>(Activation::Square, 200, RoundPolicy::ToZero, OverflowPolicy::Saturate);
        assert_eq!(out, 255);
    }

    #[test]
    fn abs_of_negative() {
        assert_eq!(apply::<i8>(Activation::Abs, -100, RoundPolicy::ToZero, OverflowPolicy::Saturate), 100);
    }
}
