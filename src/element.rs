//! The fundamental transport element: `Vec<T, N>` plus its side-band flags.
//!
//! Grounded on `buffer.rs`'s `Samples`/`SampleBits` pair (a runtime tag
//! describing a compile-time-fixed in-memory layout) for the `ScalarKind`
//! enum, and on its `#[non_exhaustive]` / `repr` idioms.

use bytemuck::Pod;
use num_traits::{AsPrimitive, Bounded, NumCast, Zero};
use std::fmt;

/// Scalars that may occupy a lane of a stream element (spec §3: `T ∈ {u8,
/// i8, u16, i16, u32, i32, u64, i64, f32}`).
///
/// This is a closed set by construction: the trait is sealed by only being
/// implemented here for the nine listed types, which keeps every generic
/// kernel monomorphised over a known, finite family instead of opening the
/// door to arbitrary user scalars.
pub trait Scalar:
    Copy
    + Default
    + PartialOrd
    + Pod
    + Bounded
    + Zero
    + NumCast
    + AsPrimitive<i64>
    + AsPrimitive<f32>
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    /// Runtime tag for this scalar, used where a descriptor needs to
    /// remember its element type across an erased boundary (e.g. the PGM
    /// writer picking a sample width).
    const KIND: ScalarKind;

    /// Whether arithmetic on this type is signed (spec §4.4, §7).
    const SIGNED: bool;

    /// Bit width of the type, used by `arith_shr` range checks.
    const BITS: u32;

    /// Narrows `v` the way a raw `as` cast would: two's-complement
    /// truncation for integers, so callers that have already clamped `v`
    /// into range (saturation) get the exact value, and callers relying on
    /// wraparound (spec §4.4/§4.6 `OverflowPolicy::Wrap`) get real modular
    /// wrapping rather than a silent fallback to zero.
    fn from_i64(v: i64) -> Self;
}

/// Identifies which concrete scalar a lane holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, $signed:expr, $bits:expr) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;
            const SIGNED: bool = $signed;
            const BITS: u32 = $bits;

            fn from_i64(v: i64) -> Self {
                v as $ty
            }
        }
    };
}

impl_scalar!(u8, U8, false, 8);
impl_scalar!(i8, I8, true, 8);
impl_scalar!(u16, U16, false, 16);
impl_scalar!(i16, I16, true, 16);
impl_scalar!(u32, U32, false, 32);
impl_scalar!(i32, I32, true, 32);
impl_scalar!(u64, U64, false, 64);
impl_scalar!(i64, I64, true, 64);

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::F32;
    const SIGNED: bool = true;
    const BITS: u32 = 32;

    fn from_i64(v: i64) -> Self {
        v as f32
    }
}

/// A vector element carrying `N` lanes of `T` plus the start/end-of-frame
/// side-band flags (spec §3, §6 "Frame-boundary signalling").
///
/// `sof`/`eof` are always present in the type, per the design note on
/// `vx_image_data`'s conditionally-compiled side-band fields: a port must
/// keep the stream type uniform and treat "unused" as "always false".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Elem<T: Scalar, const N: usize> {
    pub lanes: [T; N],
    pub sof: bool,
    pub eof: bool,
}

impl<T: Scalar, const N: usize> Elem<T, N> {
    /// A data-carrying element with both side-band flags clear.
    pub fn new(lanes: [T; N]) -> Self {
        Elem {
            lanes,
            sof: false,
            eof: false,
        }
    }

    pub fn with_flags(lanes: [T; N], sof: bool, eof: bool) -> Self {
        Elem { lanes, sof, eof }
    }

    /// Broadcast a single scalar across every lane (used by border/padding
    /// fills and by the N=1 scalar-stream adaptor of spec §9).
    pub fn splat(value: T) -> Self {
        Elem::new([value; N])
    }
}

/// Adapts a plain `T` stream into an `Elem<T, 1>` stream, per the design
/// note on unifying the vector and scalar entry points behind a thin
/// adaptor.
pub fn scalar_stream<T, I>(iter: I) -> impl Iterator<Item = Elem<T, 1>>
where
    T: Scalar,
    I: IntoIterator<Item = Elem<T, 1>>,
{
    iter.into_iter()
}

/// Sets `sof`/`eof` on the first/last element of an iterator representing
/// exactly one frame. Producers use this to guarantee spec §3's invariant
/// (exactly one `sof`, exactly one `eof`, bracketing a contiguous run)
/// without hand-tracking position at each call site.
pub fn frame<T, const N: usize, I>(iter: I) -> impl Iterator<Item = Elem<T, N>>
where
    T: Scalar,
    I: IntoIterator<Item = [T; N]>,
{
    let mut it = iter.into_iter().peekable();
    let mut first = true;
    std::iter::from_fn(move || {
        let lanes = it.next()?;
        let is_last = it.peek().is_none();
        let elem = Elem::with_flags(lanes, first, is_last);
        first = false;
        Some(elem)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_brackets_single_run() {
        let elems: Vec<_> = frame::<u8, 2, _>(vec![[1, 2], [3, 4], [5, 6]]).collect();
        assert_eq!(elems.len(), 3);
        assert!(elems[0].sof && !elems[0].eof);
        assert!(!elems[1].sof && !elems[1].eof);
        assert!(!elems[2].sof && elems[2].eof);
    }

    #[test]
    fn single_element_frame_is_both() {
        let elems: Vec<_> = frame::<u8, 1, _>(vec![[9]]).collect();
        assert_eq!(elems.len(), 1);
        assert!(elems[0].sof && elems[0].eof);
    }

    #[test]
    fn splat_fills_every_lane() {
        let e = Elem::<u8, 4>::splat(7);
        assert_eq!(e.lanes, [7, 7, 7, 7]);
    }
}
