//! Vector-width converter (spec §4.6, component C4): rate-adapts a stream
//! of width `P_src` to width `P_dst` carrying the same total scalar count,
//! for arbitrary (not just power-of-two) ratios.

use crate::element::{Elem, Scalar};

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

/// Converts a `PSRC`-wide element stream into a `PDST`-wide one, selecting
/// the matching strategy by how `PSRC` and `PDST` relate:
/// equal widths pass through, a multiple splits or accumulates elements,
/// and any other ratio runs the general LCM ring buffer.
pub fn convert<T, const PSRC: usize, const PDST: usize>(
    input: impl IntoIterator<Item = Elem<T, PSRC>>,
) -> Vec<Elem<T, PDST>>
where
    T: Scalar,
{
    if PSRC == PDST {
        return input
            .into_iter()
            .map(|e| {
                let mut lanes = [T::zero(); PDST];
                lanes[..PDST.min(PSRC)].copy_from_slice(&e.lanes[..PDST.min(PSRC)]);
                Elem {
                    lanes,
                    sof: e.sof,
                    eof: e.eof,
                }
            })
            .collect();
    }

    if PSRC > PDST && PSRC % PDST == 0 {
        let ratio = PSRC / PDST;
        let mut out = Vec::new();
        for e in input {
            for k in 0..ratio {
                let mut lanes = [T::zero(); PDST];
                lanes.copy_from_slice(&e.lanes[k * PDST..(k + 1) * PDST]);
                out.push(Elem::with_flags(lanes, e.sof && k == 0, e.eof && k == ratio - 1));
            }
        }
        return out;
    }

    if PDST > PSRC && PDST % PSRC == 0 {
        let ratio = PDST / PSRC;
        let mut out = Vec::new();
        let mut pending: Vec<Elem<T, PSRC>> = Vec::with_capacity(ratio);
        for e in input {
            pending.push(e);
            if pending.len() == ratio {
                let mut lanes = [T::zero(); PDST];
                for (k, src) in pending.iter().enumerate() {
                    lanes[k * PSRC..(k + 1) * PSRC].copy_from_slice(&src.lanes);
                }
                out.push(Elem::with_flags(
                    lanes,
                    pending[0].sof,
                    pending[ratio - 1].eof,
                ));
                pending.clear();
            }
        }
        return out;
    }

    convert_lcm::<T, PSRC, PDST>(input)
}

/// The general case: neither width divides the other (e.g. the 3:4 ratio
/// between RGB's packed byte rate and a 4-lane word rate). Uses a ring
/// buffer of `lcm(PSRC, PDST)` scalars, writing each source element at
/// offset `(src_ptr mod (PDST/gcd))·PSRC` and reading each destination
/// element at `(dst_ptr mod (PSRC/gcd))·PDST`, emitting whenever enough
/// source scalars have landed to complete the next destination element.
fn convert_lcm<T, const PSRC: usize, const PDST: usize>(
    input: impl IntoIterator<Item = Elem<T, PSRC>>,
) -> Vec<Elem<T, PDST>>
where
    T: Scalar,
{
    let l = lcm(PSRC, PDST);
    let mut ring = vec![T::zero(); l];
    let mut ring_sof = vec![false; l];
    let mut ring_eof = vec![false; l];

    let mut out = Vec::new();
    let mut src_ptr: usize = 0;
    let mut dst_ptr: usize = 0;
    let src_slots = l / PSRC;
    let dst_slots = l / PDST;

    for e in input {
        let off = (src_ptr % src_slots) * PSRC;
        ring[off..off + PSRC].copy_from_slice(&e.lanes);
        for i in 0..PSRC {
            ring_sof[off + i] = e.sof && i == 0;
            ring_eof[off + i] = e.eof && i == PSRC - 1;
        }
        src_ptr += 1;

        while src_ptr * PSRC >= (dst_ptr + 1) * PDST {
            let off = (dst_ptr % dst_slots) * PDST;
            let mut lanes = [T::zero(); PDST];
            lanes.copy_from_slice(&ring[off..off + PDST]);
            let sof = ring_sof[off..off + PDST].iter().any(|&b| b);
            let eof = ring_eof[off..off + PDST].iter().any(|&b| b);
            out.push(Elem::with_flags(lanes, sof, eof));
            dst_ptr += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(vals: &[[u8; 1]]) -> Vec<Elem<u8, 1>> {
        let n = vals.len();
        vals.iter()
            .enumerate()
            .map(|(i, v)| Elem::with_flags(*v, i == 0, i == n - 1))
            .collect()
    }

    #[test]
    fn equal_width_is_identity() {
        let input = src(&[[1], [2], [3]]);
        let out = convert::<u8, 1, 1>(input.clone());
        assert_eq!(
            out.iter().map(|e| e.lanes[0]).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn split_4_to_2() {
        let input: Vec<Elem<u8, 4>> = vec![Elem::with_flags([1, 2, 3, 4], true, true)];
        let out = convert::<u8, 4, 2>(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].lanes, [1, 2]);
        assert_eq!(out[1].lanes, [3, 4]);
        assert!(out[0].sof && !out[0].eof);
        assert!(!out[1].sof && out[1].eof);
    }

    #[test]
    fn accumulate_2_to_4() {
        let input: Vec<Elem<u8, 2>> = vec![
            Elem::with_flags([1, 2], true, false),
            Elem::with_flags([3, 4], false, true),
        ];
        let out = convert::<u8, 2, 4>(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].lanes, [1, 2, 3, 4]);
        assert!(out[0].sof && out[0].eof);
    }

    #[test]
    fn non_dividing_3_to_4_preserves_scalar_order() {
        let values: Vec<u8> = (0..12).collect();
        let input: Vec<Elem<u8, 3>> = values
            .chunks(3)
            .enumerate()
            .map(|(i, c)| Elem::with_flags([c[0], c[1], c[2]], i == 0, i == 3))
            .collect();
        let out = convert::<u8, 3, 4>(input);
        assert_eq!(out.len(), 3);
        let flat: Vec<u8> = out.iter().flat_map(|e| e.lanes).collect();
        assert_eq!(flat, values);
        assert!(out[0].sof);
        assert!(out[2].eof);
    }

    #[test]
    fn roundtrip_p_to_q_to_p_is_identity() {
        let values: Vec<u8> = (0..24).collect();
        let input: Vec<Elem<u8, 3>> = values
            .chunks(3)
            .enumerate()
            .map(|(i, c)| Elem::with_flags([c[0], c[1], c[2]], i == 0, i == 7))
            .collect();
        let widened = convert::<u8, 3, 4>(input);
        let back = convert::<u8, 4, 3>(widened);
        let flat: Vec<u8> = back.iter().flat_map(|e| e.lanes).collect();
        assert_eq!(flat, values);
    }
}
