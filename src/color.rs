//! GRAY↔RGB/RGBX colour conversion (spec §4.5, component C7): BT.601 with
//! integer coefficients and ½-LSB rounding.

use crate::element::Elem;

/// `GRAY = (306*R + 601*G + 117*B + 512) >> 10`, BT.601 luma with
/// round-to-nearest via the `+512` half-LSB bias before the shift.
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    let y = 306u32 * u32::from(r) + 601 * u32::from(g) + 117 * u32::from(b) + 512;
    (y >> 10) as u8
}

/// Converts a packed RGB/RGBX plane stream to a single-channel gray stream.
pub fn rgb_stream_to_gray(rgb: &[Elem<u8, 3>]) -> Vec<Elem<u8, 1>> {
    rgb.iter()
        .map(|e| {
            Elem::with_flags(
                [rgb_to_gray(e.lanes[0], e.lanes[1], e.lanes[2])],
                e.sof,
                e.eof,
            )
        })
        .collect()
}

/// Replicates a gray value into each of the `N` channels of RGB/RGBX.
pub fn gray_to_rgb<const N: usize>(gray: &[Elem<u8, 1>]) -> Vec<Elem<u8, N>> {
    gray.iter()
        .map(|e| Elem::with_flags([e.lanes[0]; N], e.sof, e.eof))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_formula_matches_bt601_rounding() {
        assert_eq!(rgb_to_gray(0, 0, 0), 0);
        assert_eq!(rgb_to_gray(255, 255, 255), 255);
        // 306+601+117 = 1024 exactly, so pure white rounds to 255 exactly.
        let y = rgb_to_gray(255, 0, 0);
        assert_eq!(y, ((306 * 255 + 512) >> 10) as u8);
    }

    #[test]
    fn gray_to_rgb_replicates_into_every_channel() {
        let gray = vec![Elem::with_flags([42u8], true, true)];
        let rgb: Vec<Elem<u8, 3>> = gray_to_rgb(&gray);
        assert_eq!(rgb[0].lanes, [42, 42, 42]);
        let rgbx: Vec<Elem<u8, 4>> = gray_to_rgb(&gray);
        assert_eq!(rgbx[0].lanes, [42, 42, 42, 42]);
    }

    #[test]
    fn rgb_to_gray_stream_preserves_frame_flags() {
        let rgb = vec![
            Elem::with_flags([1u8, 2, 3], true, false),
            Elem::with_flags([4u8, 5, 6], false, true),
        ];
        let gray = rgb_stream_to_gray(&rgb);
        assert!(gray[0].sof && !gray[0].eof);
        assert!(!gray[1].sof && gray[1].eof);
    }
}
