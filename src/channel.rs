//! Channel combine/extract and the 3-in-4 RGB packer (spec §4.5, component
//! C5). Grounded directly on `ConvertToRgb`/`ConvertFromRgb` in
//! `img_conversion_core.h`: every other packed layout (U16, U32, RGBX) is a
//! straight 1:1 byte pack with no rate change, but RGB's three bytes per
//! pixel don't divide the four bytes of a 32-bit lane evenly, so the packer
//! runs a 4-step cycle that reads (resp. writes) a byte short on one step in
//! four and carries the remainder in a two- or three-byte buffer.

use crate::element::Elem;

/// Which packed layout a combined/extracted stream uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackedLayout {
    /// Two 8-bit channels in the low 16 bits of a `u16` lane.
    U16,
    /// Four 8-bit channels in a `u32` lane.
    U32,
    /// Three 8-bit channels packed 3-pixels-per-4-lanes into `u32` lanes.
    Rgb,
    /// Four 8-bit channels (RGB + unused) in a `u32` lane, no packing.
    Rgbx,
}

impl PackedLayout {
    pub fn channel_amount(self) -> usize {
        match self {
            PackedLayout::U16 => 2,
            PackedLayout::U32 | PackedLayout::Rgbx => 4,
            PackedLayout::Rgb => 3,
        }
    }
}

/// The 3-in-4 packer's combine-direction state machine
/// (`ConvertToRgb`): advances `cases` through `0,1,2,3`, returning the
/// completed output word once every four input pixels have contributed
/// their bytes to it. `word` is the output word under construction; it
/// must persist across calls since no single call's three input bytes
/// ever fill a whole word on its own (case 0 starts one, case 1 finishes
/// it using only the first byte of its own pixel).
#[derive(Clone, Copy, Debug, Default)]
struct RgbPacker {
    cases: u8,
    word: [u8; 4],
    buf: [u8; 2],
}

impl RgbPacker {
    fn step(&mut self, pixel: [u8; 3]) -> Option<[u8; 4]> {
        match self.cases {
            0 => {
                self.word[0] = pixel[0];
                self.word[1] = pixel[1];
                self.word[2] = pixel[2];
                self.cases = 1;
                None
            }
            1 => {
                self.word[3] = pixel[0];
                let out = self.word;
                self.buf[0] = pixel[1];
                self.buf[1] = pixel[2];
                self.cases = 2;
                Some(out)
            }
            2 => {
                self.word[0] = self.buf[0];
                self.word[1] = self.buf[1];
                self.word[2] = pixel[0];
                self.word[3] = pixel[1];
                let out = self.word;
                self.buf[0] = pixel[2];
                self.cases = 3;
                Some(out)
            }
            _ => {
                self.word[0] = self.buf[0];
                self.word[1] = pixel[0];
                self.word[2] = pixel[1];
                self.word[3] = pixel[2];
                let out = self.word;
                self.cases = 0;
                Some(out)
            }
        }
    }
}

/// The 3-in-4 packer's extract-direction state machine
/// (`ConvertFromRgb`): consumes a packed `[u8;4]` word only on the steps
/// that need fresh input (reported via the return value) and always
/// produces a `[u8;3]` pixel.
#[derive(Clone, Copy, Debug, Default)]
struct RgbUnpacker {
    cases: u8,
    buf: [u8; 3],
}

impl RgbUnpacker {
    /// Returns whether the caller must supply a new packed word via
    /// `feed` before this step's `take` is valid.
    fn needs_input(&self) -> bool {
        self.cases < 3
    }

    fn step(&mut self, word: [u8; 4], out: &mut [u8; 3]) {
        match self.cases {
            0 => {
                out[0] = word[0];
                out[1] = word[1];
                out[2] = word[2];
                self.buf[0] = word[3];
                self.cases = 1;
            }
            1 => {
                out[0] = self.buf[0];
                out[1] = word[0];
                out[2] = word[1];
                self.buf[0] = word[2];
                self.buf[1] = word[3];
                self.cases = 2;
            }
            2 => {
                out[0] = self.buf[0];
                out[1] = self.buf[1];
                out[2] = word[0];
                self.buf[0] = word[1];
                self.buf[1] = word[2];
                self.buf[2] = word[3];
                self.cases = 3;
            }
            _ => {
                out[0] = self.buf[0];
                out[1] = self.buf[1];
                out[2] = self.buf[2];
                self.cases = 0;
            }
        }
    }
}

fn pack_word(layout: PackedLayout, bytes: [u8; 4]) -> u32 {
    match layout {
        PackedLayout::U16 => u32::from(bytes[0]) | (u32::from(bytes[1]) << 8),
        PackedLayout::U32 | PackedLayout::Rgb | PackedLayout::Rgbx => {
            u32::from(bytes[0])
                | (u32::from(bytes[1]) << 8)
                | (u32::from(bytes[2]) << 16)
                | (u32::from(bytes[3]) << 24)
        }
    }
}

fn unpack_word(layout: PackedLayout, word: u32) -> [u8; 4] {
    let _ = layout;
    [
        (word & 0xFF) as u8,
        ((word >> 8) & 0xFF) as u8,
        ((word >> 16) & 0xFF) as u8,
        ((word >> 24) & 0xFF) as u8,
    ]
}

/// Combines `channel_amount(layout)` plane streams of equal length into
/// one packed stream. For [`PackedLayout::Rgb`] the output is three
/// packed words for every four input pixels; every other layout is a
/// straight 1:1 pack.
pub fn combine(
    layout: PackedLayout,
    planes: &[Vec<Elem<u8, 1>>],
) -> Vec<Elem<u32, 1>> {
    let amount = layout.channel_amount();
    assert_eq!(planes.len(), amount, "wrong number of channel planes");
    let len = planes[0].len();
    for p in planes {
        assert_eq!(p.len(), len, "channel planes must be equal length");
    }

    let mut out = Vec::new();
    let mut packer = RgbPacker::default();
    let mut carried_sof = false;
    for i in 0..len {
        let mut pixel = [0u8; 4];
        for (ch, plane) in planes.iter().enumerate() {
            pixel[ch] = plane[i].lanes[0];
        }
        let sof = planes[0][i].sof;
        let eof = planes[0][i].eof;
        carried_sof |= sof;

        if layout == PackedLayout::Rgb {
            if let Some(word_bytes) = packer.step([pixel[0], pixel[1], pixel[2]]) {
                out.push(Elem::with_flags(
                    [pack_word(layout, word_bytes)],
                    carried_sof,
                    eof,
                ));
                carried_sof = false;
            }
        } else {
            out.push(Elem::with_flags([pack_word(layout, pixel)], sof, eof));
        }
    }
    out
}

/// Extracts one 8-bit channel from a packed stream produced by [`combine`]
/// (or an equivalent packed source). For [`PackedLayout::Rgb`] the input is
/// three packed words for every four output pixels.
pub fn extract(layout: PackedLayout, channel: usize, packed: &[Elem<u32, 1>]) -> Vec<Elem<u8, 1>> {
    assert!(channel < layout.channel_amount());

    if layout != PackedLayout::Rgb {
        return packed
            .iter()
            .map(|e| {
                let bytes = unpack_word(layout, e.lanes[0]);
                Elem::with_flags([bytes[channel]], e.sof, e.eof)
            })
            .collect();
    }

    let dst_pixels = packed.len() * 4 / 3;
    let mut out = Vec::with_capacity(dst_pixels);
    let mut unpacker = RgbUnpacker::default();
    let mut src_idx = 0usize;
    let mut current_word = [0u8; 4];
    let mut sof_flag = false;
    let mut eof_flag = false;

    for i in 0..dst_pixels {
        if unpacker.needs_input() {
            let e = &packed[src_idx];
            current_word = unpack_word(layout, e.lanes[0]);
            sof_flag = e.sof;
            eof_flag = e.eof;
            src_idx += 1;
        }
        let mut pixel = [0u8; 3];
        unpacker.step(current_word, &mut pixel);
        out.push(Elem::with_flags(
            [pixel[channel]],
            sof_flag && i == 0,
            eof_flag && i == dst_pixels - 1,
        ));
    }
    out
}
