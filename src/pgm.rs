//! Binary P5 PGM reader/writer (spec §6): the crate's one external,
//! fallible collaborator — every other operator in this crate is a pure,
//! infallible function of its stream once its config has validated.
//!
//! Header layout: magic `P5`, whitespace-separated decimal `cols`, `rows`,
//! `max_gray`, a single terminator byte, then `rows * cols` samples (one
//! byte each if `max_gray <= 255`, else two big-endian bytes `HI<<8|LO`).
//! `#` starts a comment that runs to end-of-line and may appear between any
//! two header tokens.

use crate::error::PgmError;
use std::io::{self, Read, Write};
use tracing::{debug, trace};

/// A decoded grayscale image. Samples are always widened to `u16` in
/// memory regardless of `max_gray`; [`PgmImage::write`] narrows back down
/// when `max_gray <= 255`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgmImage {
    pub cols: u32,
    pub rows: u32,
    pub max_gray: u16,
    pub samples: Vec<u16>,
}

fn read_exact_checked<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<(), PgmError> {
    let mut got = 0;
    while got < buf.len() {
        match r.read(&mut buf[got..]) {
            Ok(0) => {
                return Err(PgmError::ShortRead {
                    expected: buf.len(),
                    got,
                })
            }
            Ok(n) => got += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PgmError::Io(e)),
        }
    }
    Ok(())
}

fn write_all_checked<W: Write>(w: &mut W, buf: &[u8]) -> Result<(), PgmError> {
    let mut wrote = 0;
    while wrote < buf.len() {
        match w.write(&buf[wrote..]) {
            Ok(0) => {
                return Err(PgmError::ShortWrite {
                    wrote,
                    expected: buf.len(),
                })
            }
            Ok(n) => wrote += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PgmError::Io(e)),
        }
    }
    Ok(())
}

fn read_one<R: Read>(r: &mut R) -> Result<u8, PgmError> {
    let mut b = [0u8; 1];
    read_exact_checked(r, &mut b)?;
    Ok(b[0])
}

/// Advances past whitespace and `#`-comments, returning the first byte of
/// the next token.
fn skip_to_token<R: Read>(r: &mut R) -> Result<u8, PgmError> {
    loop {
        let b = read_one(r)?;
        if b == b'#' {
            loop {
                if read_one(r)? == b'\n' {
                    break;
                }
            }
            continue;
        }
        if b.is_ascii_whitespace() {
            continue;
        }
        return Ok(b);
    }
}

/// Reads the rest of a decimal token whose first byte is `first`, stopping
/// at (and consuming) the next whitespace byte.
fn read_token<R: Read>(r: &mut R, first: u8) -> Result<String, PgmError> {
    let mut s = String::new();
    s.push(first as char);
    loop {
        let b = read_one(r)?;
        if b.is_ascii_whitespace() {
            return Ok(s);
        }
        s.push(b as char);
    }
}

fn read_decimal<R: Read>(r: &mut R, what: &'static str) -> Result<u32, PgmError> {
    let first = skip_to_token(r)?;
    let token = read_token(r, first)?;
    token.parse().map_err(|_| PgmError::HeaderParse(what))
}

impl PgmImage {
    pub fn read<R: Read>(r: &mut R) -> Result<Self, PgmError> {
        trace!("pgm: start of frame (reading header)");
        let mut magic = [0u8; 2];
        read_exact_checked(r, &mut magic)?;
        if &magic != b"P5" {
            return Err(PgmError::BadMagic);
        }

        let cols = read_decimal(r, "cols")?;
        let rows = read_decimal(r, "rows")?;
        let max_gray = read_decimal(r, "max_gray")?;
        if max_gray == 0 || max_gray > u32::from(u16::MAX) {
            return Err(PgmError::HeaderParse("max_gray out of range"));
        }
        let max_gray = max_gray as u16;

        let count = (rows as usize)
            .checked_mul(cols as usize)
            .ok_or(PgmError::HeaderParse("rows * cols overflows"))?;

        let samples = if max_gray <= 255 {
            let mut buf = vec![0u8; count];
            read_exact_checked(r, &mut buf)?;
            buf.into_iter().map(u16::from).collect()
        } else {
            let mut buf = vec![0u8; count * 2];
            read_exact_checked(r, &mut buf)?;
            buf.chunks_exact(2)
                .map(|c| (u16::from(c[0]) << 8) | u16::from(c[1]))
                .collect()
        };

        debug!(cols, rows, max_gray, "pgm: end of frame (decoded)");
        Ok(PgmImage {
            cols,
            rows,
            max_gray,
            samples,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), PgmError> {
        trace!(cols = self.cols, rows = self.rows, "pgm: start of frame (writing header)");
        let header = format!("P5\n{} {}\n{}\n", self.cols, self.rows, self.max_gray);
        write_all_checked(w, header.as_bytes())?;

        let result = if self.max_gray <= 255 {
            let bytes: Vec<u8> = self.samples.iter().map(|&s| s as u8).collect();
            write_all_checked(w, &bytes)
        } else {
            let mut bytes = Vec::with_capacity(self.samples.len() * 2);
            for &s in &self.samples {
                bytes.push((s >> 8) as u8);
                bytes.push((s & 0xFF) as u8);
            }
            write_all_checked(w, &bytes)
        };
        if result.is_ok() {
            debug!(cols = self.cols, rows = self.rows, "pgm: end of frame (written)");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_an_8bit_image() {
        let img = PgmImage {
            cols: 3,
            rows: 2,
            max_gray: 255,
            samples: vec![0, 128, 255, 1, 2, 3],
        };
        let mut buf = Vec::new();
        img.write(&mut buf).unwrap();
        let back = PgmImage::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn round_trips_a_16bit_image() {
        let img = PgmImage {
            cols: 2,
            rows: 2,
            max_gray: 65535,
            samples: vec![0, 300, 40000, 65535],
        };
        let mut buf = Vec::new();
        img.write(&mut buf).unwrap();
        let back = PgmImage::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn comments_anywhere_in_the_header_are_skipped() {
        let raw = b"P5\n# a comment\n2 2\n# another\n255\n\x01\x02\x03\x04";
        let img = PgmImage::read(&mut Cursor::new(raw.to_vec())).unwrap();
        assert_eq!(img.cols, 2);
        assert_eq!(img.rows, 2);
        assert_eq!(img.samples, vec![1, 2, 3, 4]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let raw = b"P6\n2 2\n255\n\x01\x02\x03\x04";
        let err = PgmImage::read(&mut Cursor::new(raw.to_vec())).unwrap_err();
        assert!(matches!(err, PgmError::BadMagic));
    }

    #[test]
    fn truncated_body_is_a_short_read() {
        let raw = b"P5\n2 2\n255\n\x01\x02";
        let err = PgmImage::read(&mut Cursor::new(raw.to_vec())).unwrap_err();
        assert!(matches!(err, PgmError::ShortRead { .. }));
    }
}
