//! LZ77 (type 0x10) as used by the Nintendo DS BIOS and most DS titles.
//!
//! ## Layout
//! ```text
//! [0x00] Header (u32 LE)
//!         bits 0-3   reserved (0)
//!         bits 4-7   method (must be 1)
//!         bits 8-31  uncompressed length
//! [0x04] Token groups: one flag byte followed by up to 8 tokens
//! ```
//!
//! Flag bits are consumed MSB first. A clear bit is one literal byte. A set
//! bit is a big-endian `u16` back-reference:
//! ```text
//! LLLL DDDD DDDD DDDD    copy 3 + L bytes starting D + 1 bytes back
//! ```
//! Copies run byte by byte, so a reference may overlap the bytes it is
//! producing (`D < 3 + L` repeats a short pattern).
//!
//! Decoding stops as soon as the declared length is reached, even in the
//! middle of a token group or a copy.

use std::cmp::min;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::utils::{at, be_u16, le_u32, u8, u32_len};
use crate::{Error, Result};

/// The only method nibble this variant understands.
pub const METHOD_LZ77: u8 = 1;

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 3 + 0xF;
const WINDOW: usize = 0x1000;
const MAX_UNCOMPRESSED: usize = 0xFF_FFFF;

/// Decompress the LZ77 stream whose header starts at `offset` in `buf`.
///
/// Returns [`Error::UnsupportedMethod`] if the header method nibble is not
/// 1, [`Error::BadBackReference`] if a reference points before the start of
/// the output and [`Error::UnexpectedEof`] if the stream is truncated.
pub fn decompress(buf: &[u8], offset: usize) -> Result<Vec<u8>> {
    let mut r = at(buf, offset)?;

    let header = le_u32(&mut r)?;
    let method = ((header >> 4) & 0xF) as u8;
    if method != METHOD_LZ77 {
        return Err(Error::UnsupportedMethod(method));
    }
    let length = (header >> 8) as usize;

    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        let flags = u8(&mut r)?;

        for bit in 0..8 {
            if flags & (0x80 >> bit) != 0 {
                let info = be_u16(&mut r)? as usize;
                let count = MIN_LENGTH + (info >> 12);
                let distance = (info & 0xFFF) + 1;
                if distance > out.len() {
                    return Err(Error::BadBackReference {
                        position: out.len(),
                        distance,
                    });
                }

                let mut ptr = out.len() - distance;
                for _ in 0..count {
                    let b = out[ptr];
                    out.push(b);
                    ptr += 1;
                    if out.len() >= length {
                        break;
                    }
                }
            } else {
                out.push(u8(&mut r)?);
            }

            if out.len() >= length {
                break;
            }
        }
    }

    Ok(out)
}

/// Compress `data` into an LZ77 stream, header included.
///
/// Greedy longest match within the 4096-byte window; ties go to the nearest
/// occurrence. Inputs longer than the 24-bit length field are rejected with
/// [`Error::InvalidRange`].
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > MAX_UNCOMPRESSED {
        return Err(Error::InvalidRange);
    }

    let mut out = Vec::with_capacity(4 + data.len() + data.len() / 8 + 1);
    out.write_u32::<LittleEndian>(u32_len(data.len())? << 8 | (METHOD_LZ77 as u32) << 4)?;

    let mut pos = 0;
    while pos < data.len() {
        let flag_pos = out.len();
        out.push(0);

        for bit in 0..8 {
            if pos >= data.len() {
                break;
            }

            let (length, distance) = longest_match(data, pos);
            if length >= MIN_LENGTH {
                out[flag_pos] |= 0x80 >> bit;
                let info = ((length - MIN_LENGTH) << 12) | (distance - 1);
                out.write_u16::<BigEndian>(info as u16)?;
                pos += length;
            } else {
                out.push(data[pos]);
                pos += 1;
            }
        }
    }

    log::debug!("lz77: {} -> {} bytes", data.len(), out.len());
    Ok(out)
}

/// Longest match for `data[pos..]` as `(length, distance)`; length 0 when
/// nothing of at least [`MIN_LENGTH`] bytes is found.
fn longest_match(data: &[u8], pos: usize) -> (usize, usize) {
    let max_len = min(MAX_LENGTH, data.len() - pos);
    if max_len < MIN_LENGTH {
        return (0, 0);
    }

    let (mut best_len, mut best_dist) = (0, 0);
    for distance in 1..=min(WINDOW, pos) {
        let start = pos - distance;
        // Overlap past `pos` is fine: the decoder copies byte by byte.
        let len = (0..max_len)
            .take_while(|&i| data[start + i] == data[pos + i])
            .count();
        if len > best_len {
            best_len = len;
            best_dist = distance;
            if len == max_len {
                break;
            }
        }
    }

    if best_len < MIN_LENGTH {
        (0, 0)
    } else {
        (best_len, best_dist)
    }
}
