//! Compressed block helpers shared by every container.
//!
//! Every data, palette and mapping block in BAC and BBG files starts with the
//! same 4-byte little-endian header:
//!
//! ```text
//! bits 0-7   compression type (0x00 = raw, 0x10 = LZ77)
//! bits 8-31  uncompressed length
//! ```
//!
//! ## Submodules
//!
//! | Module | Algorithm | Typical use in rushkit |
//! |--------|-----------|------------------------|
//! | [`lz77`] | LZ77 type 0x10 | BAC part tiles and palettes; BBG tile data |
//!
//! ## Choosing the right function
//!
//! * **Reading any block** - use [`read_compressed`]; it peeks the type byte
//!   and either copies the raw payload or runs [`lz77::decompress`].
//! * **Writing tile data** - use [`lz77::compress`].
//! * **Writing small tables** (BBG mappings and palettes) - use [`write_raw`].

pub mod lz77;

use crate::utils::{at, le_u32, u32_len};
use crate::{Error, Result};

/// Compression type byte of a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    /// Payload stored verbatim.
    Raw = 0x00,
    /// Payload stored as an [`lz77`] stream.
    Lz77 = 0x10,
}

impl TryFrom<u8> for CompressionType {
    type Error = Error;
    fn try_from(v: u8) -> Result<Self> {
        match v {
            0x00 => Ok(Self::Raw),
            0x10 => Ok(Self::Lz77),
            _ => Err(Error::UnsupportedCompression(v)),
        }
    }
}

/// Decoded 4-byte block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub compression_type: CompressionType,
    /// Length of the payload once decoded.
    pub uncompressed_length: u32,
}

impl BlockHeader {
    /// Peek the header of the block at `offset` without decoding it.
    pub fn peek(buf: &[u8], offset: usize) -> Result<Self> {
        let raw = le_u32(&mut at(buf, offset)?)?;
        Ok(Self {
            compression_type: CompressionType::try_from((raw & 0xFF) as u8)?,
            uncompressed_length: raw >> 8,
        })
    }
}

/// Read and decode the block starting at `offset` in `buf`.
///
/// The result is always exactly `uncompressed_length` bytes long.
pub fn read_compressed(buf: &[u8], offset: usize) -> Result<Vec<u8>> {
    let header = BlockHeader::peek(buf, offset)?;
    match header.compression_type {
        CompressionType::Raw => {
            let start = offset + 4;
            let end = start + header.uncompressed_length as usize;
            buf.get(start..end)
                .map(<[u8]>::to_vec)
                .ok_or(Error::UnexpectedEof)
        }
        CompressionType::Lz77 => lz77::decompress(buf, offset),
    }
}

/// Store `data` as a raw (type 0) block, header included.
pub fn write_raw(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4 + data.len());
    out.extend_from_slice(&(u32_len(data.len())? << 8).to_le_bytes());
    out.extend_from_slice(data);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_block() {
        let mut buf = vec![0xEE; 2];
        buf.extend(write_raw(b"abc").unwrap());
        buf.push(0xEE);

        let header = BlockHeader::peek(&buf, 2).unwrap();
        assert_eq!(header.compression_type, CompressionType::Raw);
        assert_eq!(header.uncompressed_length, 3);
        assert_eq!(read_compressed(&buf, 2).unwrap(), b"abc");
    }

    #[test]
    fn lz77_block() {
        let packed = lz77::compress(b"abcabcabcabc").unwrap();
        assert_eq!(read_compressed(&packed, 0).unwrap(), b"abcabcabcabc");
    }

    #[test]
    fn unknown_type() {
        let buf = (3u32 << 8 | 0x11).to_le_bytes();
        assert!(matches!(
            read_compressed(&buf, 0),
            Err(Error::UnsupportedCompression(0x11))
        ));
    }

    #[test]
    fn raw_block_too_short() {
        let buf = (8u32 << 8).to_le_bytes();
        assert!(matches!(read_compressed(&buf, 0), Err(Error::UnexpectedEof)));
    }
}
