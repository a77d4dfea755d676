//! Low-level I/O primitives shared by all parsers.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity. Containers are held fully in memory,
//! so most callers read through a [`Cursor`] positioned with [`at`].

use std::io::{Cursor, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::{Error, Result};

/// Read one byte.
#[inline]
pub(crate) fn u8<R: Read>(r: &mut R) -> Result<u8> {
    Ok(r.read_u8()?)
}

/// Read a little-endian `u16`.
#[inline]
pub(crate) fn le_u16<R: Read>(r: &mut R) -> Result<u16> {
    Ok(r.read_u16::<LittleEndian>()?)
}

/// Read a little-endian `i16`.
#[inline]
pub(crate) fn le_i16<R: Read>(r: &mut R) -> Result<i16> {
    Ok(r.read_i16::<LittleEndian>()?)
}

/// Read a little-endian `u32`.
#[inline]
pub(crate) fn le_u32<R: Read>(r: &mut R) -> Result<u32> {
    Ok(r.read_u32::<LittleEndian>()?)
}

/// Read a little-endian `i32`.
#[inline]
pub(crate) fn le_i32<R: Read>(r: &mut R) -> Result<i32> {
    Ok(r.read_i32::<LittleEndian>()?)
}

/// Read a big-endian `u16`.
#[inline]
pub(crate) fn be_u16<R: Read>(r: &mut R) -> Result<u16> {
    Ok(r.read_u16::<BigEndian>()?)
}

/// Read exactly `N` bytes into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(r: &mut impl Read) -> Result<[u8; N]> {
    let mut b = [0u8; N];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Verify that the next `N` bytes in the stream match `expected`.
///
/// Returns [`Error::BadMagic`] on mismatch.
#[inline]
pub(crate) fn magic<R: Read, const N: usize>(r: &mut R, expected: &[u8; N]) -> Result<()> {
    let got = bytesa::<N>(r)?;
    if &got != expected {
        return Err(Error::BadMagic);
    }
    Ok(())
}

/// Open a cursor over `buf` positioned at `offset`.
///
/// Returns [`Error::InvalidRange`] if `offset` lies past the end of `buf`.
#[inline]
pub(crate) fn at(buf: &[u8], offset: usize) -> Result<Cursor<&[u8]>> {
    if offset > buf.len() {
        return Err(Error::InvalidRange);
    }
    let mut c = Cursor::new(buf);
    c.set_position(offset as u64);
    Ok(c)
}

/// Convert a length to a `u32` header field.
#[inline]
pub(crate) fn u32_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidRange)
}
