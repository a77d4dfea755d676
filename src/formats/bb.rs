//! BB - archive of BBG images.
//!
//! ## Layout
//! ```text
//! [0x00] Magic "BB\0\0"          (4 bytes)
//! [0x04] EntryCount              (u32 LE)
//! [0x08] EntryTable              (EntryCount × 8 bytes)
//! [...]  Entry data, in table order
//! ```
//!
//! ## Entry (8 bytes)
//! ```text
//! [0x00] Offset - from the start of the archive (u32 LE)
//! [0x04] Size   - in bytes                      (u32 LE)
//! ```
//!
//! Entries are opaque blobs that each parse as a standalone [`Bbg`]. Saving
//! lays them out back to back right after the table.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::formats::bbg::Bbg;
use crate::utils::{at, le_u32, magic, u32_len};
use crate::{Error, Result};

pub const MAGIC: &[u8; 4] = b"BB\0\0";

/// A BB archive held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bb {
    /// Entry blobs in table order.
    pub contents: Vec<Vec<u8>>,
}

impl Bb {
    /// Build an archive from entry blobs.
    pub fn from_entries(contents: Vec<Vec<u8>>) -> Self {
        Self { contents }
    }

    /// Parse the archive held in `buf`, copying every entry out.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = at(buf, 0)?;
        magic(&mut r, MAGIC)?;

        let count = le_u32(&mut r)?;
        let mut contents = Vec::with_capacity(count.min(0x1000) as usize);
        for _ in 0..count {
            let offset = le_u32(&mut r)? as usize;
            let size = le_u32(&mut r)? as usize;
            let entry = buf
                .get(offset..offset + size)
                .ok_or(Error::InvalidRange)?;
            contents.push(entry.to_vec());
        }

        log::debug!("bb: {} entries", contents.len());
        Ok(Self { contents })
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Iterate over the entry blobs.
    pub fn entries(&self) -> impl Iterator<Item = &[u8]> {
        self.contents.iter().map(Vec::as_slice)
    }

    /// Parse entry `index` as a BBG.
    ///
    /// Returns [`Error::InvalidRange`] if there is no such entry.
    pub fn bbg(&self, index: usize) -> Result<Bbg> {
        let entry = self.contents.get(index).ok_or(Error::InvalidRange)?;
        Bbg::parse(entry)
    }

    /// Swap in new bytes for entry `index`.
    ///
    /// Returns [`Error::InvalidRange`] if there is no such entry.
    pub fn replace(&mut self, index: usize, entry: Vec<u8>) -> Result<()> {
        let slot = self.contents.get_mut(index).ok_or(Error::InvalidRange)?;
        *slot = entry;
        Ok(())
    }

    /// Stream the archive to `w`, rebuilding the table from the current
    /// contents.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(MAGIC)?;
        w.write_u32::<LittleEndian>(u32_len(self.contents.len())?)?;

        let mut offset = 8 + self.contents.len() * 8;
        for entry in &self.contents {
            w.write_u32::<LittleEndian>(u32_len(offset)?)?;
            w.write_u32::<LittleEndian>(u32_len(entry.len())?)?;
            offset += entry.len();
        }
        for entry in &self.contents {
            w.write_all(entry)?;
        }
        Ok(())
    }

    /// Serialize the archive.
    pub fn save(&self) -> Result<Vec<u8>> {
        let size = 8 + self.contents.iter().map(|e| 8 + e.len()).sum::<usize>();
        let mut out = Vec::with_capacity(size);
        self.write(&mut out)?;
        Ok(out)
    }
}
