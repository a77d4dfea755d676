//! BBG - single tile-mapped background image.
//!
//! ## Layout
//! ```text
//! [0x00] Header           (0x20 bytes)
//! [data_offset]     Tile data block      (compressed block, see below)
//! [mappings_offset] Tile map block       (compressed block)
//! [palette_offset]  Palette block        (compressed block, may be empty)
//! ```
//!
//! ## Header (0x20 bytes)
//! ```text
//! [0x00] Magic "BBG\0"            (4 bytes)
//! [0x04] Size                     (u32 LE)
//! [0x08] DataOffset               (u32 LE)
//! [0x0C] MappingsOffset           (u32 LE)
//! [0x10] PaletteOffset            (u32 LE)
//! [0x14] ColorFormat (1=4bpp, 2=8bpp) (i32 LE)
//! [0x18] RowLength (tiles)        (i16 LE)
//! [0x1A] RowCount (tiles)         (i16 LE)
//! [0x1C] PaletteBank << 4         (i16 LE)
//! [0x1E] Unknown                  (i16 LE)
//! ```
//! Every block starts with the 4-byte header described in
//! [`crate::compression`].
//!
//! ## Tile map cell (u16 LE)
//! ```text
//! PPPP VHTT TTTT TTTT
//! P = palette bank, V = vertical flip, H = horizontal flip,
//! T = VRAM tile index
//! ```
//! Indices are VRAM-relative. The base is recovered from the first cell:
//! its 10-bit index with the lowest bit cleared.

use std::collections::HashMap;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::compression::{lz77, read_compressed, write_raw};
use crate::error::{Warning, report};
use crate::graphics::{
    BitDepth, IndexedImage, Palette, Tile, Transform, decode_palette, decode_tiles,
    encode_palette, encode_tiles_masked, tile::TILE_SIDE,
};
use crate::utils::{at, le_i16, le_i32, le_u32, magic, u32_len};
use crate::{Error, Result};

pub const MAGIC: &[u8; 4] = b"BBG\0";
pub const HEADER_SIZE: usize = 0x20;

/// The fixed BBG header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BbgHeader {
    pub size: u32,
    pub data_offset: u32,
    pub mappings_offset: u32,
    pub palette_offset: u32,
    /// 1 = 4bpp, 2 = 8bpp. 5 shows up in a few files and reads as 8bpp.
    pub color_format: i32,
    pub row_length: i16,
    pub row_count: i16,
    /// Palette bank in the high nibble of the low byte.
    pub palette_bank_byte: i16,
    pub unknown: i16,
}

impl BbgHeader {
    /// Template for a fresh image; sizes and offsets are filled in by
    /// [`Bbg::encode`].
    pub fn new(color_format: i32, palette_bank_byte: i16) -> Self {
        Self {
            size: 0,
            data_offset: 0,
            mappings_offset: 0,
            palette_offset: 0,
            color_format,
            row_length: 0,
            row_count: 0,
            palette_bank_byte,
            unknown: 0,
        }
    }

    /// Parse the header at the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = at(buf, 0)?;
        magic(&mut r, MAGIC)?;
        Ok(Self {
            size: le_u32(&mut r)?,
            data_offset: le_u32(&mut r)?,
            mappings_offset: le_u32(&mut r)?,
            palette_offset: le_u32(&mut r)?,
            color_format: le_i32(&mut r)?,
            row_length: le_i16(&mut r)?,
            row_count: le_i16(&mut r)?,
            palette_bank_byte: le_i16(&mut r)?,
            unknown: le_i16(&mut r)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(MAGIC);
        out.write_u32::<LittleEndian>(self.size)?;
        out.write_u32::<LittleEndian>(self.data_offset)?;
        out.write_u32::<LittleEndian>(self.mappings_offset)?;
        out.write_u32::<LittleEndian>(self.palette_offset)?;
        out.write_i32::<LittleEndian>(self.color_format)?;
        out.write_i16::<LittleEndian>(self.row_length)?;
        out.write_i16::<LittleEndian>(self.row_count)?;
        out.write_i16::<LittleEndian>(self.palette_bank_byte)?;
        out.write_i16::<LittleEndian>(self.unknown)?;
        Ok(())
    }

    /// Palette bank the whole image starts from.
    pub fn palette_bank(&self) -> u8 {
        ((self.palette_bank_byte >> 4) & 0xF) as u8
    }

    /// Packing used when writing tiles: 4bpp for format 1, 8bpp otherwise.
    pub fn bit_depth(&self) -> BitDepth {
        if self.color_format == 1 {
            BitDepth::Bpp4
        } else {
            BitDepth::Bpp8
        }
    }
}

/// One decoded tile map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMapEntry {
    /// VRAM tile index (10 bits).
    pub tile_index: u16,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Palette bank (4 bits).
    pub palette_bank: u8,
}

impl TileMapEntry {
    pub fn from_raw(v: u16) -> Self {
        Self {
            tile_index: v & 0x03FF,
            flip_h: v & 0x0400 != 0,
            flip_v: v & 0x0800 != 0,
            palette_bank: (v >> 12) as u8,
        }
    }

    pub fn to_raw(&self) -> u16 {
        (self.tile_index & 0x03FF)
            | (self.flip_h as u16) << 10
            | (self.flip_v as u16) << 11
            | ((self.palette_bank & 0xF) as u16) << 12
    }
}

/// Settings for [`Bbg::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// VRAM tile index of the first stored tile. Defaults to the offset
    /// decoded from the original map (0 for a fresh image).
    pub vram_offset: Option<u16>,
    /// Seed the tile list with an all-zero tile at index 0.
    pub empty_first_tile: bool,
    /// LZ77-compress the tile block; otherwise it is stored raw.
    pub compress: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            vram_offset: None,
            empty_first_tile: false,
            compress: true,
        }
    }
}

/// A parsed BBG image.
#[derive(Debug, Clone)]
pub struct Bbg {
    pub header: BbgHeader,
    /// Stored tiles, indexed by `map` entries minus `vram_offset`.
    pub tiles: Vec<Tile>,
    /// Tile map, `row_length` cells per row.
    pub map: Vec<TileMapEntry>,
    pub vram_offset: i32,
    /// Decoded palette; `None` when the palette block is empty.
    pub palette: Option<Palette>,
    /// Warnings raised while parsing.
    pub warnings: Vec<Warning>,
    palette_data: Vec<u8>,
}

impl Bbg {
    /// An empty image built from a header template, ready for
    /// [`Bbg::encode`].
    pub fn new(header: BbgHeader, palette: Option<Palette>) -> Self {
        let palette_data = palette.as_ref().map(encode_palette).unwrap_or_default();
        Self {
            header,
            tiles: Vec::new(),
            map: Vec::new(),
            vram_offset: 0,
            palette,
            warnings: Vec::new(),
            palette_data,
        }
    }

    /// Parse a BBG held in `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let header = BbgHeader::parse(buf)?;
        let mut warnings = Vec::new();

        let depth = match header.color_format {
            1 => BitDepth::Bpp4,
            2 => BitDepth::Bpp8,
            5 => {
                report(&mut warnings, Warning::UnknownColorFormat(5));
                BitDepth::Bpp8
            }
            other => return Err(Error::Format(format!("unknown BBG color format {other}"))),
        };

        if header.data_offset == header.mappings_offset
            && header.data_offset == header.palette_offset
        {
            report(&mut warnings, Warning::PaletteOnly);
        }

        let data = read_compressed(buf, header.data_offset as usize)?;
        let mappings_data = read_compressed(buf, header.mappings_offset as usize)?;
        let palette_data = read_compressed(buf, header.palette_offset as usize)?;

        let tiles = decode_tiles(&data, depth);
        let map: Vec<TileMapEntry> = mappings_data
            .chunks_exact(2)
            .map(|c| TileMapEntry::from_raw(u16::from_le_bytes([c[0], c[1]])))
            .collect();
        // Tile data is loaded on an even VRAM index.
        let vram_offset = map.first().map_or(0, |e| (e.tile_index & 0x3FE) as i32);
        let palette = (!palette_data.is_empty()).then(|| decode_palette(&palette_data));

        log::debug!(
            "bbg: {} tiles, {}x{} map, vram offset {}, palette bank {}",
            tiles.len(),
            header.row_length,
            header.row_count,
            vram_offset,
            header.palette_bank()
        );

        Ok(Self {
            header,
            tiles,
            map,
            vram_offset,
            palette,
            warnings,
            palette_data,
        })
    }

    /// Raw BGR555 palette block contents.
    pub fn palette_data(&self) -> &[u8] {
        &self.palette_data
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.header.row_length.max(0) as usize * TILE_SIDE
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.header.row_count.max(0) as usize * TILE_SIDE
    }

    /// Compose the tile map into an image.
    ///
    /// `external` replaces the image's own palette, as needed for
    /// backgrounds that share a palette stored in another file. When a
    /// palette is available and a cell selects a higher bank than the
    /// header, its indices are shifted into that bank of the combined
    /// palette. Cells pointing outside the tile list are left blank.
    pub fn to_image(&self, external: Option<&Palette>) -> IndexedImage {
        let palette = external.or(self.palette.as_ref());
        let mut image = IndexedImage::new(self.width(), self.height())
            .with_palette(palette.cloned().unwrap_or_else(Palette::placeholder));

        let row_length = self.header.row_length.max(0) as usize;
        let rows = self.header.row_count.max(0) as usize;
        if row_length == 0 {
            return image;
        }
        let bank = self.header.palette_bank();

        for (i, entry) in self.map.iter().enumerate() {
            let (col, row) = (i % row_length, i / row_length);
            if row >= rows {
                break;
            }

            let local = entry.tile_index as i32 - self.vram_offset;
            let Some(tile) = usize::try_from(local).ok().and_then(|n| self.tiles.get(n)) else {
                continue;
            };

            let mut tile = tile.transformed(Transform::from_flags(entry.flip_h, entry.flip_v));
            if palette.is_some() && bank < entry.palette_bank {
                tile = tile.offset_indices((entry.palette_bank - bank) * 16);
            }
            image.paste_tile(&tile, col * TILE_SIDE, row * TILE_SIDE);
        }

        image
    }

    /// Replace the contents with `image` and serialize the result.
    ///
    /// Tiles are matched against the ones already emitted under identity,
    /// horizontal flip, vertical flip and 180° rotation, in that order; the
    /// first match is referenced instead of stored again. For 4bpp images a
    /// tile's bank comes from its first pixel (`index / 16`) and only the low
    /// nibble of each index is stored.
    ///
    /// On success `self` is reparsed from the returned bytes.
    pub fn encode(&mut self, image: &IndexedImage, options: &EncodeOptions) -> Result<Vec<u8>> {
        if image.width() % TILE_SIDE != 0 || image.height() % TILE_SIDE != 0 {
            return Err(Error::Format(format!(
                "image size {}x{} is not a multiple of 8",
                image.width(),
                image.height()
            )));
        }
        let row_length = i16::try_from(image.width() / TILE_SIDE).map_err(|_| Error::InvalidRange)?;
        let row_count = i16::try_from(image.height() / TILE_SIDE).map_err(|_| Error::InvalidRange)?;

        let vram_offset = options.vram_offset.map_or(self.vram_offset, i32::from);
        let depth = self.header.bit_depth();

        let mut tiles: Vec<Tile> = Vec::new();
        let mut seen: HashMap<Tile, usize> = HashMap::new();
        if options.empty_first_tile {
            tiles.push(Tile::default());
            seen.insert(Tile::default(), 0);
        }

        let mut cells = Vec::new();
        let mut reused = 0;
        for tile in image.to_tiles() {
            let found = Transform::ALL
                .iter()
                .find_map(|&t| seen.get(&tile.transformed(t)).map(|&n| (n, t)));
            match found {
                Some((n, t)) => {
                    cells.push((n, t));
                    reused += 1;
                }
                None => {
                    let n = tiles.len();
                    tiles.push(tile);
                    seen.insert(tile, n);
                    cells.push((n, Transform::Identity));
                }
            }
        }
        log::info!("bbg: {} tiles reused, {} in result", reused, tiles.len());

        let banks: Vec<u8> = match depth {
            BitDepth::Bpp4 => tiles.iter().map(|t| t.0[0] / 16).collect(),
            BitDepth::Bpp8 => vec![0; tiles.len()],
        };
        let header_bank = self.header.palette_bank();

        let mut mappings = Vec::with_capacity(cells.len() * 2);
        for (n, t) in cells {
            let tile_index = n as i32 + vram_offset;
            if !(0..=0x3FF).contains(&tile_index) {
                return Err(Error::Format(format!(
                    "tile index {tile_index} does not fit in the tile map"
                )));
            }
            let palette_bank = header_bank + banks[n];
            if palette_bank > 0xF {
                return Err(Error::Format(format!("palette bank {palette_bank} out of range")));
            }
            let (flip_h, flip_v) = t.flags();
            let entry = TileMapEntry {
                tile_index: tile_index as u16,
                flip_h,
                flip_v,
                palette_bank,
            };
            mappings.write_u16::<LittleEndian>(entry.to_raw())?;
        }

        let data = encode_tiles_masked(&tiles, depth);
        let data_block = if options.compress {
            lz77::compress(&data)?
        } else {
            write_raw(&data)?
        };
        let mappings_block = write_raw(&mappings)?;
        let palette_block = if self.palette_data.is_empty() {
            vec![0; 4]
        } else {
            write_raw(&self.palette_data)?
        };

        let data_offset = HEADER_SIZE;
        let mappings_offset = data_offset + data_block.len();
        let palette_offset = mappings_offset + mappings_block.len();
        let size = palette_offset + palette_block.len();

        let header = BbgHeader {
            size: u32_len(size)?,
            data_offset: u32_len(data_offset)?,
            mappings_offset: u32_len(mappings_offset)?,
            palette_offset: u32_len(palette_offset)?,
            row_length,
            row_count,
            ..self.header
        };

        let mut out = Vec::with_capacity(size);
        header.write(&mut out)?;
        out.extend_from_slice(&data_block);
        out.extend_from_slice(&mappings_block);
        out.extend_from_slice(&palette_block);

        *self = Bbg::parse(&out)?;
        Ok(out)
    }
}
