//! BAC - multi-frame, multi-part sprite animation container.
//!
//! ## Layout
//! ```text
//! [0x00] Unknown                       (4 bytes)
//! [0x04] AnimationMappingsOffset       (u32 LE)
//! [0x08] AnimationFramesOffset         (u32 LE)
//! [0x0C] FrameAssemblyOffset           (u32 LE)
//! [0x10] PaletteOffset                 (u32 LE)
//! [0x14] DataOffset                    (u32 LE)
//! [0x18] InfoOffset                    (u32 LE)
//! ```
//! All offsets are from the start of the container.
//!
//! ## Info block
//! ```text
//! [0x00] BlockSize      (u32 LE)
//! [0x04] FrameCount     (u16 LE)
//! [0x06] FrameInfoSize  (u16 LE)
//! [0x08] Unknown record (10 × i16)
//! [0x1C] FrameCount × 10 × i16 per-frame records
//! ```
//! The records are carried through untouched.
//!
//! ## Mapping block
//! ```text
//! [0x00] BlockSize (= FrameCount × 8 + 4)  (u32 LE)
//! [0x04] FrameCount × (FrameOffset: u32, Unknown: u32)
//! ```
//! `FrameOffset` is relative to the animation frames block.
//!
//! ## Frame sub-blocks
//! Each frame is a run of `(Id: u16, Size: u16)` tagged blocks, `Size`
//! including the 4-byte tag:
//!
//! | Id | Contents |
//! |----|----------|
//! | 1  | One `u32` pointer into the frame assembly block |
//! | 2  | `(DataOffset: u32, TileCount: u32)` per part, into the data block |
//! | 3  | One `(Offset: u32, Size: u32)` into the palette block |
//! | 4  | Terminator |
//!
//! Blocks 1, 2 and 3 come first, in that order. Later blocks are read until
//! a terminator or the start of the frame assembly block. Repeated id 2
//! blocks are expected to match the first one; anything else is skipped.
//!
//! ## Frame assembly record
//! ```text
//! [0x00] PartCount                               (u32 LE)
//! [0x04] X, Y, XRight, YBottom, HotSpotX, HotSpotY (6 × i16 LE)
//! [0x10] PartCount × (Attr0, Attr1, Attr2, Attr3) (4 × u16 LE)
//! ```
//! `Attr0`/`Attr1` follow the DS OAM layout: Y in the low 8 bits of
//! `Attr0` with the shape in bits 14-15, X in the low 9 bits of `Attr1` with
//! the size class in bits 14-15.
//!
//! ## Data block
//! ```text
//! [0x00] BlockSize (u32 LE)
//! [0x04] Compressed 4bpp tile blobs, addressed by part DataOffset
//! ```

use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;

use crate::compression::{lz77, read_compressed};
use crate::error::{Warning, report};
use crate::graphics::{
    BitDepth, IndexedImage, Palette, Rgb, decode_palette, decode_tiles, encode_tiles,
    tile::TILE_SIDE,
};
use crate::utils::{at, bytesa, le_i16, le_u16, le_u32, u32_len};
use crate::{Error, Result};

const ATTR0_WIDE: u16 = 1 << 14;
const ATTR0_TALL: u16 = 2 << 14;

const SIZE_SQUARE: [(u16, u16); 4] = [(8, 8), (16, 16), (32, 32), (64, 64)];
const SIZE_WIDE: [(u16, u16); 4] = [(16, 8), (32, 8), (32, 16), (64, 32)];
const SIZE_TALL: [(u16, u16); 4] = [(8, 16), (8, 32), (16, 32), (32, 64)];

/// Size of one opaque info record.
pub const INFO_RECORD_SIZE: usize = 20;

/// The fixed BAC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacHeader {
    pub unknown: [u8; 4],
    pub animation_mappings_offset: u32,
    pub animation_frames_offset: u32,
    pub frame_assembly_offset: u32,
    pub palette_offset: u32,
    pub data_offset: u32,
    pub info_offset: u32,
}

impl BacHeader {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut r = at(buf, 0)?;
        Ok(Self {
            unknown: bytesa::<4>(&mut r)?,
            animation_mappings_offset: le_u32(&mut r)?,
            animation_frames_offset: le_u32(&mut r)?,
            frame_assembly_offset: le_u32(&mut r)?,
            palette_offset: le_u32(&mut r)?,
            data_offset: le_u32(&mut r)?,
            info_offset: le_u32(&mut r)?,
        })
    }
}

/// Info block contents, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub block_size: u32,
    pub frame_info_size: u16,
    pub header: [u8; INFO_RECORD_SIZE],
    pub records: Vec<[u8; INFO_RECORD_SIZE]>,
}

/// Sprite shape from `Attr0` bits 14-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Square,
    Wide,
    Tall,
}

impl Shape {
    /// Pixel `(width, height)` for a size class (0-3).
    pub fn dimensions(self, size_class: u8) -> (u16, u16) {
        let table = match self {
            Shape::Square => &SIZE_SQUARE,
            Shape::Wide => &SIZE_WIDE,
            Shape::Tall => &SIZE_TALL,
        };
        table[(size_class & 3) as usize]
    }
}

/// Where a part sits inside its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub shape: Shape,
    pub size_class: u8,
}

impl Placement {
    pub fn from_attributes(attr0: u16, attr1: u16) -> Self {
        // The tall bit wins when both shape bits are set.
        let shape = if attr0 & ATTR0_TALL != 0 {
            Shape::Tall
        } else if attr0 & ATTR0_WIDE != 0 {
            Shape::Wide
        } else {
            Shape::Square
        };
        let size_class = (attr1 >> 14) as u8;
        let (width, height) = shape.dimensions(size_class);
        Self {
            x: (attr1 & 0x1FF) as i16,
            y: (attr0 & 0xFF) as i16,
            width,
            height,
            shape,
            size_class,
        }
    }
}

/// One tile blob placed in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    /// Offset of the compressed tiles, relative to the data block.
    pub data_offset: u32,
    pub tile_count: u32,
    pub placement: Placement,
    /// Raw attribute halfwords from the frame assembly record.
    pub attributes: [u16; 4],
}

/// Frame bounding box in sprite space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i16,
    pub y: i16,
    pub x_right: i16,
    pub y_bottom: i16,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.x_right as i32 - self.x as i32
    }

    pub fn height(&self) -> i32 {
        self.y_bottom as i32 - self.y as i32
    }
}

/// An image-parts table inside the frames block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartTable {
    /// Absolute offset of the first entry.
    pub offset: usize,
    pub len: usize,
}

/// A parsed animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Second value of the mapping pair, carried opaque.
    pub mapping_unknown: u32,
    /// Pointer into the frame assembly block.
    pub assembly_pointer: u32,
    pub parts: Vec<Part>,
    /// `(offset, size)` into the palette block.
    pub palette_part: (u32, u32),
    pub palette: Palette,
    pub bounds: Bounds,
    pub hot_spot: (i16, i16),
    /// Every image-parts table of the frame, the primary one first.
    pub part_tables: Vec<PartTable>,
}

impl Frame {
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }
}

/// Settings for [`Bac::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Accept re-tiled parts whose tile count changed, writing the new
    /// count, instead of failing.
    pub permissive: bool,
}

#[derive(Debug)]
enum SubBlock {
    AssemblyPointers(Vec<u32>),
    ImageParts { table: usize, entries: Vec<(u32, u32)> },
    PaletteParts(Vec<(u32, u32)>),
    End,
    Other(u16),
}

fn read_pairs(r: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<(u32, u32)>> {
    (0..count)
        .map(|_| -> Result<(u32, u32)> { Ok((le_u32(r)?, le_u32(r)?)) })
        .collect()
}

fn read_sub_block(r: &mut Cursor<&[u8]>) -> Result<SubBlock> {
    let start = r.position();
    let id = le_u16(r)?;
    let size = le_u16(r)?;
    let body = size
        .checked_sub(4)
        .ok_or_else(|| Error::Format(format!("block {id} at {start:#x} has size {size}")))?
        as usize;

    let block = match id {
        1 => SubBlock::AssemblyPointers(
            (0..body / 4).map(|_| le_u32(r)).collect::<Result<_>>()?,
        ),
        2 => SubBlock::ImageParts {
            table: r.position() as usize,
            entries: read_pairs(r, body / 8)?,
        },
        3 => SubBlock::PaletteParts(read_pairs(r, body / 8)?),
        4 => SubBlock::End,
        other => SubBlock::Other(other),
    };
    // Bodies may carry trailing bytes past their last whole entry.
    r.set_position(start + size as u64);
    Ok(block)
}

fn unexpected(frame: usize, wanted: u16, got: &SubBlock) -> Error {
    Error::Format(format!("frame {frame}: expected block {wanted}, found {got:?}"))
}

/// A BAC container and its parsed frames.
///
/// The container bytes are owned here; [`Bac::update`] rebuilds them.
#[derive(Debug, Clone)]
pub struct Bac {
    pub header: BacHeader,
    pub info: FrameInfo,
    pub frames: Vec<Frame>,
    /// Warnings raised by the last parse or update.
    pub warnings: Vec<Warning>,
    data: Vec<u8>,
}

impl Bac {
    /// Parse a BAC container, taking ownership of its bytes.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let header = BacHeader::parse(&data)?;
        log::debug!("bac: {header:?}");

        let mut r = at(&data, header.info_offset as usize)?;
        let block_size = le_u32(&mut r)?;
        let frame_count = le_u16(&mut r)? as usize;
        let frame_info_size = le_u16(&mut r)?;
        let info_header = bytesa::<INFO_RECORD_SIZE>(&mut r)?;
        let records = (0..frame_count)
            .map(|_| bytesa::<INFO_RECORD_SIZE>(&mut r))
            .collect::<Result<Vec<_>>>()?;
        let info = FrameInfo {
            block_size,
            frame_info_size,
            header: info_header,
            records,
        };

        let mut r = at(&data, header.animation_mappings_offset as usize)?;
        let mappings_size = le_u32(&mut r)? as usize;
        if mappings_size != frame_count * 8 + 4 {
            return Err(Error::Format(format!(
                "mapping block size {mappings_size} does not match {frame_count} frames"
            )));
        }
        let mappings = read_pairs(&mut r, frame_count)?;

        let mut warnings = Vec::new();
        let frames = mappings
            .iter()
            .enumerate()
            .map(|(index, &(offset, unknown))| {
                parse_frame(&data, &header, index, offset, unknown, &mut warnings)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            header,
            info,
            frames,
            warnings,
            data,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Compose frame `index` into an image of its bounding box size.
    ///
    /// Index 0 of the result is transparent.
    pub fn frame_image(&self, index: usize) -> Result<IndexedImage> {
        let frame = self.frames.get(index).ok_or(Error::InvalidRange)?;
        let (width, height) = match (usize::try_from(frame.width()), usize::try_from(frame.height())) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(Error::Format(format!(
                    "frame {index}: inverted bounding box {:?}",
                    frame.bounds
                )));
            }
        };

        let mut canvas = IndexedImage::new(width, height).with_palette(frame.palette.clone());
        canvas.transparent = Some(0);

        for part in &frame.parts {
            let tiles = decode_tiles(&self.part_data(part.data_offset)?, BitDepth::Bpp4);
            let p = &part.placement;
            let image = IndexedImage::from_tiles(
                &tiles,
                p.width as usize,
                p.height as usize,
                p.width as usize / TILE_SIDE,
            );
            canvas.paste(&image, p.x as i32, p.y as i32);
        }

        Ok(canvas)
    }

    /// Compose every frame.
    pub fn images(&self) -> Result<Vec<IndexedImage>> {
        (0..self.frames.len()).map(|i| self.frame_image(i)).collect()
    }

    /// Decoded tile bytes of the part at `data_offset` in the data block.
    pub fn part_data(&self, data_offset: u32) -> Result<Vec<u8>> {
        read_compressed(&self.data, self.header.data_offset as usize + data_offset as usize)
    }

    /// Replace frame images and rebuild the container.
    ///
    /// Each replacement is recoloured to its frame's palette, cut back into
    /// the frame's parts and repacked. Parts are shared by data offset across
    /// frames: a shared part takes the new pixels unless another frame in the
    /// same update already wrote different ones, in which case the frame gets
    /// a newly appended part instead. Every part table, repeats included, is
    /// then rewritten with the new offsets.
    ///
    /// The data block must be the last block of the container. On failure the
    /// container is left unchanged.
    pub fn update(
        &mut self,
        replacements: &[(usize, IndexedImage)],
        options: &UpdateOptions,
    ) -> Result<()> {
        let data_offset = self.header.data_offset as usize;
        let h = &self.header;
        for other in [
            h.animation_mappings_offset,
            h.animation_frames_offset,
            h.frame_assembly_offset,
            h.palette_offset,
            h.info_offset,
        ] {
            if other as usize >= data_offset {
                return Err(Error::Format(format!(
                    "block at {other:#x} follows the data block at {data_offset:#x}"
                )));
            }
        }

        let offsets: BTreeSet<u32> = self
            .frames
            .iter()
            .flat_map(|f| f.parts.iter().map(|p| p.data_offset))
            .collect();
        let slot_of: HashMap<u32, usize> = offsets.iter().enumerate().map(|(i, &o)| (o, i)).collect();
        let mut slots = offsets
            .iter()
            .map(|&o| self.part_data(o))
            .collect::<Result<Vec<_>>>()?;
        let mut written = vec![false; slots.len()];

        // (slot, tile count) per part, per frame
        let mut layout: Vec<Vec<(usize, u32)>> = self
            .frames
            .iter()
            .map(|f| {
                f.parts
                    .iter()
                    .map(|p| (slot_of[&p.data_offset], p.tile_count))
                    .collect()
            })
            .collect();

        let mut warnings = Vec::new();
        for (frame_index, image) in replacements {
            let frame_index = *frame_index;
            let frame = self.frames.get(frame_index).ok_or(Error::InvalidRange)?;
            let image = recolor(frame_index, frame, image)?;

            for (part_index, part) in frame.parts.iter().enumerate() {
                let p = &part.placement;
                let tiles = image
                    .crop(p.x as usize, p.y as usize, p.width as usize, p.height as usize)
                    .to_tiles();
                let entry = &mut layout[frame_index][part_index];

                let actual = u32_len(tiles.len())?;
                if actual != entry.1 {
                    if !options.permissive {
                        return Err(Error::TileCountMismatch {
                            frame: frame_index,
                            part: part_index,
                            expected: entry.1,
                            actual,
                        });
                    }
                    report(
                        &mut warnings,
                        Warning::TileCountMismatch {
                            frame: frame_index,
                            part: part_index,
                            expected: entry.1,
                            actual,
                        },
                    );
                    entry.1 = actual;
                }

                let packed = encode_tiles(&tiles, BitDepth::Bpp4)?;
                let slot = entry.0;
                if written[slot] && slots[slot] != packed {
                    log::info!("bac: adding new part for frame {frame_index}");
                    entry.0 = slots.len();
                    slots.push(packed);
                    written.push(true);
                } else {
                    slots[slot] = packed;
                    written[slot] = true;
                }
            }
        }

        let mut block = vec![0u8; 4];
        let mut new_offsets = Vec::with_capacity(slots.len());
        for slot in &slots {
            new_offsets.push(u32_len(block.len())?);
            block.extend(lz77::compress(slot)?);
        }
        let block_size = u32_len(block.len())?;
        block[..4].copy_from_slice(&block_size.to_le_bytes());
        log::debug!("bac: part offsets {new_offsets:?}");

        let mut out = self.data.get(..data_offset).ok_or(Error::InvalidRange)?.to_vec();
        for (frame, parts) in self.frames.iter().zip(&layout) {
            for table in &frame.part_tables {
                for (i, &(slot, tile_count)) in parts.iter().take(table.len).enumerate() {
                    let pos = table.offset + i * 8;
                    let entry = out.get_mut(pos..pos + 8).ok_or_else(|| {
                        Error::Format(format!("part table at {pos:#x} lies in the data block"))
                    })?;
                    entry[..4].copy_from_slice(&new_offsets[slot].to_le_bytes());
                    entry[4..].copy_from_slice(&tile_count.to_le_bytes());
                }
            }
        }
        out.extend_from_slice(&block);

        log::info!(
            "bac: rewrote {} frames, {} parts, data block {} bytes",
            replacements.len(),
            slots.len(),
            block_size
        );

        let mut rebuilt = Bac::parse(out)?;
        warnings.append(&mut rebuilt.warnings);
        rebuilt.warnings = warnings;
        *self = rebuilt;
        Ok(())
    }
}

fn parse_frame(
    data: &[u8],
    header: &BacHeader,
    index: usize,
    offset: u32,
    mapping_unknown: u32,
    warnings: &mut Vec<Warning>,
) -> Result<Frame> {
    let mut r = at(data, header.animation_frames_offset as usize + offset as usize)?;

    let assembly_pointer = match read_sub_block(&mut r)? {
        SubBlock::AssemblyPointers(ptrs) if ptrs.len() == 1 => ptrs[0],
        SubBlock::AssemblyPointers(ptrs) => {
            return Err(Error::Format(format!(
                "frame {index}: {} frame assembly pointers, only one is supported",
                ptrs.len()
            )));
        }
        other => return Err(unexpected(index, 1, &other)),
    };

    let (table, entries) = match read_sub_block(&mut r)? {
        SubBlock::ImageParts { table, entries } => (table, entries),
        other => return Err(unexpected(index, 2, &other)),
    };
    let mut part_tables = vec![PartTable {
        offset: table,
        len: entries.len(),
    }];

    let palette_part = match read_sub_block(&mut r)? {
        SubBlock::PaletteParts(parts) if parts.len() == 1 => parts[0],
        SubBlock::PaletteParts(parts) => {
            return Err(Error::Format(format!(
                "frame {index}: {} palette parts, only one is supported",
                parts.len()
            )));
        }
        other => return Err(unexpected(index, 3, &other)),
    };

    while r.position() < header.frame_assembly_offset as u64 {
        match read_sub_block(&mut r)? {
            SubBlock::ImageParts {
                table,
                entries: repeat,
            } => {
                part_tables.push(PartTable {
                    offset: table,
                    len: repeat.len(),
                });
                if repeat != entries {
                    report(
                        warnings,
                        Warning::StructuralMismatch {
                            frame: index,
                            block_offset: table,
                        },
                    );
                }
            }
            SubBlock::End => break,
            SubBlock::Other(id) => report(warnings, Warning::UnknownBlock { frame: index, id }),
            other => log::debug!("bac: frame {index}: skipping {other:?}"),
        }
    }

    let palette = decode_palette(&read_compressed(
        data,
        header.palette_offset as usize + palette_part.0 as usize,
    )?);

    let assembly_at = header.frame_assembly_offset as usize + assembly_pointer as usize;
    let mut r = at(data, assembly_at)?;
    let count = le_u32(&mut r)? as usize;
    if count != entries.len() {
        return Err(Error::Format(format!(
            "frame {index}: assembly lists {count} parts, frame has {}",
            entries.len()
        )));
    }
    let bounds = Bounds {
        x: le_i16(&mut r)?,
        y: le_i16(&mut r)?,
        x_right: le_i16(&mut r)?,
        y_bottom: le_i16(&mut r)?,
    };
    let hot_spot = (le_i16(&mut r)?, le_i16(&mut r)?);
    log::debug!("bac: frame {index} assembly at {assembly_at:#x}: {bounds:?}, hot spot {hot_spot:?}");

    let mut parts = Vec::with_capacity(count);
    for &(data_offset, tile_count) in &entries {
        let attributes = [
            le_u16(&mut r)?,
            le_u16(&mut r)?,
            le_u16(&mut r)?,
            le_u16(&mut r)?,
        ];
        let placement = Placement::from_attributes(attributes[0], attributes[1]);
        log::debug!("bac: frame {index} part at {data_offset:#x}: {attributes:?} -> {placement:?}");
        parts.push(Part {
            data_offset,
            tile_count,
            placement,
            attributes,
        });
    }

    Ok(Frame {
        mapping_unknown,
        assembly_pointer,
        parts,
        palette_part,
        palette,
        bounds,
        hot_spot,
        part_tables,
    })
}

/// Colours 1-15 of a palette, the ones a 4bpp sprite can draw with.
fn sprite_colors(palette: &Palette) -> &[Rgb] {
    let end = palette.len().min(16);
    palette.colors.get(1..end).unwrap_or(&[])
}

/// Map `image` onto the frame palette.
///
/// Images already drawn with the frame's colours 1-15 keep their indices.
/// Otherwise the transparent index becomes 0 and every other pixel becomes
/// the frame index of the same RGB value.
fn recolor(frame_index: usize, frame: &Frame, image: &IndexedImage) -> Result<IndexedImage> {
    let target = sprite_colors(&frame.palette);
    if sprite_colors(&image.palette) == target {
        log::debug!("bac: frame {frame_index}: palette matches, keeping indices");
        return Ok(image.clone().with_palette(frame.palette.clone()));
    }

    let mut out = image.clone().with_palette(frame.palette.clone());
    out.transparent = Some(0);
    for px in out.pixels_mut() {
        if image.transparent == Some(*px) {
            *px = 0;
            continue;
        }
        let color = image.palette.get(*px as usize).ok_or(Error::InvalidRange)?;
        let pos = target
            .iter()
            .position(|&c| c == color)
            .ok_or(Error::PaletteMatch {
                frame: frame_index,
                color,
            })?;
        *px = pos as u8 + 1;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_from_attributes() {
        let p = Placement::from_attributes(0x0010, 0x0123);
        assert_eq!((p.x, p.y), (0x123, 0x10));
        assert_eq!((p.width, p.height), (8, 8));
        assert_eq!(p.shape, Shape::Square);

        let p = Placement::from_attributes(ATTR0_WIDE | 4, 2 << 14 | 8);
        assert_eq!((p.shape, p.size_class), (Shape::Wide, 2));
        assert_eq!((p.width, p.height), (32, 16));

        let p = Placement::from_attributes(ATTR0_TALL, 3 << 14);
        assert_eq!((p.width, p.height), (32, 64));

        // both shape bits set
        let p = Placement::from_attributes(ATTR0_TALL | ATTR0_WIDE, 1 << 14);
        assert_eq!((p.shape, p.width, p.height), (Shape::Tall, 8, 32));
    }

    #[test]
    fn sub_block_tags() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&[2, 0, 20, 0]);
        buf.extend_from_slice(&[0x10, 0, 0, 0, 4, 0, 0, 0, 0x30, 0, 0, 0, 1, 0, 0, 0]);
        buf.extend_from_slice(&[9, 0, 8, 0, 0xAA, 0xAA, 0xAA, 0xAA]);
        buf.extend_from_slice(&[4, 0, 4, 0]);

        let mut r = at(&buf, 0).unwrap();
        match read_sub_block(&mut r).unwrap() {
            SubBlock::ImageParts { table, entries } => {
                assert_eq!(table, 4);
                assert_eq!(entries, vec![(0x10, 4), (0x30, 1)]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(read_sub_block(&mut r).unwrap(), SubBlock::Other(9)));
        assert!(matches!(read_sub_block(&mut r).unwrap(), SubBlock::End));
    }

    #[test]
    fn sub_block_ends_at_declared_size() {
        // tag 3 with a 4-byte body: no whole palette pair
        let buf = [3, 0, 8, 0, 1, 0, 2, 0, 4, 0, 4, 0];
        let mut r = at(&buf, 0).unwrap();
        match read_sub_block(&mut r).unwrap() {
            SubBlock::PaletteParts(parts) => assert!(parts.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(r.position(), 8);
        assert!(matches!(read_sub_block(&mut r).unwrap(), SubBlock::End));
    }

    #[test]
    fn sub_block_too_small() {
        let buf = [7, 0, 2, 0];
        let mut r = at(&buf, 0).unwrap();
        assert!(matches!(read_sub_block(&mut r), Err(Error::Format(_))));
    }

    fn frame_with(colors: Vec<Rgb>) -> Frame {
        Frame {
            mapping_unknown: 0,
            assembly_pointer: 0,
            parts: Vec::new(),
            palette_part: (0, 0),
            palette: Palette::new(colors),
            bounds: Bounds {
                x: 0,
                y: 0,
                x_right: 2,
                y_bottom: 1,
            },
            hot_spot: (0, 0),
            part_tables: Vec::new(),
        }
    }

    #[test]
    fn recolor_by_rgb() {
        let frame = frame_with(vec![[0, 0, 0], [255, 0, 0], [0, 255, 0]]);
        let mut image = IndexedImage::from_pixels(2, 1, vec![0, 1])
            .unwrap()
            .with_palette(Palette::new(vec![[9, 9, 9], [0, 255, 0]]));
        image.transparent = Some(0);

        let out = recolor(0, &frame, &image).unwrap();
        assert_eq!(out.pixels(), &[0, 2]);
        assert_eq!(out.palette, frame.palette);
    }

    #[test]
    fn recolor_keeps_matching_palette() {
        let frame = frame_with(vec![[0, 0, 0], [255, 255, 255]]);
        let image = IndexedImage::from_pixels(2, 1, vec![1, 0])
            .unwrap()
            .with_palette(Palette::new(vec![[1, 2, 3], [255, 255, 255]]));
        assert_eq!(recolor(0, &frame, &image).unwrap().pixels(), &[1, 0]);
    }

    #[test]
    fn recolor_missing_color() {
        let frame = frame_with(vec![[0, 0, 0], [255, 0, 0]]);
        let image = IndexedImage::from_pixels(2, 1, vec![0, 0])
            .unwrap()
            .with_palette(Palette::new(vec![[0, 0, 255]]));
        assert!(matches!(
            recolor(3, &frame, &image),
            Err(Error::PaletteMatch {
                frame: 3,
                color: [0, 0, 255]
            })
        ));
    }
}
