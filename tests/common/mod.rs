//! Builders for synthetic containers shared by the integration tests.

#![allow(dead_code)]

use rushkit::compression::{lz77, write_raw};
use rushkit::graphics::{BitDepth, Tile, encode_tiles};

pub const BLACK: u16 = 0x0000;
pub const WHITE: u16 = 0x7FFF;
pub const RED: u16 = 0x001F;

/// How a frame repeats its image-parts table after the palette block.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    None,
    Same,
    /// First entry's tile count bumped by one.
    Different,
}

pub struct PartDef {
    /// Index into the blob list.
    pub blob: usize,
    pub attr0: u16,
    pub attr1: u16,
    pub tile_count: u32,
}

pub struct FrameDef {
    /// `x, y, x_right, y_bottom`
    pub bounds: [i16; 4],
    pub palette: Vec<u16>,
    pub parts: Vec<PartDef>,
    pub repeat: Repeat,
    /// Insert a sub-block with tag 9 before the terminator.
    pub extra_block: bool,
}

impl FrameDef {
    pub fn new(bounds: [i16; 4], palette: &[u16], parts: Vec<PartDef>) -> Self {
        Self {
            bounds,
            palette: palette.to_vec(),
            parts,
            repeat: Repeat::None,
            extra_block: false,
        }
    }
}

/// An 8x8 square part at `(x, y)`.
pub fn square(blob: usize, x: u16, y: u16) -> PartDef {
    PartDef {
        blob,
        attr0: y,
        attr1: x,
        tile_count: 1,
    }
}

/// Packed 4bpp data for tiles filled with one index each.
pub fn solid_tiles(indices: &[u8]) -> Vec<u8> {
    let tiles: Vec<Tile> = indices.iter().map(|&i| Tile([i; 64])).collect();
    encode_tiles(&tiles, BitDepth::Bpp4).unwrap()
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_pairs(out: &mut Vec<u8>, pairs: &[(u32, u32)]) {
    push_u16(out, 2);
    push_u16(out, 4 + 8 * pairs.len() as u16);
    for &(a, b) in pairs {
        push_u32(out, a);
        push_u32(out, b);
    }
}

/// Lay out a BAC: header, mappings, frames, assembly, palettes, info, data.
pub fn build_bac(frames: &[FrameDef], blobs: &[Vec<u8>]) -> Vec<u8> {
    let mut data = vec![0u8; 4];
    let mut blob_offsets = Vec::new();
    for blob in blobs {
        blob_offsets.push(data.len() as u32);
        data.extend(lz77::compress(blob).unwrap());
    }
    let data_size = data.len() as u32;
    data[..4].copy_from_slice(&data_size.to_le_bytes());

    let mut palettes = vec![0u8; 4];
    let mut assembly = Vec::new();
    let mut frame_blocks = Vec::new();
    let mut mappings = Vec::new();
    push_u32(&mut mappings, 4 + 8 * frames.len() as u32);

    for frame in frames {
        let palette_at = palettes.len() as u32;
        let raw: Vec<u8> = frame.palette.iter().flat_map(|c| c.to_le_bytes()).collect();
        let block = write_raw(&raw).unwrap();
        palettes.extend_from_slice(&block);

        let assembly_at = assembly.len() as u32;
        push_u32(&mut assembly, frame.parts.len() as u32);
        for v in frame.bounds {
            push_u16(&mut assembly, v as u16);
        }
        push_u16(&mut assembly, 0);
        push_u16(&mut assembly, 0);
        for part in &frame.parts {
            for attr in [part.attr0, part.attr1, 0, 0] {
                push_u16(&mut assembly, attr);
            }
        }

        push_u32(&mut mappings, frame_blocks.len() as u32);
        push_u32(&mut mappings, 0);

        let pairs: Vec<(u32, u32)> = frame
            .parts
            .iter()
            .map(|p| (blob_offsets[p.blob], p.tile_count))
            .collect();
        push_u16(&mut frame_blocks, 1);
        push_u16(&mut frame_blocks, 8);
        push_u32(&mut frame_blocks, assembly_at);
        push_pairs(&mut frame_blocks, &pairs);
        push_u16(&mut frame_blocks, 3);
        push_u16(&mut frame_blocks, 12);
        push_u32(&mut frame_blocks, palette_at);
        push_u32(&mut frame_blocks, block.len() as u32);
        match frame.repeat {
            Repeat::None => {}
            Repeat::Same => push_pairs(&mut frame_blocks, &pairs),
            Repeat::Different => {
                let mut changed = pairs.clone();
                changed[0].1 += 1;
                push_pairs(&mut frame_blocks, &changed);
            }
        }
        if frame.extra_block {
            push_u16(&mut frame_blocks, 9);
            push_u16(&mut frame_blocks, 8);
            push_u32(&mut frame_blocks, 0xAAAA_AAAA);
        }
        push_u16(&mut frame_blocks, 4);
        push_u16(&mut frame_blocks, 4);
    }
    let palettes_size = palettes.len() as u32;
    palettes[..4].copy_from_slice(&palettes_size.to_le_bytes());

    let mut info = Vec::new();
    push_u32(&mut info, 8 + 20 + 20 * frames.len() as u32);
    push_u16(&mut info, frames.len() as u16);
    push_u16(&mut info, 20);
    info.extend_from_slice(&[0; 20]);
    for i in 0..frames.len() {
        info.extend_from_slice(&[i as u8; 20]);
    }

    let mappings_offset = 0x1C;
    let frames_offset = mappings_offset + mappings.len();
    let assembly_offset = frames_offset + frame_blocks.len();
    let palette_offset = assembly_offset + assembly.len();
    let info_offset = palette_offset + palettes.len();
    let data_offset = info_offset + info.len();

    let mut out = vec![0x0A, 0, 0, 0];
    for offset in [
        mappings_offset,
        frames_offset,
        assembly_offset,
        palette_offset,
        data_offset,
        info_offset,
    ] {
        push_u32(&mut out, offset as u32);
    }
    out.extend(mappings);
    out.extend(frame_blocks);
    out.extend(assembly);
    out.extend(palettes);
    out.extend(info);
    out.extend(data);
    out
}
