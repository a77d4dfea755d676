//! 8x8 character tiles.
//!
//! 4bpp tiles take 32 bytes, low nibble first:
//! ```text
//! byte n = (pixel 2n+1 << 4) | pixel 2n
//! ```
//! 8bpp tiles take 64 bytes, one index per byte. Pixels run row-major.

use crate::{Error, Result};

/// Side length of a tile in pixels.
pub const TILE_SIDE: usize = 8;
/// Pixels per tile.
pub const TILE_PIXELS: usize = TILE_SIDE * TILE_SIDE;

/// Bits per pixel of packed tile data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Bpp4,
    Bpp8,
}

impl BitDepth {
    /// Packed size of one tile.
    pub fn bytes_per_tile(self) -> usize {
        match self {
            BitDepth::Bpp4 => TILE_PIXELS / 2,
            BitDepth::Bpp8 => TILE_PIXELS,
        }
    }
}

/// One of the four ways a stored tile can be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    FlipH,
    FlipV,
    Rotate180,
}

impl Transform {
    /// All transforms in the order tile matching tries them.
    pub const ALL: [Transform; 4] = [
        Transform::Identity,
        Transform::FlipH,
        Transform::FlipV,
        Transform::Rotate180,
    ];

    pub fn from_flags(flip_h: bool, flip_v: bool) -> Transform {
        match (flip_h, flip_v) {
            (false, false) => Transform::Identity,
            (true, false) => Transform::FlipH,
            (false, true) => Transform::FlipV,
            (true, true) => Transform::Rotate180,
        }
    }

    /// `(flip_h, flip_v)` map flags for this transform.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Transform::Identity => (false, false),
            Transform::FlipH => (true, false),
            Transform::FlipV => (false, true),
            Transform::Rotate180 => (true, true),
        }
    }
}

/// An 8x8 block of palette indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile(pub [u8; TILE_PIXELS]);

impl Default for Tile {
    fn default() -> Self {
        Tile([0; TILE_PIXELS])
    }
}

impl Tile {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.0[y * TILE_SIDE + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.0[y * TILE_SIDE + x] = v;
    }

    pub fn flip_horizontal(&self) -> Tile {
        let mut out = *self;
        for row in out.0.chunks_exact_mut(TILE_SIDE) {
            row.reverse();
        }
        out
    }

    pub fn flip_vertical(&self) -> Tile {
        let mut out = Tile::default();
        for (dst, src) in out
            .0
            .chunks_exact_mut(TILE_SIDE)
            .zip(self.0.chunks_exact(TILE_SIDE).rev())
        {
            dst.copy_from_slice(src);
        }
        out
    }

    pub fn rotate_180(&self) -> Tile {
        let mut out = *self;
        out.0.reverse();
        out
    }

    pub fn transformed(&self, t: Transform) -> Tile {
        match t {
            Transform::Identity => *self,
            Transform::FlipH => self.flip_horizontal(),
            Transform::FlipV => self.flip_vertical(),
            Transform::Rotate180 => self.rotate_180(),
        }
    }

    /// Add `delta` to every pixel, saturating at 255.
    pub fn offset_indices(&self, delta: u8) -> Tile {
        Tile(self.0.map(|p| p.saturating_add(delta)))
    }
}

/// Unpack tile data. Bytes past the last whole tile are ignored.
pub fn decode_tiles(bytes: &[u8], depth: BitDepth) -> Vec<Tile> {
    bytes
        .chunks_exact(depth.bytes_per_tile())
        .map(|chunk| {
            let mut tile = Tile::default();
            match depth {
                BitDepth::Bpp4 => {
                    for (i, b) in chunk.iter().enumerate() {
                        tile.0[2 * i] = b & 0x0F;
                        tile.0[2 * i + 1] = b >> 4;
                    }
                }
                BitDepth::Bpp8 => tile.0.copy_from_slice(chunk),
            }
            tile
        })
        .collect()
}

/// Pack tiles, rejecting 4bpp indices that do not fit in a nibble with
/// [`Error::TileEncoding`].
pub fn encode_tiles(tiles: &[Tile], depth: BitDepth) -> Result<Vec<u8>> {
    if depth == BitDepth::Bpp4 {
        if let Some(&bad) = tiles.iter().flat_map(|t| t.0.iter()).find(|&&p| p >= 16) {
            return Err(Error::TileEncoding(bad));
        }
    }
    Ok(encode_tiles_masked(tiles, depth))
}

/// Pack tiles keeping only the low nibble of 4bpp indices.
///
/// Multi-bank backgrounds store the bank in the tile map, so the bank part
/// of each index is dropped here.
pub fn encode_tiles_masked(tiles: &[Tile], depth: BitDepth) -> Vec<u8> {
    let mut out = Vec::with_capacity(tiles.len() * depth.bytes_per_tile());
    for tile in tiles {
        match depth {
            BitDepth::Bpp4 => out.extend(
                tile.0
                    .chunks_exact(2)
                    .map(|p| (p[1] & 0x0F) << 4 | (p[0] & 0x0F)),
            ),
            BitDepth::Bpp8 => out.extend_from_slice(&tile.0),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Tile {
        let mut t = Tile::default();
        for (i, p) in t.0.iter_mut().enumerate() {
            *p = i as u8;
        }
        t
    }

    #[test]
    fn nibble_order() {
        let tiles = decode_tiles(&[0x21; 32], BitDepth::Bpp4);
        assert_eq!(tiles.len(), 1);
        assert_eq!(&tiles[0].0[..4], &[1, 2, 1, 2]);
    }

    #[test]
    fn partial_tile_dropped() {
        assert_eq!(decode_tiles(&[0; 95], BitDepth::Bpp4).len(), 2);
        assert_eq!(decode_tiles(&[0; 63], BitDepth::Bpp8).len(), 0);
    }

    #[test]
    fn strict_rejects_wide_index() {
        let mut t = Tile::default();
        t.set(3, 3, 16);
        assert!(matches!(
            encode_tiles(&[t], BitDepth::Bpp4),
            Err(Error::TileEncoding(16))
        ));
        assert!(encode_tiles(&[t], BitDepth::Bpp8).is_ok());
    }

    #[test]
    fn masked_keeps_low_nibble() {
        let mut t = Tile::default();
        t.set(0, 0, 0x13);
        t.set(1, 0, 0x2F);
        let packed = encode_tiles_masked(&[t], BitDepth::Bpp4);
        assert_eq!(packed[0], 0xF3);
    }

    #[test]
    fn flips() {
        let t = ramp();
        assert_eq!(t.flip_horizontal().get(0, 0), 7);
        assert_eq!(t.flip_vertical().get(0, 0), 56);
        assert_eq!(t.rotate_180().get(0, 0), 63);
        assert_eq!(t.flip_horizontal().flip_vertical(), t.rotate_180());
        assert_eq!(t.transformed(Transform::Identity), t);
    }

    #[test]
    fn transform_flags() {
        assert_eq!(Transform::FlipH.flags(), (true, false));
        assert_eq!(Transform::Rotate180.flags(), (true, true));
    }
}
