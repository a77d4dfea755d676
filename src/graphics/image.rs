//! Minimal indexed-colour raster used at the container boundary.
//!
//! File formats for these images (PNG and friends) live outside this crate;
//! callers convert to and from their own image types through
//! [`IndexedImage::pixels`] and [`Palette::to_flat`].

use crate::graphics::palette::Palette;
use crate::graphics::tile::{TILE_SIDE, Tile};
use crate::{Error, Result};

/// Row-major 8-bit palette indices plus the palette they refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    pub palette: Palette,
    /// Index treated as transparent, if any.
    pub transparent: Option<u8>,
}

impl IndexedImage {
    /// Blank image filled with index 0 and an empty palette.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            palette: Palette::default(),
            transparent: None,
        }
    }

    /// Wrap existing pixel data.
    ///
    /// Returns [`Error::InvalidRange`] if `pixels` is not `width * height`
    /// bytes long.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::InvalidRange);
        }
        Ok(Self {
            width,
            height,
            pixels,
            palette: Palette::default(),
            transparent: None,
        })
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// # Panics
    /// Panics if `(x, y)` is outside the image.
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[y * self.width + x]
    }

    /// # Panics
    /// Panics if `(x, y)` is outside the image.
    pub fn put_pixel(&mut self, x: usize, y: usize, v: u8) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[y * self.width + x] = v;
    }

    /// Copy a `w x h` region starting at `(x, y)`. Pixels outside the source
    /// read as 0. The palette is carried over.
    pub fn crop(&self, x: usize, y: usize, w: usize, h: usize) -> IndexedImage {
        let mut out = IndexedImage::new(w, h).with_palette(self.palette.clone());
        out.transparent = self.transparent;
        let cols = w.min(self.width.saturating_sub(x));
        if cols == 0 {
            return out;
        }
        for dy in 0..h.min(self.height.saturating_sub(y)) {
            let src = (y + dy) * self.width + x;
            out.pixels[dy * w..dy * w + cols].copy_from_slice(&self.pixels[src..src + cols]);
        }
        out
    }

    /// Copy every pixel of `src` onto this image with its top-left corner at
    /// `(x, y)`, clipped to this image.
    pub fn paste(&mut self, src: &IndexedImage, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y as i64 + sy as i64;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src.width {
                let dx = x as i64 + sx as i64;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                self.pixels[dy as usize * self.width + dx as usize] =
                    src.pixels[sy * src.width + sx];
            }
        }
    }

    pub fn flip_horizontal(&self) -> IndexedImage {
        let mut out = self.clone();
        for row in out.pixels.chunks_exact_mut(self.width.max(1)) {
            row.reverse();
        }
        out
    }

    pub fn flip_vertical(&self) -> IndexedImage {
        let mut out = self.clone();
        for y in 0..self.height {
            let src = (self.height - 1 - y) * self.width;
            out.pixels[y * self.width..(y + 1) * self.width]
                .copy_from_slice(&self.pixels[src..src + self.width]);
        }
        out
    }

    pub fn rotate_180(&self) -> IndexedImage {
        let mut out = self.clone();
        out.pixels.reverse();
        out
    }

    /// The 8x8 tile whose top-left pixel is `(x, y)`, zero-filled past the
    /// edges.
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        let mut tile = Tile::default();
        for ty in 0..TILE_SIDE {
            for tx in 0..TILE_SIDE {
                if x + tx < self.width && y + ty < self.height {
                    tile.set(tx, ty, self.pixels[(y + ty) * self.width + x + tx]);
                }
            }
        }
        tile
    }

    /// Split into 8x8 tiles, left to right then top to bottom.
    pub fn to_tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::new();
        for y in (0..self.height).step_by(TILE_SIDE) {
            for x in (0..self.width).step_by(TILE_SIDE) {
                tiles.push(self.tile_at(x, y));
            }
        }
        tiles
    }

    /// Lay `tiles` out `tiles_per_row` to a row on a `width x height` canvas.
    /// Tiles falling outside the canvas are clipped.
    pub fn from_tiles(tiles: &[Tile], width: usize, height: usize, tiles_per_row: usize) -> Self {
        let mut out = IndexedImage::new(width, height);
        let per_row = tiles_per_row.max(1);
        for (i, tile) in tiles.iter().enumerate() {
            out.paste_tile(tile, (i % per_row) * TILE_SIDE, (i / per_row) * TILE_SIDE);
        }
        out
    }

    /// Draw `tile` with its top-left pixel at `(x, y)`, clipped.
    pub fn paste_tile(&mut self, tile: &Tile, x: usize, y: usize) {
        for ty in 0..TILE_SIDE {
            for tx in 0..TILE_SIDE {
                if x + tx < self.width && y + ty < self.height {
                    self.pixels[(y + ty) * self.width + x + tx] = tile.get(tx, ty);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: usize, h: usize) -> IndexedImage {
        IndexedImage::from_pixels(w, h, (0..w * h).map(|i| i as u8).collect()).unwrap()
    }

    #[test]
    fn crop_pads_with_zero() {
        let img = numbered(4, 4);
        let c = img.crop(2, 2, 3, 3);
        assert_eq!(c.pixels(), &[10, 11, 0, 14, 15, 0, 0, 0, 0]);
    }

    #[test]
    fn paste_clips() {
        let mut canvas = IndexedImage::new(3, 3);
        canvas.paste(&numbered(2, 2), 2, -1);
        assert_eq!(canvas.pixels(), &[0, 0, 2, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn flips() {
        let img = numbered(3, 2);
        assert_eq!(img.flip_horizontal().pixels(), &[2, 1, 0, 5, 4, 3]);
        assert_eq!(img.flip_vertical().pixels(), &[3, 4, 5, 0, 1, 2]);
        assert_eq!(img.rotate_180().pixels(), &[5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn tiles_roundtrip_layout() {
        let img = numbered(16, 8);
        let tiles = img.to_tiles();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].get(0, 0), 8);
        assert_eq!(IndexedImage::from_tiles(&tiles, 16, 8, 2), img);
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(IndexedImage::from_pixels(2, 2, vec![0; 3]).is_err());
    }
}
