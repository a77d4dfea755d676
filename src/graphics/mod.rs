//! Tile and palette codecs plus the indexed raster they decode into.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`palette`] | BGR555 palette entries to and from RGB888 |
//! | [`tile`]    | 4bpp/8bpp packed 8x8 tiles to and from palette indices |
//! | [`image`]   | [`IndexedImage`], the raster containers compose into |
//!
//! Decoding runs `compression` -> [`tile::decode_tiles`] ->
//! [`IndexedImage::from_tiles`]; encoding runs the other way round.

pub mod image;
pub mod palette;
pub mod tile;

pub use image::IndexedImage;
pub use palette::{Palette, Rgb, decode_palette, encode_palette};
pub use tile::{BitDepth, Tile, Transform, decode_tiles, encode_tiles, encode_tiles_masked};
