//! **rushkit** - a codec library for Nintendo DS sprite and background
//! containers.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::bac`] | BAC - multi-frame sprite animation |
//! | [`formats::bbg`] | BBG - tiled background image |
//! | [`formats::bb`]  | BB - archive of BBG images |
//!
//! # Codecs
//! | Module | Purpose |
//! |--------|---------|
//! | [`compression`]       | Block headers, raw blocks and the LZ77 (type `0x10`) codec |
//! | [`graphics::palette`] | BGR555 palettes |
//! | [`graphics::tile`]    | 4bpp/8bpp 8x8 tiles |
//! | [`graphics::image`]   | Indexed raster the containers compose into |
//!
//! The library reports through the [`log`] facade and never installs a
//! logger itself.

pub mod compression;
pub mod error;
pub mod formats;
pub mod graphics;
mod utils;

pub use error::{Error, Result, Warning};
