//! Parsers and writers for the DS sprite and background containers.
//!
//! Containers are held fully in memory. Each `parse` takes the complete
//! file bytes, and every offset in a container is resolved against that
//! buffer. Compressed blocks go through [`crate::compression`] and tile
//! data through [`crate::graphics`].
//!
//! ## Format overview
//!
//! | Module  | Format | Description |
//! |---------|--------|-------------|
//! | [`bac`] | BAC    | Animated sprite; frames assembled from compressed 4bpp parts |
//! | [`bbg`] | BBG    | Tiled background; tile data, tile map and palette |
//! | [`bb`]  | BB     | Offset-table archive of BBG entries |
//!
//! Recoverable problems found while reading are collected in each
//! container's `warnings` list as [`crate::Warning`] values.

pub mod bac;
pub mod bb;
pub mod bbg;
