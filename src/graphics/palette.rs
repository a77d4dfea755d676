//! BGR555 palettes.
//!
//! Each entry is a little-endian `u16`:
//! ```text
//! 0BBB BBGG GGGR RRRR
//! ```
//! Channels scale to 8 bits with `c * 255 / 31` (truncating), so 0 stays 0
//! and 31 becomes 255.

use crate::{Error, Result};

/// One RGB888 colour.
pub type Rgb = [u8; 3];

/// Ordered list of RGB888 colours, usually 16 or 256 entries.
///
/// Index 0 is the transparent colour in 4bpp sprite contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Number of complete 16-colour banks.
    pub fn bank_count(&self) -> usize {
        self.colors.len() / 16
    }

    /// Flatten to `r, g, b, r, g, b, ...`.
    pub fn to_flat(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    /// Build from `r, g, b, ...` component triples.
    ///
    /// Returns [`Error::InvalidRange`] if the length is not a multiple of 3.
    pub fn from_flat(flat: &[u8]) -> Result<Self> {
        if flat.len() % 3 != 0 {
            return Err(Error::InvalidRange);
        }
        let colors = flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self { colors })
    }

    /// Stand-in palette for backgrounds that carry no palette block.
    ///
    /// Magenta at 0, black at 240, white at 255 and blue everywhere else, so
    /// the glyph and outline slots used by in-game text stay readable.
    pub fn placeholder() -> Self {
        const BLUE: Rgb = [0, 0, 255];
        let mut colors = vec![BLUE; 256];
        colors[0] = [255, 0, 255];
        colors[240] = [0, 0, 0];
        colors[255] = [255, 255, 255];
        Self { colors }
    }
}

/// Decode consecutive BGR555 entries. A trailing odd byte is ignored.
pub fn decode_palette(bytes: &[u8]) -> Palette {
    let colors = bytes
        .chunks_exact(2)
        .map(|c| {
            let v = u16::from_le_bytes([c[0], c[1]]);
            [scale_up(v), scale_up(v >> 5), scale_up(v >> 10)]
        })
        .collect();
    Palette { colors }
}

/// Encode `palette` back to BGR555.
///
/// Uses `ceil(c * 31 / 255)` per channel, which restores the exact 5-bit
/// value for every colour [`decode_palette`] can produce.
pub fn encode_palette(palette: &Palette) -> Vec<u8> {
    let mut out = Vec::with_capacity(palette.len() * 2);
    for &[r, g, b] in &palette.colors {
        let v = scale_down(r) | scale_down(g) << 5 | scale_down(b) << 10;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

#[inline]
fn scale_up(v: u16) -> u8 {
    ((v & 0x1F) as u32 * 255 / 31) as u8
}

#[inline]
fn scale_down(c: u8) -> u16 {
    ((c as u32 * 31 + 254) / 255) as u16
}
