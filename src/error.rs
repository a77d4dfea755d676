//! Library-wide error, warning and result types.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used throughout rushkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All fatal errors the library can produce.
///
/// A fatal error aborts processing of the container it came from. Callers
/// working through a batch of files skip the failing one and carry on.
#[derive(Debug, Error)]
pub enum Error {
    /// A magic/signature field did not match the expected value.
    #[error("bad magic value")]
    BadMagic,
    /// The buffer ended before all expected bytes could be read.
    #[error("unexpected end of data")]
    UnexpectedEof,
    /// An offset or size field would read outside the valid region.
    #[error("invalid offset or size")]
    InvalidRange,
    /// A structural constraint of the container was violated.
    #[error("format error: {0}")]
    Format(String),
    /// A compressed block declared a type byte other than raw or LZ77.
    #[error("unknown compression type {0:#04x}")]
    UnsupportedCompression(u8),
    /// An LZ77 header declared a method nibble other than 1.
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u8),
    /// An LZ77 back-reference pointed before the start of the output.
    #[error("back-reference at output byte {position} reaches {distance} bytes back")]
    BadBackReference { position: usize, distance: usize },
    /// A 4bpp tile contained a palette index that does not fit in a nibble.
    #[error("palette index {0} does not fit in 4 bits")]
    TileEncoding(u8),
    /// A replacement image used a colour missing from the frame palette.
    #[error("frame {frame}: no matching color {color:?} in frame palette")]
    PaletteMatch { frame: usize, color: [u8; 3] },
    /// A re-tiled part produced a different tile count than the original.
    #[error("frame {frame}, part {part}: new tile count {actual} differs from {expected}")]
    TileCountMismatch {
        frame: usize,
        part: usize,
        expected: u32,
        actual: u32,
    },
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::UnexpectedEof,
            _ => Error::Io(e),
        }
    }
}

/// Recoverable conditions noticed while reading or rewriting a container.
///
/// Containers log every warning with [`log::warn!`] as it happens and also
/// keep them so callers can inspect them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A repeated image-parts sub-block disagrees with the first one. The
    /// first one wins.
    StructuralMismatch { frame: usize, block_offset: usize },
    /// A frame sub-block with an unrecognised tag was skipped.
    UnknownBlock { frame: usize, id: u16 },
    /// A re-tiled part changed its tile count (permissive mode only).
    TileCountMismatch {
        frame: usize,
        part: usize,
        expected: u32,
        actual: u32,
    },
    /// A BBG color format other than 1 or 2 that is read as 8bpp.
    UnknownColorFormat(i32),
    /// A BBG whose data, mapping and palette blocks all share one offset.
    PaletteOnly,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::StructuralMismatch {
                frame,
                block_offset,
            } => write!(
                f,
                "frame {frame}: image parts at {block_offset:#x} differ from the first set, ignoring"
            ),
            Warning::UnknownBlock { frame, id } => {
                write!(f, "frame {frame}: skipping unknown block {id}")
            }
            Warning::TileCountMismatch {
                frame,
                part,
                expected,
                actual,
            } => write!(
                f,
                "frame {frame}, part {part}: new tile count {actual} differs from {expected}, be careful"
            ),
            Warning::UnknownColorFormat(v) => {
                write!(f, "unknown color format {v}, assuming 8 bpp")
            }
            Warning::PaletteOnly => write!(f, "palette only data detected"),
        }
    }
}

/// Log `warning` and append it to `sink`.
pub(crate) fn report(sink: &mut Vec<Warning>, warning: Warning) {
    log::warn!("{warning}");
    sink.push(warning);
}
