//! Error type shared by the codec, the surfaces and the command line.

use std::fmt;
use std::io;

use image::ImageError;

use crate::chr::BitDepth;

/// Errors raised while converting between CHR data and raster images
#[derive(Debug)]
pub enum Error {
    /// Unrecognised bit depth token
    InvalidBitDepth(String),
    /// Depth that has no planar encoding (Direct Color)
    UnsupportedDepth(BitDepth),
    /// Feature that is declared but not implemented
    Unimplemented(String),
    /// Palette has more colours than the bit depth can address
    PaletteTooLarge { len: usize, max: usize },
    /// Palette has fewer colours than the conversion requires
    PaletteTooSmall { len: usize, required: usize },
    /// Palettes always need a background colour
    EmptyPalette,
    /// Wrong number of palettes for a tilemap
    PaletteCount(usize),
    /// Palette file could not be parsed
    Palette(String),
    /// Image dimension is not a multiple of the character size
    DimensionMismatch {
        axis: &'static str,
        value: u32,
        multiple: u32,
    },
    UnsupportedCharSize(String),
    /// Malformed 1-based tile order permutation
    InvalidTileOrder(String),
    /// Plane data passed to the tile decoder has the wrong shape
    InvalidPlanes(String),
    /// Stream ended partway through a tile
    TruncatedTile { offset: u64 },
    /// Segment descriptor is malformed
    InvalidSegment(String),
    /// Input produced no tiles to convert
    NoTiles,
    /// Image does not fit on one screen (width and height in tiles)
    ImageTooLarge { width: u32, height: u32 },
    /// More unique tiles than two pattern tables hold
    TooManyTiles(usize),
    Io(io::Error),
    Image(ImageError),
    PngDecode(png::DecodingError),
    PngEncode(png::EncodingError),
    Json(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ImageError> for Error {
    fn from(err: ImageError) -> Self {
        Error::Image(err)
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Error::PngDecode(err)
    }
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::PngEncode(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBitDepth(token) => write!(f, "Invalid bit depth value: {:?}", token),
            Error::UnsupportedDepth(depth) => write!(f, "{} is not implemented yet", depth),
            Error::Unimplemented(what) => write!(f, "Not implemented yet: {}", what),
            Error::PaletteTooLarge { len, max } => write!(
                f,
                "Palette contains too many colours: {}; max: {}",
                len, max
            ),
            Error::PaletteTooSmall { len, required } => write!(
                f,
                "Bit depth requires {} colours but palette only has {}",
                required, len
            ),
            Error::EmptyPalette => write!(f, "Palette has no colours"),
            Error::PaletteCount(count) => {
                write!(f, "Tilemaps need between 1 and 8 palettes, got {}", count)
            }
            Error::Palette(msg) => write!(f, "Palette error: {}", msg),
            Error::DimensionMismatch {
                axis,
                value,
                multiple,
            } => write!(f, "{} of {} is not a multiple of {}", axis, value, multiple),
            Error::UnsupportedCharSize(size) => write!(f, "Invalid character size: {}", size),
            Error::InvalidTileOrder(msg) => write!(f, "Invalid tile order: {}", msg),
            Error::InvalidPlanes(msg) => write!(f, "Invalid plane data: {}", msg),
            Error::TruncatedTile { offset } => write!(
                f,
                "Stream ended partway through the tile at offset 0x{:X}",
                offset
            ),
            Error::InvalidSegment(msg) => write!(f, "Invalid segment: {}", msg),
            Error::NoTiles => write!(f, "No tiles read from input"),
            Error::ImageTooLarge { width, height } => write!(
                f,
                "Image is {}x{} tiles; a screen is at most 32x30",
                width, height
            ),
            Error::TooManyTiles(count) => {
                write!(f, "Too many unique tiles: {}; max: 512", count)
            }
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Image(err) => write!(f, "Image error: {}", err),
            Error::PngDecode(err) => write!(f, "PNG decode error: {}", err),
            Error::PngEncode(err) => write!(f, "PNG encode error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Image(err) => Some(err),
            Error::PngDecode(err) => Some(err),
            Error::PngEncode(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}
