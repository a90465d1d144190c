//! # CHR Tile Data
//!
//! Raw planar tile data as used by the NES and SNES picture processors. There
//! is no header: a stream is just tiles back to back, each made of
//! `plane_count` 8-byte bit-planes.

pub mod depth;
pub mod reader;
pub mod tile;

pub use depth::BitDepth;
pub use reader::{PartialRead, RawChr};
pub use tile::Tile;

/// Tiles are always 8x8 pixels regardless of depth
pub const TILE_DIM: usize = 8;
pub const TILE_PIXELS: usize = TILE_DIM * TILE_DIM;

/// One byte per row
pub const PLANE_LEN: usize = 8;
