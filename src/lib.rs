//! Conversion between planar CHR tile data and ordinary raster images.
//!
//! [`chr`] decodes and encodes the bit-planes, [`graphics`] arranges tiles
//! into larger surfaces, [`raster`] handles image files and [`extract`] pulls
//! described runs of tiles out of a ROM.

pub mod binary_utils;
pub mod chr;
pub mod error;
pub mod extract;
pub mod graphics;
pub mod palette;
pub mod raster;

pub use error::{Error, Result};
