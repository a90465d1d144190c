use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::{Error, Result};
use crate::palette::Palette;

/// Number of bits used for each pixel's palette index.
///
/// 1bpp is mostly used for fonts and gets inflated to 2bpp by the ROM
/// software. Direct Color is recognised but has no planar encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Bpp1,
    #[default]
    Bpp2,
    Bpp4,
    Bpp8,
    DirectColor,
}

impl BitDepth {
    pub fn bits(self) -> Result<usize> {
        match self {
            BitDepth::Bpp1 => Ok(1),
            BitDepth::Bpp2 => Ok(2),
            BitDepth::Bpp4 => Ok(4),
            BitDepth::Bpp8 => Ok(8),
            BitDepth::DirectColor => Err(Error::UnsupportedDepth(self)),
        }
    }

    /// Bit-planes stored per tile. Always equal to `bits`.
    pub fn plane_count(self) -> Result<usize> {
        self.bits()
    }

    pub fn number_colors(self) -> Result<usize> {
        Ok(1 << self.bits()?)
    }

    pub fn bytes_per_tile(self) -> Result<usize> {
        Ok(self.plane_count()? * super::PLANE_LEN)
    }

    /// Mask that keeps an index inside the range this depth can address
    pub fn index_mask(self) -> Result<u8> {
        Ok((self.number_colors()? - 1) as u8)
    }

    /// Evenly spaced greyscale ramp with one entry per colour
    pub fn default_palette(self) -> Result<Palette> {
        let levels: Vec<u8> = match self {
            BitDepth::Bpp1 => vec![0x00, 0xFF],
            BitDepth::Bpp2 => vec![0x00, 0x55, 0xAA, 0xFF],
            BitDepth::Bpp4 => (0..16u8).map(|i| i << 4).collect(),
            BitDepth::Bpp8 => (0..=255u8).collect(),
            BitDepth::DirectColor => return Err(Error::UnsupportedDepth(self)),
        };

        Palette::new(levels.into_iter().map(|y| Rgba([y, y, y, 0xFF])).collect())
    }
}

impl FromStr for BitDepth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "1bpp" => Ok(BitDepth::Bpp1),
            "2" | "2bpp" => Ok(BitDepth::Bpp2),
            "4" | "4bpp" => Ok(BitDepth::Bpp4),
            "8" | "8bpp" => Ok(BitDepth::Bpp8),
            "d" | "direct" | "directcolor" => Ok(BitDepth::DirectColor),
            _ => Err(Error::InvalidBitDepth(s.to_string())),
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(BitDepth::Bpp1),
            2 => Ok(BitDepth::Bpp2),
            4 => Ok(BitDepth::Bpp4),
            8 => Ok(BitDepth::Bpp8),
            _ => Err(Error::InvalidBitDepth(bits.to_string())),
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitDepth::Bpp1 => write!(f, "1bpp"),
            BitDepth::Bpp2 => write!(f, "2bpp"),
            BitDepth::Bpp4 => write!(f, "4bpp"),
            BitDepth::Bpp8 => write!(f, "8bpp"),
            BitDepth::DirectColor => write!(f, "Direct Color"),
        }
    }
}
