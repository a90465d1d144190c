use std::fmt;
use std::str::FromStr;

use crate::chr::TILE_DIM;
use crate::error::{Error, Result};

/// Size of one addressable character.
///
/// Hardware tiles are always 8x8; larger characters are built from a grid of
/// them. Nametables accept 8x8, 16x16 and 16x8, sprites every size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CharSize {
    #[default]
    Size8x8,
    Size16x16,
    Size16x8,
    Size32x32,
    Size64x64,
    Size16x32,
    Size32x64,
}

impl CharSize {
    pub const ALL: [CharSize; 7] = [
        CharSize::Size8x8,
        CharSize::Size16x16,
        CharSize::Size16x8,
        CharSize::Size32x32,
        CharSize::Size64x64,
        CharSize::Size16x32,
        CharSize::Size32x64,
    ];

    /// Width and height in pixels
    pub fn xy(self) -> (u32, u32) {
        match self {
            CharSize::Size8x8 => (8, 8),
            CharSize::Size16x16 => (16, 16),
            CharSize::Size16x8 => (16, 8),
            CharSize::Size32x32 => (32, 32),
            CharSize::Size64x64 => (64, 64),
            CharSize::Size16x32 => (16, 32),
            CharSize::Size32x64 => (32, 64),
        }
    }

    /// Width and height in 8x8 tiles
    pub fn tiles(self) -> (usize, usize) {
        let (w, h) = self.xy();
        (w as usize / TILE_DIM, h as usize / TILE_DIM)
    }

    pub fn tile_count(self) -> usize {
        let (w, h) = self.tiles();
        w * h
    }

    pub fn is_nametable_size(self) -> bool {
        matches!(
            self,
            CharSize::Size8x8 | CharSize::Size16x16 | CharSize::Size16x8
        )
    }
}

impl FromStr for CharSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        CharSize::ALL
            .into_iter()
            .find(|cs| cs.to_string() == wanted)
            .ok_or_else(|| Error::UnsupportedCharSize(s.to_string()))
    }
}

impl fmt::Display for CharSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.xy();
        write!(f, "{}x{}", w, h)
    }
}
