//! # Palettes
//!
//! An ordered list of RGBA colours. Index 0 doubles as the background colour
//! returned for out of bounds reads.

pub mod nes;
pub mod parse;
pub mod snes;

use std::path::Path;

use image::Rgba;

use crate::chr::BitDepth;
use crate::error::{Error, Result};

pub use nes::nes_palette;
pub use parse::{load_palette, read_gimp_palette, read_hex_palette, read_raw_rgb_palette, PaletteFormat};
pub use snes::{write_bgr555, Bgr555};

/// Where the colours for decoded CHR come from
#[derive(Clone, Copy, Debug)]
pub enum PaletteSource<'a> {
    /// Greyscale ramp for the depth
    Default,
    File(&'a Path),
    /// Comma separated NES colour codes, 2bpp only
    Nes(&'a str),
}

/// Loads the palette for `depth`. Extra colours are dropped, missing ones
/// are an error.
pub fn select_palette(depth: BitDepth, source: PaletteSource<'_>) -> Result<Palette> {
    let palette = match source {
        PaletteSource::Default => depth.default_palette()?,
        PaletteSource::File(path) => load_palette(path)?,
        PaletteSource::Nes(codes) => {
            if depth != BitDepth::Bpp2 {
                return Err(Error::Palette(format!(
                    "NES palettes need a 2bpp image, not {}",
                    depth
                )));
            }
            let codes: Vec<&str> = codes.split(',').collect();
            nes_palette(&codes)?
        }
    };

    palette.fit_to(depth)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colours: Vec<Rgba<u8>>,
}

impl Palette {
    pub fn new(colours: Vec<Rgba<u8>>) -> Result<Self> {
        if colours.is_empty() {
            return Err(Error::EmptyPalette);
        }
        Ok(Palette { colours })
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Always false, construction rejects empty palettes and truncation
    /// never goes below two colours
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn colours(&self) -> &[Rgba<u8>] {
        &self.colours
    }

    pub fn background(&self) -> Rgba<u8> {
        self.colours[0]
    }

    /// Colour for `index`, or the background when the palette is shorter
    pub fn colour(&self, index: u8) -> Rgba<u8> {
        self.colours
            .get(index as usize)
            .copied()
            .unwrap_or_else(|| self.background())
    }

    /// Index of the closest entry by squared RGBA distance. Ties go to the
    /// lower index.
    pub fn nearest_index(&self, colour: Rgba<u8>) -> u8 {
        let mut best = 0usize;
        let mut best_distance = u32::MAX;

        for (i, entry) in self.colours.iter().take(256).enumerate() {
            let distance: u32 = entry
                .0
                .iter()
                .zip(colour.0.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum();

            if distance < best_distance {
                best = i;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }

        best as u8
    }

    /// Fails when the palette has more colours than `depth` can address
    pub fn validate_for(&self, depth: BitDepth) -> Result<()> {
        let max = depth.number_colors()?;
        if self.len() > max {
            return Err(Error::PaletteTooLarge {
                len: self.len(),
                max,
            });
        }
        Ok(())
    }

    /// Drops colours the depth cannot address
    pub fn truncated_for(mut self, depth: BitDepth) -> Result<Self> {
        let max = depth.number_colors()?;
        self.colours.truncate(max);
        Ok(self)
    }

    /// Requires at least one colour per index and drops the excess
    pub fn fit_to(self, depth: BitDepth) -> Result<Self> {
        let required = depth.number_colors()?;
        if self.len() < required {
            return Err(Error::PaletteTooSmall {
                len: self.len(),
                required,
            });
        }
        self.truncated_for(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
        Rgba([r, g, b, 0xFF])
    }

    #[test]
    fn empty_palettes_are_rejected() {
        assert!(matches!(Palette::new(vec![]), Err(Error::EmptyPalette)));

        let one = Palette::new(vec![rgb(1, 1, 1)]).unwrap();
        assert!(!one.is_empty());
        let truncated = BitDepth::Bpp8
            .default_palette()
            .unwrap()
            .truncated_for(BitDepth::Bpp1)
            .unwrap();
        assert_eq!(truncated.len(), 2);
        assert!(!truncated.is_empty());
    }

    #[test]
    fn short_palette_falls_back_to_background() {
        let pal = Palette::new(vec![rgb(1, 1, 1), rgb(2, 2, 2)]).unwrap();
        assert_eq!(pal.colour(1), rgb(2, 2, 2));
        assert_eq!(pal.colour(9), rgb(1, 1, 1));
    }

    #[test]
    fn nearest_colour_match() {
        let pal = Palette::new(vec![rgb(0, 0, 0), rgb(255, 0, 0), rgb(0, 0, 255)]).unwrap();
        assert_eq!(pal.nearest_index(rgb(200, 10, 10)), 1);
        assert_eq!(pal.nearest_index(rgb(10, 10, 180)), 2);
        assert_eq!(pal.nearest_index(rgb(0, 0, 0)), 0);
    }

    #[test]
    fn size_checks_against_depth() {
        let four = BitDepth::Bpp2.default_palette().unwrap();
        let sixteen = BitDepth::Bpp4.default_palette().unwrap();

        assert!(four.validate_for(BitDepth::Bpp2).is_ok());
        assert!(matches!(
            sixteen.validate_for(BitDepth::Bpp2),
            Err(Error::PaletteTooLarge { len: 16, max: 4 })
        ));

        let truncated = sixteen.clone().truncated_for(BitDepth::Bpp2).unwrap();
        assert_eq!(truncated.len(), 4);
        assert_eq!(truncated.colour(3), sixteen.colour(3));

        assert!(matches!(
            four.fit_to(BitDepth::Bpp4),
            Err(Error::PaletteTooSmall {
                len: 4,
                required: 16
            })
        ));
    }

    #[test]
    fn default_source_follows_depth() {
        assert_eq!(select_palette(BitDepth::Bpp1, PaletteSource::Default).unwrap().len(), 2);
        assert_eq!(select_palette(BitDepth::Bpp4, PaletteSource::Default).unwrap().len(), 16);
    }

    #[test]
    fn nes_source_is_2bpp_only() {
        let pal = select_palette(BitDepth::Bpp2, PaletteSource::Nes("0F,00,1A,20")).unwrap();
        assert_eq!(pal.colour(3), rgb(0xFF, 0xFF, 0xFF));

        for depth in [BitDepth::Bpp1, BitDepth::Bpp4, BitDepth::Bpp8] {
            assert!(matches!(
                select_palette(depth, PaletteSource::Nes("0F,00,1A,20")),
                Err(Error::Palette(_))
            ));
        }
        assert!(matches!(
            select_palette(BitDepth::Bpp2, PaletteSource::Nes("0F,00,1A")),
            Err(Error::Palette(_))
        ));
    }

    #[test]
    fn file_source_is_fitted_to_depth() {
        let path = std::env::temp_dir().join(format!("chrconv_fit_{}.pal", std::process::id()));
        let data: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, i, 0xFF - i]).collect();
        std::fs::write(&path, data).unwrap();

        let two = select_palette(BitDepth::Bpp2, PaletteSource::File(&path));
        let four = select_palette(BitDepth::Bpp4, PaletteSource::File(&path));
        let eight = select_palette(BitDepth::Bpp8, PaletteSource::File(&path));
        std::fs::remove_file(&path).unwrap();

        let two = two.unwrap();
        assert_eq!(two.len(), 4);
        assert_eq!(two.colour(3), rgb(48, 3, 0xFC));
        assert_eq!(four.unwrap().len(), 16);
        assert!(matches!(
            eight,
            Err(Error::PaletteTooSmall {
                len: 16,
                required: 256
            })
        ));
    }
}
