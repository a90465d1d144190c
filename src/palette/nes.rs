//! # NES 2C02 Colours
//!
//! The NES picks every background/sprite colour from a fixed 64 entry
//! master palette. Sub-palettes are written as four hex codes such as
//! `0F,00,1A,20`.

use image::Rgba;

use super::Palette;
use crate::error::{Error, Result};

/// Black, used for codes outside the table
pub const NES_FALLBACK: u8 = 0x0F;

pub const NES_2C02: [[u8; 3]; 64] = [
    [0x62, 0x62, 0x62], [0x00, 0x1F, 0xB2], [0x24, 0x04, 0xC8], [0x52, 0x00, 0xB2],
    [0x73, 0x00, 0x76], [0x80, 0x00, 0x24], [0x73, 0x0B, 0x00], [0x52, 0x28, 0x00],
    [0x24, 0x44, 0x00], [0x00, 0x57, 0x00], [0x00, 0x5C, 0x00], [0x00, 0x53, 0x24],
    [0x00, 0x3C, 0x76], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xAB, 0xAB, 0xAB], [0x0D, 0x57, 0xFF], [0x4B, 0x30, 0xFF], [0x8A, 0x13, 0xFF],
    [0xBC, 0x08, 0xD6], [0xD2, 0x12, 0x69], [0xC7, 0x2E, 0x00], [0x9D, 0x54, 0x00],
    [0x60, 0x7B, 0x00], [0x20, 0x98, 0x00], [0x00, 0xA3, 0x00], [0x00, 0x99, 0x42],
    [0x00, 0x7D, 0xB4], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xFF, 0xFF, 0xFF], [0x53, 0xAE, 0xFF], [0x90, 0x85, 0xFF], [0xD3, 0x65, 0xFF],
    [0xFF, 0x57, 0xFF], [0xFF, 0x5D, 0xCF], [0xFF, 0x77, 0x57], [0xFA, 0x9E, 0x00],
    [0xBD, 0xC7, 0x00], [0x7A, 0xE7, 0x00], [0x43, 0xF6, 0x11], [0x26, 0xEF, 0x7E],
    [0x2C, 0xD5, 0xF6], [0x4E, 0x4E, 0x4E], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xFF, 0xFF, 0xFF], [0xB6, 0xE1, 0xFF], [0xCE, 0xD1, 0xFF], [0xE9, 0xC3, 0xFF],
    [0xFF, 0xBC, 0xFF], [0xFF, 0xBD, 0xF4], [0xFF, 0xC6, 0xC3], [0xFF, 0xD5, 0x9A],
    [0xE9, 0xE6, 0x81], [0xCE, 0xF4, 0x81], [0xB6, 0xFB, 0x9A], [0xA9, 0xFA, 0xC3],
    [0xA9, 0xF0, 0xF4], [0xB8, 0xB8, 0xB8], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
];

pub fn nes_colour(code: u8) -> Rgba<u8> {
    let [r, g, b] = NES_2C02
        .get(code as usize)
        .copied()
        .unwrap_or(NES_2C02[NES_FALLBACK as usize]);
    Rgba([r, g, b, 0xFF])
}

/// Builds a 4 colour palette from NES colour codes (`$` prefix allowed).
/// Codes that don't parse or fall outside the table become `0F`.
pub fn nes_palette<S: AsRef<str>>(codes: &[S]) -> Result<Palette> {
    if codes.len() < 4 {
        return Err(Error::Palette("Too few colours".to_string()));
    }
    if codes.len() > 4 {
        return Err(Error::Palette("Too many colours".to_string()));
    }

    let colours = codes
        .iter()
        .map(|code| {
            let code = code.as_ref().trim().trim_start_matches('$');
            let value = u8::from_str_radix(code, 16).unwrap_or(NES_FALLBACK);
            nes_colour(value)
        })
        .collect();

    Palette::new(colours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_codes() {
        let pal = nes_palette(&["0F", "$00", "1a", "20"]).unwrap();
        assert_eq!(pal.len(), 4);
        assert_eq!(pal.colour(0), Rgba([0, 0, 0, 0xFF]));
        assert_eq!(pal.colour(1), Rgba([0x62, 0x62, 0x62, 0xFF]));
        assert_eq!(pal.colour(2), Rgba([0x00, 0xA3, 0x00, 0xFF]));
        assert_eq!(pal.colour(3), Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn unknown_codes_fall_back_to_black() {
        let pal = nes_palette(&["zz", "40", "FF", "30"]).unwrap();
        assert_eq!(pal.colour(0), nes_colour(NES_FALLBACK));
        assert_eq!(pal.colour(1), nes_colour(NES_FALLBACK));
        assert_eq!(pal.colour(2), nes_colour(NES_FALLBACK));
    }

    #[test]
    fn exactly_four_codes() {
        assert!(matches!(nes_palette(&["0F", "00", "10"]), Err(Error::Palette(_))));
        assert!(matches!(
            nes_palette(&["0F", "00", "10", "20", "30"]),
            Err(Error::Palette(_))
        ));
    }
}
