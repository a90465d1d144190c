//! # SNES Colours
//!
//! CGRAM holds 15-bit `0bbbbbgggggrrrrr` words. Each 8-bit channel keeps
//! its top five bits.

use std::fmt;
use std::io::Write;

use image::Rgba;

use super::Palette;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bgr555(pub u16);

impl From<Rgba<u8>> for Bgr555 {
    fn from(colour: Rgba<u8>) -> Self {
        let [r, g, b, _] = colour.0;
        let (r5, g5, b5) = (u16::from(r >> 3), u16::from(g >> 3), u16::from(b >> 3));
        Bgr555(r5 | (g5 << 5) | (b5 << 10))
    }
}

impl fmt::Display for Bgr555 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:04X}", self.0)
    }
}

impl Palette {
    pub fn to_bgr555(&self) -> Vec<u16> {
        self.colours()
            .iter()
            .map(|&colour| Bgr555::from(colour).0)
            .collect()
    }
}

/// Little endian words, ready to DMA into CGRAM
pub fn write_bgr555<W: Write>(writer: &mut W, palette: &Palette) -> Result<()> {
    for word in palette.to_bgr555() {
        writer.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}
