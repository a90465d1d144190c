use image::{ImageBuffer, Rgba, RgbaImage};

use crate::palette::Palette;

/// Pixel addressable, palette indexed image.
///
/// Tiles, metatiles, tiled images and tilemaps all implement this so raster
/// encoders only ever deal with one interface.
pub trait Surface {
    /// Width and height in pixels
    fn bounds(&self) -> (u32, u32);

    fn palette(&self) -> &Palette;

    /// Palette index at `(x, y)`, 0 when out of bounds
    fn color_index_at(&self, x: u32, y: u32) -> u8;

    /// Out of bounds writes are ignored
    fn set_color_index(&mut self, x: u32, y: u32, index: u8);

    fn at(&self, x: u32, y: u32) -> Rgba<u8> {
        self.palette().colour(self.color_index_at(x, y))
    }

    /// Stores the palette entry closest to `colour`
    fn set(&mut self, x: u32, y: u32, colour: Rgba<u8>) {
        let index = self.palette().nearest_index(colour);
        self.set_color_index(x, y, index);
    }

    fn to_rgba_image(&self) -> RgbaImage {
        let (width, height) = self.bounds();
        ImageBuffer::from_fn(width, height, |x, y| self.at(x, y))
    }

    /// Row-major palette indices covering the whole bounds
    fn to_indexed(&self) -> Vec<u8> {
        let (width, height) = self.bounds();
        let mut indices = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                indices.push(self.color_index_at(x, y));
            }
        }
        indices
    }
}
