//! One character of a tiled image or tilemap.
//!
//! An 8x8 character is a single tile, 16x8 is two side by side, 16x16 is a
//! 2x2 grid and the larger sprite sizes extend the same row-major grid.

use std::rc::Rc;

use super::{CharSize, Surface};
use crate::chr::{BitDepth, Tile, TILE_DIM};
use crate::error::Result;
use crate::palette::Palette;

#[derive(Clone, Debug)]
pub struct TileMetadata {
    tiles: Vec<Tile>,
    char_size: CharSize,

    /// Stored for the hardware attribute bytes; pixel reads ignore them.
    pub flip_horizontal: bool,
    pub flip_vertical: bool,

    /// Which of the owning surface's palettes this character uses
    pub palette_idx: usize,
}

impl TileMetadata {
    pub fn new(char_size: CharSize, depth: BitDepth, palette: Rc<Palette>) -> Result<Self> {
        let tiles = (0..char_size.tile_count())
            .map(|_| Tile::new(depth, Rc::clone(&palette)))
            .collect::<Result<Vec<_>>>()?;

        Ok(TileMetadata {
            tiles,
            char_size,
            flip_horizontal: false,
            flip_vertical: false,
            palette_idx: 0,
        })
    }

    /// Wraps a single tile as an 8x8 character
    pub fn from_tile(tile: Tile) -> Self {
        TileMetadata {
            tiles: vec![tile],
            char_size: CharSize::Size8x8,
            flip_horizontal: false,
            flip_vertical: false,
            palette_idx: 0,
        }
    }

    pub fn char_size(&self) -> CharSize {
        self.char_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Child tile index and the coordinate inside it
    fn locate(&self, x: u32, y: u32) -> Option<(usize, u32, u32)> {
        let (width, height) = self.char_size.xy();
        if x >= width || y >= height {
            return None;
        }

        let (tiles_wide, _) = self.char_size.tiles();
        let dim = TILE_DIM as u32;
        let row = (y / dim) as usize;
        let col = (x / dim) as usize;
        Some((row * tiles_wide + col, x % dim, y % dim))
    }
}

impl Surface for TileMetadata {
    fn bounds(&self) -> (u32, u32) {
        self.char_size.xy()
    }

    fn palette(&self) -> &Palette {
        self.tiles[0].palette()
    }

    fn color_index_at(&self, x: u32, y: u32) -> u8 {
        match self.locate(x, y) {
            Some((i, tx, ty)) => self.tiles[i].color_index_at(tx, ty),
            None => 0,
        }
    }

    fn set_color_index(&mut self, x: u32, y: u32, index: u8) {
        if let Some((i, tx, ty)) = self.locate(x, y) {
            self.tiles[i].set_color_index(tx, ty, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Rc<Palette> {
        Rc::new(BitDepth::Bpp2.default_palette().unwrap())
    }

    #[test]
    fn square_character_has_four_children() {
        let mut md = TileMetadata::new(CharSize::Size16x16, BitDepth::Bpp2, palette()).unwrap();
        assert_eq!(md.tiles().len(), 4);
        assert_eq!(md.bounds(), (16, 16));

        md.set_color_index(9, 3, 1);
        md.set_color_index(2, 12, 2);
        md.set_color_index(15, 15, 3);

        assert_eq!(md.tiles()[1].color_index_at(1, 3), 1);
        assert_eq!(md.tiles()[2].color_index_at(2, 4), 2);
        assert_eq!(md.tiles()[3].color_index_at(7, 7), 3);
        assert_eq!(md.color_index_at(15, 15), 3);
    }

    #[test]
    fn wide_character_only_splits_columns() {
        let mut md = TileMetadata::new(CharSize::Size16x8, BitDepth::Bpp2, palette()).unwrap();
        assert_eq!(md.tiles().len(), 2);

        md.set_color_index(12, 5, 2);
        assert_eq!(md.tiles()[1].color_index_at(4, 5), 2);
        assert_eq!(md.tiles()[0].color_index_at(4, 5), 0);

        // Below the single row is out of bounds
        md.set_color_index(0, 8, 3);
        assert_eq!(md.color_index_at(0, 8), 0);
    }

    #[test]
    fn flip_flags_do_not_change_reads() {
        let mut md = TileMetadata::new(CharSize::Size8x8, BitDepth::Bpp2, palette()).unwrap();
        md.set_color_index(0, 0, 3);
        md.flip_horizontal = true;
        md.flip_vertical = true;
        assert_eq!(md.color_index_at(0, 0), 3);
        assert_eq!(md.color_index_at(7, 7), 0);
    }
}
