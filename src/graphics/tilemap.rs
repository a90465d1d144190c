//! # Tilemaps
//!
//! A fixed 32x32 grid of characters with up to eight palettes, matching a
//! single background layer of the picture processor.

use std::io::Write;
use std::rc::Rc;

use image::Rgba;
use log::debug;

use super::{output, CharSize, Surface, TileMetadata};
use crate::chr::{BitDepth, Tile};
use crate::error::{Error, Result};
use crate::palette::Palette;
use crate::raster::Raster;

/// Characters per row and per column
pub const TILEMAP_DIM: usize = 32;
pub const MAX_PALETTES: usize = 8;

#[derive(Clone, Debug)]
pub struct Tilemap {
    units: Vec<TileMetadata>,
    char_size: CharSize,
    palettes: Vec<Rc<Palette>>,
}

impl Tilemap {
    pub fn validate(char_size: CharSize, depth: BitDepth, palettes: &[Rc<Palette>]) -> Result<()> {
        if !char_size.is_nametable_size() {
            return Err(Error::UnsupportedCharSize(char_size.to_string()));
        }
        if palettes.is_empty() || palettes.len() > MAX_PALETTES {
            return Err(Error::PaletteCount(palettes.len()));
        }

        depth.number_colors()?;
        for palette in palettes {
            palette.validate_for(depth)?;
        }

        Ok(())
    }

    /// Blank tilemap, every character using the first palette
    pub fn new(char_size: CharSize, depth: BitDepth, palettes: Vec<Rc<Palette>>) -> Result<Self> {
        Tilemap::validate(char_size, depth, &palettes)?;

        let units = (0..TILEMAP_DIM * TILEMAP_DIM)
            .map(|_| TileMetadata::new(char_size, depth, Rc::clone(&palettes[0])))
            .collect::<Result<Vec<_>>>()?;

        Ok(Tilemap {
            units,
            char_size,
            palettes,
        })
    }

    /// Copies a raster into the tilemap by colour. Anything the raster does
    /// not cover stays at the background index.
    pub fn from_raster(
        char_size: CharSize,
        depth: BitDepth,
        palettes: Vec<Rc<Palette>>,
        raster: &Raster,
    ) -> Result<Self> {
        let mut tilemap = Tilemap::new(char_size, depth, palettes)?;

        let (width, height) = tilemap.bounds();
        let (raster_w, raster_h) = raster.dimensions();
        if raster_w > width || raster_h > height {
            debug!(
                "Raster is {}x{}, only the top left {}x{} fits the tilemap",
                raster_w, raster_h, width, height
            );
        }

        for y in 0..height.min(raster_h) {
            for x in 0..width.min(raster_w) {
                tilemap.set(x, y, raster.colour_at(x, y));
            }
        }

        Ok(tilemap)
    }

    pub fn char_size(&self) -> CharSize {
        self.char_size
    }

    pub fn palettes(&self) -> &[Rc<Palette>] {
        &self.palettes
    }

    pub fn units(&self) -> &[TileMetadata] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [TileMetadata] {
        &mut self.units
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.units.iter().flat_map(|unit| unit.tiles().iter())
    }

    pub fn write_bin<W: Write>(&self, writer: &mut W) -> Result<()> {
        output::write_bin(writer, self.tiles())
    }

    pub fn write_asm<W: Write>(&self, writer: &mut W) -> Result<()> {
        output::write_asm(writer, self.tiles())
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u32, u32)> {
        let (width, height) = self.bounds();
        if x >= width || y >= height {
            return None;
        }

        let (char_w, char_h) = self.char_size.xy();
        let row = (y / char_h) as usize;
        let col = (x / char_w) as usize;
        Some((row * TILEMAP_DIM + col, x % char_w, y % char_h))
    }
}

impl Surface for Tilemap {
    fn bounds(&self) -> (u32, u32) {
        let (char_w, char_h) = self.char_size.xy();
        (
            char_w * TILEMAP_DIM as u32,
            char_h * TILEMAP_DIM as u32,
        )
    }

    fn palette(&self) -> &Palette {
        &self.palettes[0]
    }

    fn color_index_at(&self, x: u32, y: u32) -> u8 {
        match self.locate(x, y) {
            Some((i, tx, ty)) => self.units[i].color_index_at(tx, ty),
            None => 0,
        }
    }

    fn set_color_index(&mut self, x: u32, y: u32, index: u8) {
        if let Some((i, tx, ty)) = self.locate(x, y) {
            self.units[i].set_color_index(tx, ty, index);
        }
    }

    /// Resolves through the character's own palette selection
    fn at(&self, x: u32, y: u32) -> Rgba<u8> {
        let palette = self
            .locate(x, y)
            .and_then(|(i, _, _)| self.palettes.get(self.units[i].palette_idx))
            .unwrap_or(&self.palettes[0]);
        palette.colour(self.color_index_at(x, y))
    }
}
