//! # Tiled Images
//!
//! A flat, row-major list of characters covering a rectangular pixel area.
//! This is the surface used for plain CHR <-> image conversion.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use super::{output, CharSize, Surface, TileMetadata};
use crate::chr::{BitDepth, Tile, TILE_DIM};
use crate::error::{Error, Result};
use crate::palette::Palette;
use crate::raster::Raster;

/// Tiles per row when laying out a loose tile list
pub const ROW_TILES: usize = 16;

#[derive(Clone, Debug)]
pub struct TiledImage {
    units: Vec<TileMetadata>,
    char_size: CharSize,
    palette: Rc<Palette>,
    depth: BitDepth,
    width: u32,
    height: u32,
}

/// Result of tile deduplication
#[derive(Debug)]
pub struct UniqueTiles {
    pub tiles: Vec<Tile>,
    /// `ids[n]` is the position in `tiles` of the image's n-th tile
    pub ids: Vec<usize>,
}

impl TiledImage {
    /// Blank image of `width` x `height` pixels.
    ///
    /// Everything is validated before any tile is allocated.
    pub fn new(
        width: u32,
        height: u32,
        char_size: CharSize,
        depth: BitDepth,
        palette: Rc<Palette>,
    ) -> Result<Self> {
        palette.validate_for(depth)?;

        let (char_w, char_h) = char_size.xy();
        if width % char_w != 0 {
            return Err(Error::DimensionMismatch {
                axis: "width",
                value: width,
                multiple: char_w,
            });
        }
        if height % char_h != 0 {
            return Err(Error::DimensionMismatch {
                axis: "height",
                value: height,
                multiple: char_h,
            });
        }

        let count = (width / char_w) as usize * (height / char_h) as usize;
        let units = (0..count)
            .map(|_| TileMetadata::new(char_size, depth, Rc::clone(&palette)))
            .collect::<Result<Vec<_>>>()?;

        Ok(TiledImage {
            units,
            char_size,
            palette,
            depth,
            width,
            height,
        })
    }

    /// Lays out loose 8x8 tiles sixteen to a row.
    ///
    /// The list is padded with blank tiles up to the next multiple of
    /// `ROW_TILES`. Every tile is rebound to `palette`.
    pub fn from_tiles(depth: BitDepth, palette: Rc<Palette>, tiles: Vec<Tile>) -> Result<Self> {
        palette.validate_for(depth)?;

        let padding = (ROW_TILES - tiles.len() % ROW_TILES) % ROW_TILES;
        let mut units = Vec::with_capacity(tiles.len() + padding);
        for mut tile in tiles {
            tile.set_palette(Rc::clone(&palette));
            units.push(TileMetadata::from_tile(tile));
        }
        for _ in 0..padding {
            units.push(TileMetadata::from_tile(Tile::new(depth, Rc::clone(&palette))?));
        }

        let rows = units.len() / ROW_TILES;
        debug!("Laid out {} tiles ({} padding) in {} rows", units.len(), padding, rows);

        Ok(TiledImage {
            units,
            char_size: CharSize::Size8x8,
            palette,
            depth,
            width: (ROW_TILES * TILE_DIM) as u32,
            height: (rows * TILE_DIM) as u32,
        })
    }

    /// Converts a decoded raster.
    ///
    /// Indexed rasters keep their indices, folded modulo the colour count
    /// below 8bpp so a wider source palette wraps around instead of failing.
    /// Other rasters are matched colour by colour against `palette`.
    pub fn from_raster(
        char_size: CharSize,
        depth: BitDepth,
        palette: Rc<Palette>,
        raster: &Raster,
    ) -> Result<Self> {
        let (width, height) = raster.dimensions();
        let mut image = TiledImage::new(width, height, char_size, depth, palette)?;

        match raster {
            Raster::Indexed(indexed) => {
                debug!("Importing paletted {}x{} image", width, height);
                let colours = depth.number_colors()?;
                for y in 0..height {
                    for x in 0..width {
                        let index = indexed.index_at(x, y);
                        let index = if depth == BitDepth::Bpp8 {
                            index
                        } else {
                            (index as usize % colours) as u8
                        };
                        image.set_color_index(x, y, index);
                    }
                }
            }
            Raster::Rgba(rgba) => {
                debug!("Importing RGB {}x{} image", width, height);
                for (x, y, pixel) in rgba.enumerate_pixels() {
                    image.set(x, y, *pixel);
                }
            }
        }

        Ok(image)
    }

    pub fn char_size(&self) -> CharSize {
        self.char_size
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn units(&self) -> &[TileMetadata] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [TileMetadata] {
        &mut self.units
    }

    /// Characters per row
    pub fn stride(&self) -> usize {
        (self.width / self.char_size.xy().0) as usize
    }

    /// Every 8x8 tile, character by character
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.units.iter().flat_map(|unit| unit.tiles().iter())
    }

    /// Unit index and coordinate inside that unit for a pixel
    pub fn locate(&self, x: u32, y: u32) -> Option<(usize, u32, u32)> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let (char_w, char_h) = self.char_size.xy();
        let row = (y / char_h) as usize;
        let col = (x / char_w) as usize;
        let index = row * self.stride() + col;
        Some((index, x % char_w, y % char_h))
    }

    pub fn write_bin<W: Write>(&self, writer: &mut W) -> Result<()> {
        output::write_bin(writer, self.tiles())
    }

    pub fn write_asm<W: Write>(&self, writer: &mut W) -> Result<()> {
        output::write_asm(writer, self.tiles())
    }

    /// Collapses identical tiles.
    ///
    /// Candidates are found by hash and confirmed by comparing pixels, so a
    /// hash collision never merges two different tiles.
    pub fn unique_tiles(&self) -> UniqueTiles {
        let mut seen: HashMap<u64, usize> = HashMap::new();
        let mut tiles: Vec<Tile> = Vec::new();
        let mut ids = Vec::new();

        for tile in self.tiles() {
            let hash = tile.hash();
            let id = match seen.entry(hash) {
                Entry::Occupied(entry) => {
                    let candidate = *entry.get();
                    if tiles[candidate] == *tile {
                        candidate
                    } else {
                        let id = tiles.len();
                        tiles.push(tile.clone());
                        seen.insert(hash, id);
                        id
                    }
                }
                Entry::Vacant(entry) => {
                    let id = tiles.len();
                    tiles.push(tile.clone());
                    entry.insert(id);
                    id
                }
            };
            ids.push(id);
        }

        debug!(
            "Deduplication result: {} unique tiles (reduced from {})",
            tiles.len(),
            ids.len()
        );
        UniqueTiles { tiles, ids }
    }

    pub fn without_empty_tiles(&self) -> Vec<Tile> {
        self.tiles().filter(|t| !t.is_empty()).cloned().collect()
    }
}

impl Surface for TiledImage {
    fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn palette(&self) -> &Palette {
        &self.palette
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
}
