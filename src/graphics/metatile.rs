//! # Metatiles
//!
//! A metatile is a `width` x `height` block of 8x8 tiles taken from a flat
//! tile run and rearranged through a 1-based tile order. Metatiles of one
//! shape are then laid out in rows by [`MetaImage`].

use std::rc::Rc;

use super::Surface;
use crate::chr::{Tile, TILE_DIM};
use crate::error::{Error, Result};
use crate::palette::Palette;

/// Largest metatile side, in tiles
pub const MAX_METATILE_SIDE: usize = 256;

/// Pixel size of a `width` x `height` tile block.
///
/// Fails for empty blocks and for sides above `MAX_METATILE_SIDE`.
pub fn metatile_pixels(width: usize, height: usize) -> Result<(u32, u32)> {
    let side = |tiles: usize| -> Result<u32> {
        if tiles == 0 || tiles > MAX_METATILE_SIDE {
            return Err(Error::InvalidSegment(format!(
                "{}x{} tiles: each side must be 1 to {}",
                width, height, MAX_METATILE_SIDE
            )));
        }
        tiles
            .checked_mul(TILE_DIM)
            .and_then(|px| u32::try_from(px).ok())
            .ok_or_else(|| Error::InvalidSegment(format!("{}x{} tiles is too large", width, height)))
    };
    Ok((side(width)?, side(height)?))
}

/// 1-based permutation of the tiles that make up a metatile.
///
/// Repeated entries are allowed, so one source tile may appear at several
/// positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileOrder(Vec<usize>);

impl TileOrder {
    /// `1, 2, ..., count`
    pub fn sequential(count: usize) -> Self {
        TileOrder((1..=count).collect())
    }

    /// Parses a comma separated order for a `width` x `height` metatile.
    /// Empty text gives the sequential order.
    pub fn parse(text: &str, width: usize, height: usize) -> Result<Self> {
        metatile_pixels(width, height)?;
        let count = width * height;
        let text = text.trim();
        if text.is_empty() {
            return Ok(TileOrder::sequential(count));
        }

        let order = text
            .split(',')
            .map(|token| {
                token.trim().parse::<usize>().map_err(|_| {
                    Error::InvalidTileOrder(format!("{:?}: {:?} is not a number", text, token))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if order.contains(&0) {
            return Err(Error::InvalidTileOrder(format!(
                "{:?}: tile numbers start at 1",
                text
            )));
        }
        if order.len() != count {
            return Err(Error::InvalidTileOrder(format!(
                "{:?}: expected {} entries for {}x{}, got {}",
                text,
                count,
                width,
                height,
                order.len()
            )));
        }
        let highest = order.iter().copied().max().unwrap_or(0);
        if highest != order.len() {
            return Err(Error::InvalidTileOrder(format!(
                "{:?}: highest entry {} does not match length {}",
                text,
                highest,
                order.len()
            )));
        }

        Ok(TileOrder(order))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

#[derive(Clone, Debug)]
pub struct MetaTile {
    /// Already in display order
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
    pixels: (u32, u32),
    palette: Rc<Palette>,
}

impl MetaTile {
    /// Places `tiles[order[k] - 1]` at grid position `k`.
    pub fn new(
        tiles: &[Tile],
        width: usize,
        height: usize,
        order: &TileOrder,
        palette: Rc<Palette>,
    ) -> Result<Self> {
        let pixels = metatile_pixels(width, height)?;
        if order.len() != width * height {
            return Err(Error::InvalidTileOrder(format!(
                "{} entries for a {}x{} metatile",
                order.len(),
                width,
                height
            )));
        }

        let ordered = order
            .as_slice()
            .iter()
            .map(|&id| {
                tiles.get(id - 1).cloned().ok_or_else(|| {
                    Error::InvalidTileOrder(format!(
                        "tile {} requested but only {} available",
                        id,
                        tiles.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MetaTile {
            tiles: ordered,
            width,
            height,
            pixels,
            palette,
        })
    }

    /// Width and height in tiles
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u32, u32)> {
        let (width, height) = self.bounds();
        if x >= width || y >= height {
            return None;
        }

        let dim = TILE_DIM as u32;
        let row = (y / dim) as usize;
        let col = (x / dim) as usize;
        Some((row * self.width + col, x % dim, y % dim))
    }
}

impl Surface for MetaTile {
    fn bounds(&self) -> (u32, u32) {
        self.pixels
    }

    fn palette(&self) -> &Palette {
        &self.palette
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

/// Rows of same-shaped metatiles, `stride` to a row.
#[derive(Clone, Debug)]
pub struct MetaImage {
    units: Vec<MetaTile>,
    unit_width: usize,
    unit_height: usize,
    /// One metatile in pixels
    unit_pixels: (u32, u32),
    stride: usize,
    palette: Rc<Palette>,
}

impl MetaImage {
    /// `unit_width` and `unit_height` are in tiles. The full row of
    /// `stride` metatiles has to fit a `u32` pixel width.
    pub fn new(
        unit_width: usize,
        unit_height: usize,
        stride: usize,
        palette: Rc<Palette>,
    ) -> Result<Self> {
        let unit_pixels = metatile_pixels(unit_width, unit_height)?;
        let stride = stride.max(1);
        u32::try_from(stride)
            .ok()
            .and_then(|s| unit_pixels.0.checked_mul(s))
            .ok_or_else(|| Error::InvalidSegment(format!("stride {} is too wide", stride)))?;

        Ok(MetaImage {
            units: Vec::new(),
            unit_width,
            unit_height,
            unit_pixels,
            stride,
            palette,
        })
    }

    pub fn push(&mut self, unit: MetaTile) -> Result<()> {
        if unit.dimensions() != (self.unit_width, self.unit_height) {
            let (w, h) = unit.dimensions();
            return Err(Error::InvalidSegment(format!(
                "{}x{} metatile in a {}x{} image",
                w, h, self.unit_width, self.unit_height
            )));
        }

        let rows = self.units.len() / self.stride + 1;
        u32::try_from(rows)
            .ok()
            .and_then(|r| self.unit_pixels.1.checked_mul(r))
            .ok_or_else(|| Error::InvalidSegment(format!("{} rows of metatiles is too tall", rows)))?;

        self.units.push(unit);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[MetaTile] {
        &self.units
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u32, u32)> {
        let (width, height) = self.bounds();
        let (unit_w, unit_h) = self.unit_pixels;
        if x >= width || y >= height {
            return None;
        }

        let row = (y / unit_h) as usize;
        let col = (x / unit_w) as usize;
        let index = row * self.stride + col;
        // The last row may be short
        if index >= self.units.len() {
            return None;
        }
        Some((index, x % unit_w, y % unit_h))
    }
}

impl Surface for MetaImage {
    fn bounds(&self) -> (u32, u32) {
        // Both products were checked when the image was built and grown
        let (unit_w, unit_h) = self.unit_pixels;
        let rows = (self.units.len() + self.stride - 1) / self.stride;
        (unit_w * self.stride as u32, unit_h * rows as u32)
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
