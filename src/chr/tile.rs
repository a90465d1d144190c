//! # 8x8 Planar Tiles
//!
//! A tile stores one palette index per pixel. On disk each tile is a run of
//! bit-planes, 8 bytes per plane, one byte per row. Bit 7 of a row byte is
//! the leftmost pixel and plane 0 holds the least significant bit of every
//! index.

use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use image::Rgba;
use twox_hash::XxHash64;

use super::{BitDepth, PLANE_LEN, TILE_DIM, TILE_PIXELS};
use crate::error::{Error, Result};
use crate::graphics::Surface;
use crate::palette::Palette;

#[derive(Clone, Debug)]
pub struct Tile {
    pixels: [u8; TILE_PIXELS],
    depth: BitDepth,
    planes: usize,
    mask: u8,
    palette: Rc<Palette>,

    hash: Cell<u64>,
    dirty_hash: Cell<bool>,
}

impl Tile {
    /// Blank tile, every pixel set to index 0
    pub fn new(depth: BitDepth, palette: Rc<Palette>) -> Result<Self> {
        Ok(Tile {
            pixels: [0; TILE_PIXELS],
            depth,
            planes: depth.plane_count()?,
            mask: depth.index_mask()?,
            palette,
            hash: Cell::new(0),
            dirty_hash: Cell::new(true),
        })
    }

    /// Decodes one tile from its bit-planes.
    ///
    /// The depth is implied by the number of planes; every plane must be
    /// exactly 8 bytes.
    pub fn from_planes<P: AsRef<[u8]>>(planes: &[P], palette: Rc<Palette>) -> Result<Self> {
        let depth = match planes.len() {
            1 => BitDepth::Bpp1,
            2 => BitDepth::Bpp2,
            4 => BitDepth::Bpp4,
            8 => BitDepth::Bpp8,
            n => {
                return Err(Error::InvalidPlanes(format!(
                    "{} bit planes not supported",
                    n
                )))
            }
        };

        if let Some(plane) = planes.iter().find(|p| p.as_ref().len() != PLANE_LEN) {
            return Err(Error::InvalidPlanes(format!(
                "plane is {} bytes, expected {}",
                plane.as_ref().len(),
                PLANE_LEN
            )));
        }

        let mut tile = Tile::new(depth, palette)?;
        for y in 0..TILE_DIM {
            for x in 0..TILE_DIM {
                let mut index = 0u8;
                for (p, plane) in planes.iter().enumerate() {
                    let bit = (plane.as_ref()[y] >> (7 - x)) & 1;
                    index |= bit << p;
                }
                tile.pixels[y * TILE_DIM + x] = index;
            }
        }

        Ok(tile)
    }

    /// Decodes a tile from `bytes_per_tile(depth)` contiguous bytes
    pub fn decode(depth: BitDepth, data: &[u8], palette: Rc<Palette>) -> Result<Self> {
        let expected = depth.bytes_per_tile()?;
        if data.len() != expected {
            return Err(Error::InvalidPlanes(format!(
                "{} tile needs {} bytes, got {}",
                depth,
                expected,
                data.len()
            )));
        }

        let planes: Vec<&[u8]> = data.chunks_exact(PLANE_LEN).collect();
        Tile::from_planes(&planes, palette)
    }

    /// Encodes the tile as its bit-planes, lowest plane first
    pub fn to_planar(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.planes * PLANE_LEN];
        for plane in 0..self.planes {
            for row in 0..TILE_DIM {
                let mut byte = 0u8;
                for col in 0..TILE_DIM {
                    let bit = (self.pixels[row * TILE_DIM + col] >> plane) & 1;
                    byte = (byte << 1) | bit;
                }
                out[plane * PLANE_LEN + row] = byte;
            }
        }
        out
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn pixels(&self) -> &[u8; TILE_PIXELS] {
        &self.pixels
    }

    pub fn set_palette(&mut self, palette: Rc<Palette>) {
        self.palette = palette;
    }

    pub fn shared_palette(&self) -> &Rc<Palette> {
        &self.palette
    }

    /// Content fingerprint of the index data, recomputed only after a change
    pub fn hash(&self) -> u64 {
        if self.dirty_hash.get() {
            let mut hasher = XxHash64::default();
            self.pixels.hash(&mut hasher);
            self.hash.set(hasher.finish());
            self.dirty_hash.set(false);
        }
        self.hash.get()
    }

    /// Hash equality. Two different tiles can collide; callers that need
    /// certainty compare `pixels` as well.
    pub fn is_identical(&self, other: &Tile) -> bool {
        self.hash() == other.hash()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0)
    }

    fn offset(x: u32, y: u32) -> Option<usize> {
        let (x, y) = (x as usize, y as usize);
        if x < TILE_DIM && y < TILE_DIM {
            Some(y * TILE_DIM + x)
        } else {
            None
        }
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && self.pixels == other.pixels
    }
}

impl Eq for Tile {}

impl Surface for Tile {
    fn bounds(&self) -> (u32, u32) {
        (TILE_DIM as u32, TILE_DIM as u32)
    }

    fn palette(&self) -> &Palette {
        &self.palette
    }

    fn color_index_at(&self, x: u32, y: u32) -> u8 {
        Tile::offset(x, y).map_or(0, |i| self.pixels[i])
    }

    /// Out of bounds reads give the background colour
    fn at(&self, x: u32, y: u32) -> Rgba<u8> {
        match Tile::offset(x, y) {
            Some(i) => self.palette.colour(self.pixels[i]),
            None => self.palette.background(),
        }
    }

    /// Stores `index` masked to the tile's depth
    fn set_color_index(&mut self, x: u32, y: u32, index: u8) {
        if let Some(i) = Tile::offset(x, y) {
            self.pixels[i] = index & self.mask;
            self.dirty_hash.set(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(depth: BitDepth) -> Rc<Palette> {
        Rc::new(depth.default_palette().unwrap())
    }

    fn patterned(depth: BitDepth) -> Tile {
        let mut tile = Tile::new(depth, palette(depth)).unwrap();
        let colours = depth.number_colors().unwrap();
        for y in 0..8u32 {
            for x in 0..8u32 {
                let index = ((x * 7 + y * 13 + x * y) as usize % colours) as u8;
                tile.set_color_index(x, y, index);
            }
        }
        tile
    }

    #[test]
    fn decodes_msb_first_with_plane_zero_low() {
        // Row 0: plane 0 = 1000_0001, plane 1 = 1100_0000
        let mut plane0 = [0u8; 8];
        let mut plane1 = [0u8; 8];
        plane0[0] = 0b1000_0001;
        plane1[0] = 0b1100_0000;

        let tile = Tile::from_planes(&[plane0, plane1], palette(BitDepth::Bpp2)).unwrap();
        assert_eq!(tile.depth(), BitDepth::Bpp2);
        assert_eq!(tile.color_index_at(0, 0), 3);
        assert_eq!(tile.color_index_at(1, 0), 2);
        assert_eq!(tile.color_index_at(2, 0), 0);
        assert_eq!(tile.color_index_at(7, 0), 1);
        assert_eq!(tile.color_index_at(0, 1), 0);
    }

    #[test]
    fn encodes_known_bytes() {
        let mut tile = Tile::new(BitDepth::Bpp2, palette(BitDepth::Bpp2)).unwrap();
        tile.set_color_index(0, 0, 3);
        tile.set_color_index(7, 0, 1);
        tile.set_color_index(3, 7, 2);

        let planar = tile.to_planar();
        assert_eq!(planar.len(), 16);
        assert_eq!(planar[0], 0b1000_0001);
        assert_eq!(planar[7], 0);
        assert_eq!(planar[8], 0b1000_0000);
        assert_eq!(planar[15], 0b0001_0000);
    }

    #[test]
    fn round_trips_every_depth() {
        for depth in [BitDepth::Bpp1, BitDepth::Bpp2, BitDepth::Bpp4, BitDepth::Bpp8] {
            let tile = patterned(depth);
            let planar = tile.to_planar();
            assert_eq!(planar.len(), depth.bytes_per_tile().unwrap());

            let decoded = Tile::decode(depth, &planar, palette(depth)).unwrap();
            assert_eq!(decoded, tile, "round trip failed for {}", depth);
        }
    }

    #[test]
    fn rejects_bad_plane_shapes() {
        let pal = palette(BitDepth::Bpp2);
        let three = [[0u8; 8]; 3];
        assert!(matches!(
            Tile::from_planes(&three, pal.clone()),
            Err(Error::InvalidPlanes(_))
        ));

        let short: [&[u8]; 2] = [&[0u8; 8], &[0u8; 7]];
        assert!(matches!(
            Tile::from_planes(&short, pal.clone()),
            Err(Error::InvalidPlanes(_))
        ));

        assert!(matches!(
            Tile::decode(BitDepth::Bpp2, &[0u8; 15], pal),
            Err(Error::InvalidPlanes(_))
        ));
    }

    #[test]
    fn out_of_bounds_reads_background() {
        let mut tile = patterned(BitDepth::Bpp2);
        tile.set_color_index(0, 0, 3);
        let background = tile.palette().colour(0);

        assert_eq!(tile.at(8, 0), background);
        assert_eq!(tile.at(0, 8), background);
        assert_eq!(tile.at(100, 100), background);
        assert_eq!(tile.color_index_at(8, 8), 0);
        assert_eq!(tile.at(0, 0), tile.palette().colour(3));
    }

    #[test]
    fn hash_is_cached_and_invalidated() {
        let mut tile = patterned(BitDepth::Bpp4);
        let first = tile.hash();
        assert_eq!(tile.hash(), first);

        let old = tile.color_index_at(2, 2);
        tile.set_color_index(2, 2, (old + 1) % 16);
        assert_ne!(tile.hash(), first);

        tile.set_color_index(2, 2, old);
        assert_eq!(tile.hash(), first);
    }

    #[test]
    fn set_by_colour_picks_nearest_entry() {
        let mut tile = Tile::new(BitDepth::Bpp2, palette(BitDepth::Bpp2)).unwrap();
        let before = tile.hash();
        tile.set(4, 4, Rgba([0xA0, 0xB0, 0xA8, 0xFF]));
        assert_eq!(tile.color_index_at(4, 4), 2);
        assert_ne!(tile.hash(), before);
    }

    #[test]
    fn identical_tiles_share_a_hash() {
        let a = patterned(BitDepth::Bpp2);
        let b = patterned(BitDepth::Bpp2);
        assert!(a.is_identical(&b));

        let blank = Tile::new(BitDepth::Bpp2, palette(BitDepth::Bpp2)).unwrap();
        assert!(!a.is_identical(&blank));
        assert!(blank.is_empty());
        assert!(!a.is_empty());
    }

    #[test]
    fn indices_are_masked_to_depth() {
        let mut tile = Tile::new(BitDepth::Bpp2, palette(BitDepth::Bpp2)).unwrap();
        tile.set_color_index(1, 1, 7);
        assert_eq!(tile.color_index_at(1, 1), 3);
    }
}
