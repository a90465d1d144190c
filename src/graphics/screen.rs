//! # Screens
//!
//! One NES background: at most 32x30 tiles, deduplicated into CHR data plus
//! a nametable include. Up to two pattern tables (512 tiles) are accepted.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use super::{output, CharSize, Surface, TiledImage, UniqueTiles};
use crate::chr::{BitDepth, TILE_DIM};
use crate::error::{Error, Result};
use crate::raster::Raster;

pub const SCREEN_TILES_WIDE: u32 = 32;
pub const SCREEN_TILES_HIGH: u32 = 30;
pub const PATTERN_TABLE_TILES: usize = 256;

/// Deduplicates the tiles of a screen sized image
pub fn screen_tiles(image: &TiledImage) -> Result<UniqueTiles> {
    let (width, height) = image.bounds();
    let dim = TILE_DIM as u32;
    if width > SCREEN_TILES_WIDE * dim || height > SCREEN_TILES_HIGH * dim {
        return Err(Error::ImageTooLarge {
            width: width / dim,
            height: height / dim,
        });
    }

    let unique = image.unique_tiles();
    if unique.tiles.len() > PATTERN_TABLE_TILES * 2 {
        return Err(Error::TooManyTiles(unique.tiles.len()));
    }
    if unique.tiles.len() > PATTERN_TABLE_TILES {
        warn!("Unique tiles > {}: {}", PATTERN_TABLE_TILES, unique.tiles.len());
    }
    Ok(unique)
}

pub fn write_screen<C: Write, N: Write>(
    unique: &UniqueTiles,
    chr: &mut C,
    nametable: &mut N,
) -> Result<()> {
    output::write_bin(chr, &unique.tiles)?;
    output::write_nametable(nametable, &unique.ids)
}

/// `<base>.chr` and `<base>.nt.inc`, appended rather than replacing any
/// extension `base` already has
pub fn screen_paths(base: &Path) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut name = base.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    };
    (with_suffix(".chr"), with_suffix(".nt.inc"))
}

/// Converts `raster` and writes both screen files next to `base`
pub fn export_screen(raster: &Raster, depth: BitDepth, base: &Path) -> Result<UniqueTiles> {
    let palette = Rc::new(depth.default_palette()?);
    let image = TiledImage::from_raster(CharSize::Size8x8, depth, palette, raster)?;
    let unique = screen_tiles(&image)?;

    let (chr_path, nt_path) = screen_paths(base);
    let mut chr = BufWriter::new(File::create(&chr_path)?);
    let mut nt = BufWriter::new(File::create(&nt_path)?);
    write_screen(&unique, &mut chr, &mut nt)?;
    chr.flush()?;
    nt.flush()?;

    info!(
        "{} unique tiles, {} nametable entries",
        unique.tiles.len(),
        unique.ids.len()
    );
    Ok(unique)
}
