//! # Segment Extraction
//!
//! Pulls runs of tiles out of an arbitrary binary (usually a ROM) and saves
//! each run as an image of metatiles, sixteen to a row.

pub mod config;

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use crate::binary_utils::seek_to;
use crate::chr::RawChr;
use crate::error::Result;
use crate::graphics::{MetaImage, MetaTile};
use crate::raster::{save_surface, SaveOptions};

pub use config::{load_config, parse_config, Segment, SegmentConfig};

/// Metatiles per row of an extracted image
pub const EXTRACT_STRIDE: usize = 16;

/// `NNNN_XXXXX.png` unless the segment names its own file
pub fn output_name(number: usize, segment: &Segment) -> String {
    if segment.name.is_empty() {
        format!("{:04}_{:05X}.png", number, segment.start)
    } else {
        segment.name.clone()
    }
}

/// Strips the extension from the input, or appends `_output` when there is
/// none to strip
pub fn default_output_dir(input: &Path) -> PathBuf {
    if input.extension().is_some() {
        input.with_extension("")
    } else {
        PathBuf::from(format!("{}_output", input.display()))
    }
}

/// Reads one segment's metatiles.
///
/// Running out of data at a tile boundary ends the segment early; running
/// out inside a tile is an error.
pub fn extract_segment<R: Read + Seek>(raw: &mut RawChr<R>, segment: &Segment) -> Result<MetaImage> {
    seek_to(raw, segment.start)?;

    let palette = Rc::new(segment.depth.default_palette()?);
    let mut image = MetaImage::new(
        segment.width,
        segment.height,
        EXTRACT_STRIDE,
        Rc::clone(&palette),
    )?;
    let per_unit = segment.tiles_per_unit();

    'units: for unit in 0..segment.count {
        let mut tiles = Vec::with_capacity(per_unit);
        for _ in 0..per_unit {
            match raw.read_tile(segment.depth)? {
                Some(tile) => tiles.push(tile),
                None => {
                    info!("Found {} of {} metatiles before end of data", unit, segment.count);
                    break 'units;
                }
            }
        }

        let metatile = MetaTile::new(
            &tiles,
            segment.width,
            segment.height,
            &segment.tile_order,
            Rc::clone(&palette),
        )?;
        image.push(metatile)?;
    }

    Ok(image)
}

/// Extracts every segment of `input` into `out_dir`. Returns the number of
/// images written.
pub fn extract_all(
    input: &Path,
    segments: &[Segment],
    out_dir: &Path,
    options: SaveOptions,
) -> Result<usize> {
    let file = BufReader::new(File::open(input)?);
    let mut raw = RawChr::new(file);
    fs::create_dir_all(out_dir)?;

    let mut written = 0;
    for (number, segment) in segments.iter().enumerate() {
        let name = output_name(number, segment);
        info!("{} {}", name, segment);

        let image = extract_segment(&mut raw, segment)?;
        if image.is_empty() {
            warn!("{}: no tiles at 0x{:X}, nothing written", name, segment.start);
            continue;
        }

        save_surface(&image, &out_dir.join(&name), options)?;
        written += 1;
    }

    Ok(written)
}
