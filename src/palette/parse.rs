//! Palette file readers: hex text, GIMP `.gpl` and raw RGB triples.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::Rgba;
use log::debug;

use super::Palette;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteFormat {
    /// One `RRGGBB` per line, optional `#` or `$` prefix
    Hex,
    /// GIMP palette text
    Gimp,
    /// 8-bit red, green, blue in binary
    RawRgb,
}

impl PaletteFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gpl") => PaletteFormat::Gimp,
            Some("pal") | Some("bin") => PaletteFormat::RawRgb,
            _ => PaletteFormat::Hex,
        }
    }
}

pub fn load_palette(path: &Path) -> Result<Palette> {
    let format = PaletteFormat::from_path(path);
    debug!("Loading {:?} palette from {}", format, path.display());

    match format {
        PaletteFormat::Hex => read_hex_palette(BufReader::new(File::open(path)?)),
        PaletteFormat::Gimp => read_gimp_palette(BufReader::new(File::open(path)?)),
        PaletteFormat::RawRgb => read_raw_rgb_palette(&fs::read(path)?),
    }
}

pub fn read_hex_palette<R: BufRead>(reader: R) -> Result<Palette> {
    let mut colours = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim().trim_start_matches(|c: char| c == '#' || c == '$');

        // ignore short lines and comments
        if line.len() < 6 || line.starts_with(';') {
            continue;
        }

        let channel = |range: std::ops::Range<usize>, name: &str| {
            line.get(range)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| Error::Palette(format!("{} parse error on line {}", name, i + 1)))
        };

        let red = channel(0..2, "red")?;
        let green = channel(2..4, "green")?;
        let blue = channel(4..6, "blue")?;
        colours.push(Rgba([red, green, blue, 0xFF]));
    }

    Palette::new(colours)
}

pub fn read_gimp_palette<R: BufRead>(reader: R) -> Result<Palette> {
    let mut lines = reader.lines();

    let header = lines.next().transpose()?.unwrap_or_default();
    if !header.trim().eq_ignore_ascii_case("gimp palette") {
        return Err(Error::Palette(
            "missing 'GIMP Palette' on first line".to_string(),
        ));
    }

    let mut colours = Vec::new();
    for line in lines {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("Name:")
            || trimmed.starts_with("Columns:")
        {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(Error::Palette(format!("Bad palette line: {:?}", line)));
        }

        let mut rgb = [0u8; 3];
        for (channel, field) in rgb.iter_mut().zip(&fields) {
            *channel = field
                .parse()
                .map_err(|_| Error::Palette(format!("Bad palette line: {:?}", line)))?;
        }
        colours.push(Rgba([rgb[0], rgb[1], rgb[2], 0xFF]));
    }

    Palette::new(colours)
}

/// Consecutive RGB triples. A trailing partial triple is ignored.
pub fn read_raw_rgb_palette(data: &[u8]) -> Result<Palette> {
    let colours = data
        .chunks_exact(3)
        .map(|c| Rgba([c[0], c[1], c[2], 0xFF]))
        .collect();
    Palette::new(colours)
}
