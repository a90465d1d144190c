//! JSON segment descriptors.
//!
//! ```json
//! [
//!   { "start": "0x1000", "depth": 2, "count": "16", "dimensions": "2x2",
//!     "tile_order": "1,3,2,4", "name": "font_{start}.png" }
//! ]
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::binary_utils::parse_number;
use crate::chr::BitDepth;
use crate::error::{Error, Result};
use crate::graphics::metatile::metatile_pixels;
use crate::graphics::TileOrder;

/// Number written either as a JSON number or as a decimal/hex string
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ConfigNumber {
    Int(i64),
    Text(String),
}

impl ConfigNumber {
    fn value(&self, field: &str) -> Result<i64> {
        let parsed = match self {
            ConfigNumber::Int(n) => Some(*n),
            ConfigNumber::Text(text) => match text.trim().strip_prefix('-') {
                Some(rest) => parse_number(rest).and_then(|n| i64::try_from(n).ok()).map(|n| -n),
                None => parse_number(text).and_then(|n| i64::try_from(n).ok()),
            },
        };
        parsed.ok_or_else(|| Error::InvalidSegment(format!("invalid {}: {:?}", field, self.to_string())))
    }
}

impl fmt::Display for ConfigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigNumber::Int(n) => write!(f, "{}", n),
            ConfigNumber::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One entry of the descriptor file as written
#[derive(Clone, Debug, Deserialize)]
pub struct SegmentConfig {
    #[serde(alias = "Start")]
    pub start: ConfigNumber,
    #[serde(default, alias = "Depth")]
    pub depth: i64,
    #[serde(alias = "Count")]
    pub count: ConfigNumber,
    #[serde(default, alias = "Name")]
    pub name: String,
    /// `WxH` in tiles, empty for 1x1
    #[serde(default, alias = "Dimensions")]
    pub dimensions: String,
    #[serde(default, alias = "TileOrder", alias = "tileOrder")]
    pub tile_order: String,
}

/// A validated run of metatiles in the input
#[derive(Clone, Debug)]
pub struct Segment {
    pub start: u64,
    pub depth: BitDepth,
    /// Number of metatiles, not tiles
    pub count: usize,
    /// Output file name, empty for the numbered default
    pub name: String,
    /// In tiles
    pub width: usize,
    pub height: usize,
    pub tile_order: TileOrder,
}

impl Segment {
    pub fn tiles_per_unit(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment start=0x{:X} count=0x{:X} ({}) depth={} size={}x{} order={:?}",
            self.start,
            self.count,
            self.count,
            self.depth,
            self.width,
            self.height,
            self.tile_order.as_slice()
        )
    }
}

/// `WxH` in tiles. Either side may be hex (`0x2x0x10`), so every `x` is
/// tried as the separator until both sides parse.
fn parse_dimensions(text: &str) -> Result<(usize, usize)> {
    let text = text.trim();
    if text.is_empty() {
        return Ok((1, 1));
    }

    let (w, h) = text
        .match_indices('x')
        .find_map(|(i, _)| {
            let w = parse_number(&text[..i])?;
            let h = parse_number(&text[i + 1..])?;
            Some((w, h))
        })
        .ok_or_else(|| Error::InvalidSegment(format!("invalid dimension: {:?}", text)))?;

    let side = |n: u64| {
        usize::try_from(n)
            .map_err(|_| Error::InvalidSegment(format!("invalid dimension: {:?}", text)))
    };
    let (w, h) = (side(w)?, side(h)?);
    metatile_pixels(w, h)?;
    Ok((w, h))
}

impl SegmentConfig {
    /// Validates the entry. `Ok(None)` for segments with a count below 1.
    pub fn resolve(&self) -> Result<Option<Segment>> {
        let start = self.start.value("start")?;
        let start = u64::try_from(start)
            .map_err(|_| Error::InvalidSegment(format!("negative start: {}", start)))?;
        let count = self.count.value("count")?;

        let (width, height) = parse_dimensions(&self.dimensions)?;
        let tile_order = TileOrder::parse(&self.tile_order, width, height)?;

        let depth = if self.depth == 1 {
            BitDepth::Bpp1
        } else {
            BitDepth::Bpp2
        };

        if count < 1 {
            warn!("Ignoring segment at {}", self.start);
            return Ok(None);
        }

        let name = self
            .name
            .replace("{start}", &self.start.to_string())
            .replace("{count}", &self.count.to_string())
            .replace("{bpp}", &self.depth.to_string());

        Ok(Some(Segment {
            start,
            depth,
            count: count as usize,
            name,
            width,
            height,
            tile_order,
        }))
    }
}

pub fn parse_config(text: &str) -> Result<Vec<Segment>> {
    let entries: Vec<SegmentConfig> = serde_json::from_str(text)?;
    let mut segments = Vec::with_capacity(entries.len());
    for entry in &entries {
        if let Some(segment) = entry.resolve()? {
            segments.push(segment);
        }
    }
    Ok(segments)
}

pub fn load_config(path: &Path) -> Result<Vec<Segment>> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}
