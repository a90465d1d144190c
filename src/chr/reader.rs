//! Sequential tile reader over a seekable byte stream.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::rc::Rc;

use log::debug;

use super::{BitDepth, Tile, PLANE_LEN};
use crate::binary_utils::{read_up_to, skip_bytes};
use crate::error::{Error, Result};
use crate::palette::Palette;

/// Tiles decoded before the stream ended partway through a tile
#[derive(Debug)]
pub struct PartialRead {
    pub tiles: Vec<Tile>,
    pub error: Error,
}

impl From<PartialRead> for Error {
    fn from(partial: PartialRead) -> Self {
        partial.error
    }
}

impl fmt::Display for PartialRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} tiles)", self.error, self.tiles.len())
    }
}

impl std::error::Error for PartialRead {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct RawChr<R> {
    inner: R,
    palette: Option<Rc<Palette>>,
    default_palette: Option<(BitDepth, Rc<Palette>)>,
    tiles_read: usize,
}

impl<R: Read + Seek> RawChr<R> {
    /// Tiles read without an explicit palette get the depth's greyscale ramp
    pub fn new(inner: R) -> Self {
        RawChr {
            inner,
            palette: None,
            default_palette: None,
            tiles_read: 0,
        }
    }

    pub fn with_palette(mut self, palette: Rc<Palette>) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn tiles_read(&self) -> usize {
        self.tiles_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads and decodes the next tile.
    ///
    /// Returns `Ok(None)` when the stream is exhausted exactly at a tile
    /// boundary and `Error::TruncatedTile` when it ends inside one.
    pub fn read_tile(&mut self, depth: BitDepth) -> Result<Option<Tile>> {
        let plane_count = depth.plane_count()?;
        let offset = self.inner.stream_position()?;

        let mut planes = vec![[0u8; PLANE_LEN]; plane_count];
        for (i, plane) in planes.iter_mut().enumerate() {
            let n = read_up_to(&mut self.inner, plane)?;
            if n == 0 && i == 0 {
                return Ok(None);
            }
            if n != PLANE_LEN {
                return Err(Error::TruncatedTile { offset });
            }
        }

        let palette = self.palette_for(depth)?;
        let tile = Tile::from_planes(&planes, palette)?;
        self.tiles_read += 1;
        Ok(Some(tile))
    }

    /// Reads tiles until the stream ends.
    ///
    /// A clean end is success. On any error the tiles decoded so far come
    /// back inside the `PartialRead`.
    pub fn read_all_tiles(&mut self, depth: BitDepth) -> std::result::Result<Vec<Tile>, PartialRead> {
        let mut tiles = Vec::new();
        loop {
            match self.read_tile(depth) {
                Ok(Some(tile)) => tiles.push(tile),
                Ok(None) => break,
                Err(error) => return Err(PartialRead { tiles, error }),
            }
        }

        debug!("Read {} {} tiles", tiles.len(), depth);
        Ok(tiles)
    }

    /// Skips one tile worth of bytes without decoding
    pub fn discard_tile(&mut self, depth: BitDepth) -> Result<()> {
        let bytes = depth.bytes_per_tile()?;
        skip_bytes(&mut self.inner, bytes as u64)?;
        Ok(())
    }

    fn palette_for(&mut self, depth: BitDepth) -> Result<Rc<Palette>> {
        if let Some(palette) = &self.palette {
            return Ok(Rc::clone(palette));
        }

        match &self.default_palette {
            Some((cached, palette)) if *cached == depth => Ok(Rc::clone(palette)),
            _ => {
                let palette = Rc::new(depth.default_palette()?);
                self.default_palette = Some((depth, Rc::clone(&palette)));
                Ok(palette)
            }
        }
    }
}

impl<R: Read> Read for RawChr<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for RawChr<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
