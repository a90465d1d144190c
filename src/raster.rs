//! # Raster I/O
//!
//! Loading and saving ordinary images. Paletted PNGs are decoded with the
//! `png` crate so their indices survive untouched; everything else goes
//! through `image` and is matched by colour.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::graphics::Surface;
use crate::palette::{load_palette, Palette};

pub const JPEG_QUALITY: u8 = 90;

/// A decoded input image
#[derive(Clone, Debug)]
pub enum Raster {
    Indexed(IndexedRaster),
    Rgba(RgbaImage),
}

/// Palette indices exactly as stored in the file
#[derive(Clone, Debug)]
pub struct IndexedRaster {
    pub width: u32,
    pub height: u32,
    /// Row-major, one index per pixel
    pub indices: Vec<u8>,
    pub palette: Palette,
}

impl IndexedRaster {
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.indices[(y * self.width + x) as usize]
    }
}

impl Raster {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Raster::Indexed(indexed) => (indexed.width, indexed.height),
            Raster::Rgba(rgba) => rgba.dimensions(),
        }
    }

    pub fn colour_at(&self, x: u32, y: u32) -> Rgba<u8> {
        match self {
            Raster::Indexed(indexed) => indexed.palette.colour(indexed.index_at(x, y)),
            Raster::Rgba(rgba) if x < rgba.width() && y < rgba.height() => *rgba.get_pixel(x, y),
            Raster::Rgba(_) => Rgba([0, 0, 0, 0]),
        }
    }
}

/// Loads any image `image` understands, keeping indices for paletted PNGs
pub fn load_raster(path: &Path) -> Result<Raster> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false);

    if is_png {
        let file = BufReader::new(File::open(path)?);
        if let Some(indexed) = read_indexed_png(file)? {
            debug!(
                "{}: paletted PNG, {} colours",
                path.display(),
                indexed.palette.len()
            );
            return Ok(Raster::Indexed(indexed));
        }
    }

    Ok(Raster::Rgba(image::open(path)?.to_rgba8()))
}

/// The PLTE of a paletted PNG, or any palette file `load_palette` reads
pub fn load_any_palette(path: &Path) -> Result<Palette> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false);

    if is_png {
        read_png_palette(BufReader::new(File::open(path)?))
    } else {
        load_palette(path)
    }
}

/// Palette of a paletted PNG. Fails for every other colour type.
pub fn read_png_palette<R: Read>(reader: R) -> Result<Palette> {
    match read_indexed_png(reader)? {
        Some(indexed) => Ok(indexed.palette),
        None => Err(Error::Palette("not an indexed image".to_string())),
    }
}

/// Decodes a PNG if it is paletted, `None` for any other colour type
pub fn read_indexed_png<R: Read>(reader: R) -> Result<Option<IndexedRaster>> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    if info.color_type != png::ColorType::Indexed {
        return Ok(None);
    }

    let plte = info
        .palette
        .as_ref()
        .map(|p| p.to_vec())
        .ok_or_else(|| Error::Palette("paletted PNG without a PLTE chunk".to_string()))?;
    let trns = info.trns.as_ref().map(|t| t.to_vec()).unwrap_or_default();

    let colours = plte
        .chunks_exact(3)
        .enumerate()
        .map(|(i, rgb)| Rgba([rgb[0], rgb[1], rgb[2], trns.get(i).copied().unwrap_or(0xFF)]))
        .collect();
    let palette = Palette::new(colours)?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    let indices = unpack_indices(
        &buf,
        frame.width,
        frame.height,
        frame.bit_depth as u8,
        frame.line_size,
    );

    Ok(Some(IndexedRaster {
        width: frame.width,
        height: frame.height,
        indices,
        palette,
    }))
}

/// Expands packed 1, 2 or 4 bit rows (leftmost pixel in the high bits) to
/// one index per byte
pub fn unpack_indices(data: &[u8], width: u32, height: u32, bits: u8, line_size: usize) -> Vec<u8> {
    let mut indices = Vec::with_capacity(width as usize * height as usize);
    let bits = bits as usize;
    let mask = ((1u16 << bits) - 1) as u8;
    let per_byte = 8 / bits;

    for row in data.chunks(line_size).take(height as usize) {
        for x in 0..width as usize {
            if bits == 8 {
                indices.push(row[x]);
                continue;
            }
            let byte = row[x / per_byte];
            let shift = 8 - bits - (x % per_byte) * bits;
            indices.push((byte >> shift) & mask);
        }
    }

    indices
}

/// Image container picked from the output file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(Error::Unimplemented(format!(
                "output format {:?}",
                path.display().to_string()
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SaveOptions {
    /// Run PNG output through oxipng
    pub optimise: bool,
}

/// Writes a surface in the format its extension names
pub fn save_surface(surface: &dyn Surface, path: &Path, options: SaveOptions) -> Result<()> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Png if options.optimise => {
            let temp_path = path.with_extension("temp.png");
            write_indexed_png(surface, BufWriter::new(File::create(&temp_path)?))?;
            optimise_png(&temp_path, path)
        }
        OutputFormat::Png => write_indexed_png(surface, BufWriter::new(File::create(path)?)),
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(surface.to_rgba_image()).to_rgb8();
            let mut writer = BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)?;
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Gif => {
            surface
                .to_rgba_image()
                .save_with_format(path, ImageFormat::Gif)?;
            Ok(())
        }
    }
}

/// Paletted 8-bit PNG using the surface's palette. Indices past the end of
/// the palette are written as the background.
pub fn write_indexed_png<W: Write>(surface: &dyn Surface, writer: W) -> Result<()> {
    let (width, height) = surface.bounds();
    let palette = surface.palette();
    let colours = &palette.colours()[..palette.len().min(256)];

    let plte: Vec<u8> = colours.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let alpha: Vec<u8> = colours.iter().map(|c| c[3]).collect();
    let data: Vec<u8> = surface
        .to_indexed()
        .into_iter()
        .map(|i| if (i as usize) < colours.len() { i } else { 0 })
        .collect();

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(plte);
    if alpha.iter().any(|&a| a != 0xFF) {
        encoder.set_trns(alpha);
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&data)?;
    png_writer.finish()?;
    Ok(())
}

/// Optimises `temp_path` into `path`. On failure the unoptimised file is
/// kept instead.
fn optimise_png(temp_path: &Path, path: &Path) -> Result<()> {
    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;
    options.interlace = None;

    match oxipng::optimize(
        &oxipng::InFile::Path(temp_path.to_path_buf()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    ) {
        Ok(_) => {
            if let Err(e) = fs::remove_file(temp_path) {
                warn!("Failed to remove temporary file {}: {}", temp_path.display(), e);
            }
            Ok(())
        }
        Err(e) => {
            fs::rename(temp_path, path)?;
            warn!(
                "oxipng optimisation failed for {}: {}. File saved unoptimised.",
                path.display(),
                e
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chr::{BitDepth, Tile};
    use std::io::Cursor;
    use std::rc::Rc;

    #[test]
    fn unpacks_sub_byte_rows() {
        // 2bpp, 5 pixels wide: 2 bytes per row
        let data = [0b00_01_10_11, 0b01_000000, 0b11_10_01_00, 0b10_000000];
        let indices = unpack_indices(&data, 5, 2, 2, 2);
        assert_eq!(indices, vec![0, 1, 2, 3, 1, 3, 2, 1, 0, 2]);

        let data = [0b1010_0000];
        assert_eq!(unpack_indices(&data, 3, 1, 1, 1), vec![1, 0, 1]);

        let data = [0x4F, 0x20];
        assert_eq!(unpack_indices(&data, 3, 1, 4, 2), vec![4, 15, 2]);
    }

    #[test]
    fn indexed_png_keeps_indices() {
        let palette = Rc::new(BitDepth::Bpp2.default_palette().unwrap());
        let mut tile = Tile::new(BitDepth::Bpp2, palette).unwrap();
        tile.set_color_index(0, 0, 3);
        tile.set_color_index(7, 7, 2);

        let mut png_data = Vec::new();
        write_indexed_png(&tile, &mut png_data).unwrap();

        let raster = read_indexed_png(Cursor::new(png_data)).unwrap().unwrap();
        assert_eq!((raster.width, raster.height), (8, 8));
        assert_eq!(raster.palette.len(), 4);
        assert_eq!(raster.index_at(0, 0), 3);
        assert_eq!(raster.index_at(7, 7), 2);
        assert_eq!(raster.index_at(1, 0), 0);
        assert_eq!(Raster::Indexed(raster).colour_at(0, 0), Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn transparent_entries_round_trip_through_trns() {
        let palette = Rc::new(
            Palette::new(vec![Rgba([0, 0, 0, 0]), Rgba([10, 20, 30, 0xFF])]).unwrap(),
        );
        let tile = Tile::new(BitDepth::Bpp1, palette).unwrap();

        let mut png_data = Vec::new();
        write_indexed_png(&tile, &mut png_data).unwrap();

        let raster = read_indexed_png(Cursor::new(png_data)).unwrap().unwrap();
        assert_eq!(raster.palette.colours()[0], Rgba([0, 0, 0, 0]));
        assert_eq!(raster.palette.colours()[1], Rgba([10, 20, 30, 0xFF]));
    }

    #[test]
    fn truecolour_png_is_not_indexed() {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, 1, 1);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 2, 3, 4]).unwrap();
            writer.finish().unwrap();
        }
        assert!(read_indexed_png(Cursor::new(png_data.clone())).unwrap().is_none());
        assert!(matches!(
            read_png_palette(Cursor::new(png_data)),
            Err(Error::Palette(_))
        ));
    }

    #[test]
    fn palette_from_indexed_png() {
        let palette = Rc::new(
            Palette::new(vec![Rgba([0, 0, 0, 0xFF]), Rgba([0xFF, 0, 0, 0xFF])]).unwrap(),
        );
        let tile = Tile::new(BitDepth::Bpp1, Rc::clone(&palette)).unwrap();

        let mut png_data = Vec::new();
        write_indexed_png(&tile, &mut png_data).unwrap();

        let read = read_png_palette(Cursor::new(png_data)).unwrap();
        assert_eq!(&read, palette.as_ref());
        assert_eq!(read.to_bgr555(), vec![0x0000, 0x001F]);
    }

    #[test]
    fn output_format_by_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.PNG")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.jpeg")).unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.gif")).unwrap(), OutputFormat::Gif);
        assert!(matches!(
            OutputFormat::from_path(Path::new("a.bmp")),
            Err(Error::Unimplemented(_))
        ));
    }
}
