use std::io::Cursor;
use std::rc::Rc;

use chrconv::chr::{BitDepth, RawChr, Tile};
use chrconv::extract::{extract_segment, parse_config};
use chrconv::graphics::{write_bin, CharSize, Surface, TiledImage};
use chrconv::palette::{nes_palette, Palette};
use chrconv::raster::{read_indexed_png, write_indexed_png, Raster};
use chrconv::Error;

/// Deterministic 2bpp test data
fn sample_chr(tiles: usize) -> Vec<u8> {
    (0..tiles * 16).map(|i| (i * 37 % 251) as u8).collect()
}

#[test]
fn chr_survives_image_round_trip() {
    let data = sample_chr(20);
    let mut raw = RawChr::new(Cursor::new(data.clone()));
    let tiles = raw.read_all_tiles(BitDepth::Bpp2).unwrap();
    assert_eq!(tiles.len(), 20);

    let palette = Rc::new(BitDepth::Bpp2.default_palette().unwrap());
    let image = TiledImage::from_tiles(BitDepth::Bpp2, Rc::clone(&palette), tiles).unwrap();
    assert_eq!(image.bounds(), (128, 16));

    let mut png_data = Vec::new();
    write_indexed_png(&image, &mut png_data).unwrap();
    let raster = Raster::Indexed(read_indexed_png(Cursor::new(png_data)).unwrap().unwrap());

    let back = TiledImage::from_raster(CharSize::Size8x8, BitDepth::Bpp2, palette, &raster).unwrap();
    let mut out = Vec::new();
    back.write_bin(&mut out).unwrap();

    assert_eq!(&out[..data.len()], &data[..]);
    // Padding tiles are blank
    assert!(out[data.len()..].iter().all(|&b| b == 0));
}

#[test]
fn rgb_pixels_round_trip_through_colours() {
    let palette = Rc::new(nes_palette(&["0F", "16", "27", "30"]).unwrap());
    let mut tile = Tile::new(BitDepth::Bpp2, Rc::clone(&palette)).unwrap();
    for i in 0..8 {
        tile.set_color_index(i, i, (i % 4) as u8);
    }

    let raster = Raster::Rgba(tile.to_rgba_image());
    let image = TiledImage::from_raster(CharSize::Size8x8, BitDepth::Bpp2, palette, &raster).unwrap();
    let decoded = image.tiles().next().unwrap();

    assert_eq!(decoded, &tile);
    assert_eq!(decoded.hash(), tile.hash());
}

#[test]
fn truncated_stream_keeps_decoded_tiles() {
    let mut data = sample_chr(3);
    data.truncate(40);
    let mut raw = RawChr::new(Cursor::new(data));

    let partial = raw.read_all_tiles(BitDepth::Bpp2).unwrap_err();
    assert_eq!(partial.tiles.len(), 2);
    assert!(matches!(partial.error, Error::TruncatedTile { offset: 32 }));
}

#[test]
fn skipping_tiles_before_reading() {
    let data = sample_chr(4);
    let mut raw = RawChr::new(Cursor::new(data.clone()));
    raw.discard_tile(BitDepth::Bpp2).unwrap();
    raw.discard_tile(BitDepth::Bpp2).unwrap();

    let tiles = raw.read_all_tiles(BitDepth::Bpp2).unwrap();
    assert_eq!(tiles.len(), 2);

    let mut out = Vec::new();
    write_bin(&mut out, &tiles).unwrap();
    assert_eq!(out, data[32..]);
}

#[test]
fn segment_from_config() {
    let segments = parse_config(
        r#"[{"start": "0x10", "depth": 2, "count": "2", "dimensions": "1x2", "tile_order": "2,1"}]"#,
    )
    .unwrap();

    let data = sample_chr(6);
    let mut raw = RawChr::new(Cursor::new(data.clone()));
    let image = extract_segment(&mut raw, &segments[0]).unwrap();
    assert_eq!(image.len(), 2);
    assert_eq!(image.bounds(), (8 * 16, 16));

    // First metatile shows file tile 2 on top, then tile 1
    let palette = Rc::new(BitDepth::Bpp2.default_palette().unwrap());
    let tile2 = Tile::decode(BitDepth::Bpp2, &data[32..48], Rc::clone(&palette)).unwrap();
    let tile1 = Tile::decode(BitDepth::Bpp2, &data[16..32], palette).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(image.color_index_at(x, y), tile2.color_index_at(x, y));
            assert_eq!(image.color_index_at(x, y + 8), tile1.color_index_at(x, y));
        }
    }
}

#[test]
fn palette_limits_are_enforced() {
    let big = Rc::new(BitDepth::Bpp4.default_palette().unwrap());
    assert!(matches!(
        TiledImage::from_tiles(BitDepth::Bpp2, big, Vec::new()),
        Err(Error::PaletteTooLarge { len: 16, max: 4 })
    ));

    let small = Palette::new(vec![image::Rgba([0, 0, 0, 0xFF])]).unwrap();
    assert!(matches!(
        small.fit_to(BitDepth::Bpp1),
        Err(Error::PaletteTooSmall { len: 1, required: 2 })
    ));
}
