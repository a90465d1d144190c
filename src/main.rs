use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use log::{error, info, LevelFilter};

use chrconv::chr::{BitDepth, RawChr};
use chrconv::extract::{self, load_config};
use chrconv::graphics::{self, CharSize, TiledImage, Tilemap};
use chrconv::palette::{load_palette, select_palette, write_bgr555, Bgr555, PaletteSource};
use chrconv::raster::{load_any_palette, load_raster, save_surface, SaveOptions};
use chrconv::{Error, Result};

#[derive(Parser)]
#[command(name = "chrconv", version, about = "Convert between CHR tile data and images")]
struct Cli {
    /// More output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// CHR data to an image (png, jpg or gif)
    Chr2img(Chr2ImgArgs),
    /// Image to CHR data
    Img2chr(Img2ChrArgs),
    /// Image to a 32x32 character tilemap, saved back as an image
    Tilemap(TilemapArgs),
    /// Image to deduplicated CHR plus a nametable include
    Screen(ScreenArgs),
    /// Extract described tile runs from a ROM
    Extract(ExtractArgs),
    /// Palette (paletted PNG or palette file) to SNES BGR555 words
    Pal(PalArgs),
}

#[derive(Args)]
struct DepthArg {
    /// Bits per pixel: 1, 2, 4, 8 or 1bpp, 2bpp, 4bpp, 8bpp
    #[arg(short = 'd', long = "bit-depth", default_value = "2", value_parser = parse_depth)]
    depth: BitDepth,
}

#[derive(Args)]
struct Chr2ImgArgs {
    input: PathBuf,
    output: PathBuf,

    #[command(flatten)]
    depth: DepthArg,

    /// Four NES colour codes, eg. 0F,00,1A,20
    #[arg(long, conflicts_with = "pal_file")]
    nes_pal: Option<String>,

    /// Palette file (hex text, .gpl or raw .pal)
    #[arg(long)]
    pal_file: Option<PathBuf>,

    /// Tiles to skip from the start of the input
    #[arg(long, default_value_t = 0)]
    start_tile: usize,

    /// Run PNG output through oxipng
    #[arg(long, default_value_t = false)]
    optimize: bool,
}

#[derive(Args)]
struct Img2ChrArgs {
    input: PathBuf,
    output: PathBuf,

    #[command(flatten)]
    depth: DepthArg,

    /// Write ca65 `.byte` lines instead of binary
    #[arg(long, default_value_t = false)]
    asm: bool,

    #[arg(long, default_value = "8x8", value_parser = parse_char_size)]
    char_size: CharSize,

    #[arg(long, default_value_t = false)]
    rm_dupes: bool,

    #[arg(long, default_value_t = false)]
    rm_empty: bool,
}

#[derive(Args)]
struct TilemapArgs {
    input: PathBuf,
    output: PathBuf,

    #[command(flatten)]
    depth: DepthArg,

    #[arg(long, default_value = "8x8", value_parser = parse_char_size)]
    char_size: CharSize,

    #[arg(long)]
    pal_file: Option<PathBuf>,
}

#[derive(Args)]
struct ScreenArgs {
    input: PathBuf,
    /// Writes <base>.chr and <base>.nt.inc
    output_base: PathBuf,

    #[command(flatten)]
    depth: DepthArg,
}

#[derive(Args)]
struct ExtractArgs {
    /// ROM or any other binary
    input: PathBuf,
    /// JSON segment descriptors
    config: PathBuf,

    /// Defaults to the input path without its extension
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    optimize: bool,
}

#[derive(Args)]
struct PalArgs {
    /// Paletted PNG, hex text, .gpl or raw .pal
    input: PathBuf,
    /// Little endian 15-bit colours
    output: PathBuf,
}

fn parse_depth(s: &str) -> std::result::Result<BitDepth, String> {
    s.parse::<BitDepth>().map_err(|e| e.to_string())
}

fn parse_char_size(s: &str) -> std::result::Result<CharSize, String> {
    s.parse::<CharSize>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Command::Chr2img(args) => chr_to_image(args),
        Command::Img2chr(args) => image_to_chr(args),
        Command::Tilemap(args) => image_to_tilemap(args),
        Command::Screen(args) => image_to_screen(args),
        Command::Extract(args) => extract_segments(args),
        Command::Pal(args) => palette_to_bgr555(args),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}

fn chr_to_image(args: Chr2ImgArgs) -> Result<()> {
    let depth = args.depth.depth;
    let source = match (&args.pal_file, &args.nes_pal) {
        (Some(path), _) => PaletteSource::File(path),
        (None, Some(codes)) => PaletteSource::Nes(codes),
        (None, None) => PaletteSource::Default,
    };
    let palette = Rc::new(select_palette(depth, source)?);

    let file = BufReader::new(File::open(&args.input)?);
    let mut raw = RawChr::new(file).with_palette(Rc::clone(&palette));
    for _ in 0..args.start_tile {
        raw.discard_tile(depth)?;
    }

    let tiles = raw.read_all_tiles(depth)?;
    if tiles.is_empty() {
        return Err(Error::NoTiles);
    }
    info!("Read {} {} tiles from {}", tiles.len(), depth, args.input.display());

    let image = TiledImage::from_tiles(depth, palette, tiles)?;
    save_surface(
        &image,
        &args.output,
        SaveOptions {
            optimise: args.optimize,
        },
    )?;

    info!("Wrote {}", args.output.display());
    Ok(())
}

fn image_to_chr(args: Img2ChrArgs) -> Result<()> {
    let depth = args.depth.depth;
    let raster = load_raster(&args.input)?;
    let palette = Rc::new(depth.default_palette()?);
    let image = TiledImage::from_raster(args.char_size, depth, palette, &raster)?;

    let mut tiles = if args.rm_dupes {
        image.unique_tiles().tiles
    } else {
        image.tiles().cloned().collect()
    };
    if args.rm_empty {
        tiles.retain(|tile| !tile.is_empty());
    }
    info!("{} tiles after filtering", tiles.len());

    let mut output = BufWriter::new(File::create(&args.output)?);
    if args.asm {
        graphics::write_asm(&mut output, &tiles)?;
    } else {
        graphics::write_bin(&mut output, &tiles)?;
    }
    output.flush()?;

    Ok(())
}

fn image_to_tilemap(args: TilemapArgs) -> Result<()> {
    let depth = args.depth.depth;
    let palette = match &args.pal_file {
        Some(path) => load_palette(path)?.truncated_for(depth)?,
        None => depth.default_palette()?,
    };

    let raster = load_raster(&args.input)?;
    let tilemap = Tilemap::from_raster(args.char_size, depth, vec![Rc::new(palette)], &raster)?;
    save_surface(&tilemap, &args.output, SaveOptions::default())?;

    info!("Wrote {} tilemap to {}", tilemap.char_size(), args.output.display());
    Ok(())
}

fn image_to_screen(args: ScreenArgs) -> Result<()> {
    let raster = load_raster(&args.input)?;
    graphics::export_screen(&raster, args.depth.depth, &args.output_base)?;
    Ok(())
}

fn extract_segments(args: ExtractArgs) -> Result<()> {
    let segments = load_config(&args.config)?;
    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| extract::default_output_dir(&args.input));

    let written = extract::extract_all(
        &args.input,
        &segments,
        &out_dir,
        SaveOptions {
            optimise: args.optimize,
        },
    )?;

    info!("Wrote {} images to {}", written, out_dir.display());
    Ok(())
}

fn palette_to_bgr555(args: PalArgs) -> Result<()> {
    let palette = load_any_palette(&args.input)?;
    for colour in palette.colours() {
        let [r, g, b, _] = colour.0;
        info!("  {:02X} {:02X} {:02X} -> {}", r, g, b, Bgr555::from(*colour));
    }

    let mut output = BufWriter::new(File::create(&args.output)?);
    write_bgr555(&mut output, &palette)?;
    output.flush()?;

    info!("Wrote {} colours to {}", palette.len(), args.output.display());
    Ok(())
}
