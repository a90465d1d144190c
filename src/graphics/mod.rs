//! Surfaces built out of tiles.
//!
//! Everything here addresses pixels through the [`Surface`] trait. Coordinates
//! are split into a character index and a local coordinate, and characters
//! split them again into their 8x8 tiles.

pub mod char_size;
pub mod metatile;
pub mod output;
pub mod screen;
pub mod surface;
pub mod tile_metadata;
pub mod tiled_image;
pub mod tilemap;

pub use char_size::CharSize;
pub use metatile::{MetaImage, MetaTile, TileOrder};
pub use output::{write_asm, write_bin, write_nametable};
pub use screen::{export_screen, screen_paths, screen_tiles, write_screen};
pub use surface::Surface;
pub use tile_metadata::TileMetadata;
pub use tiled_image::{TiledImage, UniqueTiles, ROW_TILES};
pub use tilemap::{Tilemap, TILEMAP_DIM};
