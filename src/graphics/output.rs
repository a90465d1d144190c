//! Serialisation of tiles back to planar data.

use std::io::Write;

use crate::chr::Tile;
use crate::error::Result;

/// Raw concatenated bit-planes, ready to be included in a ROM
pub fn write_bin<'a, W, I>(writer: &mut W, tiles: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Tile>,
{
    for tile in tiles {
        writer.write_all(&tile.to_planar())?;
    }
    Ok(())
}

/// One `.byte` directive per tile, decimal literals (ca65 syntax)
pub fn write_asm<'a, W, I>(writer: &mut W, tiles: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Tile>,
{
    for tile in tiles {
        let values: Vec<String> = tile.to_planar().iter().map(|b| b.to_string()).collect();
        writeln!(writer, ".byte {}", values.join(", "))?;
    }
    Ok(())
}

/// Nametable include for a screen of tile ids.
///
/// Ids are written as bytes; the list is split into a second `.byte` line
/// at the first id above 255 so the caller can switch pattern tables.
pub fn write_nametable<W: Write>(writer: &mut W, ids: &[usize]) -> Result<()> {
    writeln!(writer, ": .word {}", ids.len())?;
    write!(writer, ": .byte ")?;

    let mut line: Vec<String> = Vec::new();
    let mut split = false;
    for &id in ids {
        if id > 255 && !split {
            writeln!(writer, "{}", line.join(", "))?;
            write!(writer, ": .byte ")?;
            line.clear();
            split = true;
        }
        line.push((id & 0xFF).to_string());
    }
    writeln!(writer, "{}", line.join(", "))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chr::BitDepth;
    use crate::graphics::Surface;
    use std::rc::Rc;

    fn tile_with(index: u8) -> Tile {
        let pal = Rc::new(BitDepth::Bpp1.default_palette().unwrap());
        let mut tile = Tile::new(BitDepth::Bpp1, pal).unwrap();
        tile.set_color_index(0, 0, index);
        tile
    }

    #[test]
    fn binary_is_concatenated_planes() {
        let tiles = [tile_with(1), tile_with(0)];
        let mut out = Vec::new();
        write_bin(&mut out, &tiles).unwrap();
        assert_eq!(out.len(), 16);
        assert_eq!(out[0], 0x80);
        assert!(out[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn asm_has_one_line_per_tile() {
        let tiles = [tile_with(1), tile_with(0)];
        let mut out = Vec::new();
        write_asm(&mut out, &tiles).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ".byte 128, 0, 0, 0, 0, 0, 0, 0");
        assert_eq!(lines[1], ".byte 0, 0, 0, 0, 0, 0, 0, 0");
    }

    #[test]
    fn nametable_splits_above_255() {
        let mut out = Vec::new();
        write_nametable(&mut out, &[0, 1, 255, 256, 300]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ": .word 5\n: .byte 0, 1, 255\n: .byte 0, 44\n");
    }

    #[test]
    fn nametable_without_split() {
        let mut out = Vec::new();
        write_nametable(&mut out, &[3, 2, 1]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ": .word 3\n: .byte 3, 2, 1\n");
    }
}
