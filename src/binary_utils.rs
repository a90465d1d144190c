use std::io::{self, Read, Seek, SeekFrom};

/// Fills `buf` from `reader`, stopping early only at end of stream.
///
/// Unlike `read_exact` this reports how many bytes made it into the buffer,
/// so callers can tell an empty stream apart from a short one.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub fn skip_bytes<S: Seek>(stream: &mut S, count: u64) -> io::Result<u64> {
    let offset = i64::try_from(count).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cannot skip {} bytes", count),
        )
    })?;
    stream.seek(SeekFrom::Current(offset))
}

pub fn seek_to<S: Seek>(stream: &mut S, position: u64) -> io::Result<()> {
    stream.seek(SeekFrom::Start(position))?;
    Ok(())
}

/// Parses a decimal or `0x`-prefixed hexadecimal number
pub fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_up_to_reports_short_reads() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(read_up_to(&mut cursor, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(read_up_to(&mut cursor, &mut buf).unwrap(), 0);
    }

    #[test]
    fn skip_moves_forward() {
        let mut cursor = Cursor::new(vec![0u8; 32]);
        assert_eq!(skip_bytes(&mut cursor, 16).unwrap(), 16);
        seek_to(&mut cursor, 4).unwrap();
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn numbers_in_either_base() {
        assert_eq!(parse_number("0x1F"), Some(31));
        assert_eq!(parse_number("$10"), Some(16));
        assert_eq!(parse_number(" 42 "), Some(42));
        assert_eq!(parse_number("0xZZ"), None);
        assert_eq!(parse_number(""), None);
    }
}
