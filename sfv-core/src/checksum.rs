use crc32fast::Hasher as Crc32;
use std::io::{ErrorKind, Read};

/// Render a CRC-32 the way SFV files and reports carry it: 8 uppercase hex digits.
pub fn format_crc32(crc: u32) -> String {
    format!("{crc:08X}")
}

/// Parse an SFV checksum token. Exactly 8 hex digits, either case.
pub fn parse_crc32(token: &str) -> Option<u32> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(token, 16).ok()
}

/// Stream `reader` through an IEEE CRC-32 in `chunk_size` reads.
///
/// `on_chunk` receives the running byte count after every non-empty read.
/// Returns the finalized CRC and the total number of bytes consumed.
pub fn crc32_stream<R, F>(
    mut reader: R,
    chunk_size: usize,
    mut on_chunk: F,
) -> std::io::Result<(u32, u64)>
where
    R: Read,
    F: FnMut(u64),
{
    let mut h = Crc32::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut done = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        h.update(&buf[..n]);
        done += n as u64;
        on_chunk(done);
    }
    Ok((h.finalize(), done))
}
