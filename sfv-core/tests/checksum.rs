use sfv_core::checksum::{crc32_stream, format_crc32, parse_crc32};
use std::io::{self, Read};

#[test]
fn format_is_uppercase_and_padded() {
    assert_eq!(format_crc32(0xCBF4_3926), "CBF43926");
    assert_eq!(format_crc32(0xA), "0000000A");
}

#[test]
fn parse_accepts_either_case() {
    assert_eq!(parse_crc32("cbf43926"), Some(0xCBF4_3926));
    assert_eq!(parse_crc32("CbF43926"), Some(0xCBF4_3926));
    assert_eq!(parse_crc32("CBF4392"), None);
    assert_eq!(parse_crc32("-BF43926"), None);
}

#[test]
fn stream_matches_known_values() {
    let (crc, n) = crc32_stream(&b"123456789"[..], 4, |_| {}).unwrap();
    assert_eq!((crc, n), (0xCBF4_3926, 9));
    let (crc, n) = crc32_stream(io::empty(), 4, |_| panic!("no chunks expected")).unwrap();
    assert_eq!((crc, n), (0, 0));
}

#[test]
fn stream_reports_running_totals() {
    let data = vec![7u8; 10_000];
    let mut seen = Vec::new();
    let (crc, n) = crc32_stream(&data[..], 4096, |done| seen.push(done)).unwrap();
    assert_eq!(n, 10_000);
    assert_eq!(crc, crc32fast::hash(&data));
    assert_eq!(seen, vec![4096, 8192, 10_000]);
}

/// Fails with `Interrupted` once before every successful read.
struct Flaky<'a> {
    data: &'a [u8],
    interrupt: bool,
}

impl Read for Flaky<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        self.data.read(buf)
    }
}

#[test]
fn stream_retries_interrupted_reads() {
    let r = Flaky { data: b"123456789", interrupt: false };
    let (crc, _) = crc32_stream(r, 2, |_| {}).unwrap();
    assert_eq!(crc, 0xCBF4_3926);
}
