//! SFV manifest parser.
//!
//! Format: one `<filename><whitespace><8 hex digits>` entry per line. Lines whose
//! first non-blank character is `;` are comments. The checksum is the last
//! whitespace-separated token, so filenames may contain spaces. Filenames are
//! kept as the exact bytes written; legacy (non-UTF-8) names still resolve.

use crate::checksum::parse_crc32;
use crate::error::{MalformedReason, ParseError};
use crate::manifest::{Manifest, ManifestEntry};
use std::ffi::OsString;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse manifest bytes. Stops at the first malformed line.
pub fn parse(text: &[u8]) -> Result<Manifest, ParseError> {
    let body = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut entries = Vec::new();
    for (idx, raw) in body.split(|&b| b == b'\n').enumerate() {
        if let Some(entry) = parse_line(raw, idx + 1)? {
            entries.push(entry);
        }
    }
    if entries.is_empty() {
        return Err(ParseError::EmptyManifest);
    }
    Ok(Manifest::from_entries(entries))
}

/// Returns `Ok(None)` for blank and comment lines.
fn parse_line(raw: &[u8], line: usize) -> Result<Option<ManifestEntry>, ParseError> {
    let trimmed = trim_end(raw.strip_suffix(b"\r").unwrap_or(raw));
    let content = trim_start(trimmed);
    if content.is_empty() || content[0] == b';' {
        return Ok(None);
    }

    let malformed = |reason| ParseError::MalformedLine {
        line,
        text: String::from_utf8_lossy(trimmed).into_owned(),
        reason,
    };

    // Split on the last whitespace run; everything before it is the filename.
    let Some(sep) = content.iter().rposition(u8::is_ascii_whitespace) else {
        let reason = match checksum_token(content) {
            Some(_) => MalformedReason::EmptyFilename,
            None => MalformedReason::MissingChecksum,
        };
        return Err(malformed(reason));
    };
    let token = &content[sep + 1..];
    let filename = trim_end(&content[..sep]);

    let Some(crc) = checksum_token(token) else {
        return Err(malformed(MalformedReason::BadChecksum));
    };
    if filename.is_empty() {
        return Err(malformed(MalformedReason::EmptyFilename));
    }
    let Some(filename) = os_filename(filename) else {
        return Err(malformed(MalformedReason::NonUtf8Filename));
    };
    Ok(Some(ManifestEntry { filename, expected_crc32: crc, line }))
}

fn checksum_token(token: &[u8]) -> Option<u32> {
    std::str::from_utf8(token).ok().and_then(parse_crc32)
}

#[cfg(unix)]
fn os_filename(bytes: &[u8]) -> Option<OsString> {
    use std::os::unix::ffi::OsStringExt;
    Some(OsString::from_vec(bytes.to_vec()))
}

/// Filenames must be UTF-8 where the OS cannot take raw bytes.
#[cfg(not(unix))]
fn os_filename(bytes: &[u8]) -> Option<OsString> {
    std::str::from_utf8(bytes).ok().map(OsString::from)
}

fn trim_start(mut b: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = b {
        if !first.is_ascii_whitespace() {
            break;
        }
        b = rest;
    }
    b
}

fn trim_end(mut b: &[u8]) -> &[u8] {
    while let [rest @ .., last] = b {
        if !last.is_ascii_whitespace() {
            break;
        }
        b = rest;
    }
    b
}
