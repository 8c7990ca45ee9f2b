use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a manifest line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// No whitespace separates a filename from a checksum.
    MissingChecksum,
    /// The last token is not exactly 8 hex digits.
    BadChecksum,
    EmptyFilename,
    /// The platform cannot represent the filename bytes as a path.
    NonUtf8Filename,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MalformedReason::MissingChecksum => "missing checksum",
            MalformedReason::BadChecksum => "checksum is not 8 hex digits",
            MalformedReason::EmptyFilename => "empty filename",
            MalformedReason::NonUtf8Filename => "filename is not valid UTF-8",
        };
        f.write_str(s)
    }
}

/// Failure to turn manifest text into a usable list of entries.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed line {line}: {reason}: {text:?}")]
    MalformedLine { line: usize, text: String, reason: MalformedReason },

    #[error("manifest contains no entries")]
    EmptyManifest,

    #[error("read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// 1-based line number of the offending line, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}
