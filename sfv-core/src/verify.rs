use crate::checksum::{crc32_stream, format_crc32};
use crate::error::ParseError;
use crate::manifest::{default_base_dir, Manifest, ManifestEntry};
use crate::path_safety::{resolve, PathPolicy};
use crate::progress::ProgressSink;
use anyhow::{bail, Context};
use serde::{Serialize, Serializer};
use std::ffi::OsString;
use std::fs::File;
use std::path::Path;

/// Read size for hashing. Only affects throughput and progress granularity.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug)]
pub struct VerifyConfig {
    pub chunk_size: usize,
    pub path_policy: PathPolicy,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, path_policy: PathPolicy::default() }
    }
}

/// What happened to one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Match,
    /// The file was read completely but hashed to something else.
    Mismatch { actual: u32 },
    /// The file could not be resolved, opened or read.
    Unreadable { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Exactly as written in the manifest.
    pub filename: OsString,
    pub expected_crc32: u32,
    pub outcome: Outcome,
}

impl FileResult {
    pub fn actual_crc32(&self) -> Option<u32> {
        match &self.outcome {
            Outcome::Match => Some(self.expected_crc32),
            Outcome::Mismatch { actual } => Some(*actual),
            Outcome::Unreadable { .. } => None,
        }
    }

    /// I/O error text; empty for both matches and mismatches.
    pub fn err(&self) -> &str {
        match &self.outcome {
            Outcome::Unreadable { detail } => detail,
            _ => "",
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Match
    }
}

/// Wire shape of a [`FileResult`]; field names and hex casing are consumed by scripts.
#[derive(Serialize)]
struct FileResultRecord<'a> {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "ExpectedCRC32")]
    expected: String,
    #[serde(rename = "ActualCRC32")]
    actual: String,
    #[serde(rename = "Err")]
    err: &'a str,
}

impl Serialize for FileResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FileResultRecord {
            filename: self.filename.to_string_lossy().into_owned(),
            expected: format_crc32(self.expected_crc32),
            actual: self.actual_crc32().map(format_crc32).unwrap_or_default(),
            err: self.err(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub ok: usize,
    pub mismatched: usize,
    pub unreadable: usize,
}

/// Results in manifest order, one per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    #[serde(rename = "Files")]
    pub files: Vec<FileResult>,
}

impl BatchResult {
    /// True when every file was read and matched.
    pub fn is_success(&self) -> bool {
        self.files.iter().all(FileResult::is_ok)
    }

    pub fn summary(&self) -> Summary {
        let mut s = Summary::default();
        for f in &self.files {
            match f.outcome {
                Outcome::Match => s.ok += 1,
                Outcome::Mismatch { .. } => s.mismatched += 1,
                Outcome::Unreadable { .. } => s.unreadable += 1,
            }
        }
        s
    }
}

/// Verify every entry against files under `base_dir` with default settings.
pub fn verify(manifest: &Manifest, base_dir: &Path, progress: &mut dyn ProgressSink) -> BatchResult {
    verify_with_config(manifest, base_dir, &VerifyConfig::default(), progress)
}

/// Verify entries one at a time in manifest order. A file that cannot be read
/// is recorded in its result; it never stops the remaining entries.
pub fn verify_with_config(
    manifest: &Manifest,
    base_dir: &Path,
    cfg: &VerifyConfig,
    progress: &mut dyn ProgressSink,
) -> BatchResult {
    let count = manifest.len();
    let mut files = Vec::with_capacity(count);
    for (i, entry) in manifest.iter().enumerate() {
        let name = entry.filename.to_string_lossy();
        progress.file_started(i, count, &name);
        let outcome = match hash_entry(entry, &name, base_dir, cfg, progress) {
            Ok(actual) if actual == entry.expected_crc32 => Outcome::Match,
            Ok(actual) => Outcome::Mismatch { actual },
            Err(e) => Outcome::Unreadable { detail: format!("{e:#}") },
        };
        tracing::debug!(file = %name, line = entry.line, outcome = ?outcome, "verified");
        files.push(FileResult {
            filename: entry.filename.clone(),
            expected_crc32: entry.expected_crc32,
            outcome,
        });
    }
    BatchResult { files }
}

/// Load the manifest at `manifest_path` and verify it. Entries resolve against
/// `root`, or the manifest's directory when `root` is `None`.
pub fn verify_path(
    manifest_path: &Path,
    root: Option<&Path>,
    cfg: &VerifyConfig,
    progress: &mut dyn ProgressSink,
) -> Result<BatchResult, ParseError> {
    let manifest = Manifest::from_path(manifest_path)?;
    let base = root.map(Path::to_path_buf).unwrap_or_else(|| default_base_dir(manifest_path));
    tracing::debug!(manifest = %manifest_path.display(), base = %base.display(), entries = manifest.len(), "verifying");
    Ok(verify_with_config(&manifest, &base, cfg, progress))
}

/// Stream one file through CRC-32. The handle is dropped before returning.
/// `name` is the display form handed to the progress sink.
fn hash_entry(
    entry: &ManifestEntry,
    name: &str,
    base_dir: &Path,
    cfg: &VerifyConfig,
    progress: &mut dyn ProgressSink,
) -> anyhow::Result<u32> {
    let path = resolve(base_dir, Path::new(&entry.filename), cfg.path_policy)?;
    let f = File::open(&path).with_context(|| format!("open {}", path.display()))?;
    let total = match f.metadata() {
        Ok(m) if m.is_dir() => bail!("{} is a directory", path.display()),
        Ok(m) => Some(m.len()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "size unknown");
            None
        }
    };
    let (crc, bytes) = crc32_stream(&f, cfg.chunk_size, |done| {
        progress.on_progress(name, done, total)
    })
    .with_context(|| format!("read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes, crc = %format_crc32(crc), "hashed");
    Ok(crc)
}
