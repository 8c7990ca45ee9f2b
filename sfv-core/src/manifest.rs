use crate::error::ParseError;
use serde::{Serialize, Serializer};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One `<filename> <crc32>` line of an SFV file.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Relative path, byte for byte as written in the manifest.
    #[serde(serialize_with = "serialize_lossy")]
    pub filename: OsString,
    pub expected_crc32: u32,
    /// 1-based line number in the manifest text.
    pub line: usize,
}

/// Parsed SFV manifest. Entries keep file order and there is always at least one.
///
/// The parser is the only way to build one:
///
/// ```compile_fail
/// let _: sfv_core::Manifest = serde_json::from_str(r#"{"entries":[]}"#).unwrap();
/// ```
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub(crate) fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    /// Parse manifest bytes; see [`crate::parse::parse`].
    pub fn parse(text: &[u8]) -> Result<Self, ParseError> {
        crate::parse::parse(text)
    }

    /// Read and parse the manifest at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let bytes = std::fs::read(path)
            .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&bytes)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Directory entries are resolved against when no root is given: the manifest's own directory.
pub fn default_base_dir(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Filenames go out as text; bytes that are not UTF-8 become U+FFFD.
fn serialize_lossy<S: Serializer>(
    name: &OsString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&name.to_string_lossy())
}
