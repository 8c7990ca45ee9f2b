use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};

/// How manifest filenames are resolved against the base directory.
#[derive(Clone, Copy, Debug)]
pub struct PathPolicy {
    /// Reject filenames that could reach outside the base directory.
    pub confine: bool,
    /// Only consulted when confining.
    pub follow_symlinks: bool,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self { confine: false, follow_symlinks: true }
    }
}

/// Resolve `rel` against `root`.
///
/// Without `confine` this is a plain join. With it: no absolute paths, no `..`,
/// and either no symlinks anywhere along the path or, when following them, a
/// canonical target that stays under the canonical root.
pub fn resolve(root: &Path, rel: &Path, policy: PathPolicy) -> Result<PathBuf> {
    if !policy.confine {
        return Ok(root.join(rel));
    }
    if rel.is_absolute() || rel.has_root() {
        bail!("absolute paths are not allowed: {:?}", rel);
    }
    if rel.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
        bail!("parent traversal not allowed: {:?}", rel);
    }
    let candidate = root.join(rel);
    if !policy.follow_symlinks {
        let mut cur = root.to_path_buf();
        for comp in rel.components() {
            cur.push(comp);
            if let Ok(m) = std::fs::symlink_metadata(&cur) {
                if m.file_type().is_symlink() {
                    bail!("symlink in path (not following): {:?}", cur);
                }
            }
        }
        Ok(candidate)
    } else {
        let root_can = std::fs::canonicalize(root)
            .with_context(|| format!("canonicalize root {:?}", root))?;
        let cand_can = std::fs::canonicalize(&candidate)
            .with_context(|| format!("open {:?}", candidate))?;
        if !cand_can.starts_with(&root_can) {
            bail!("path escapes root: {:?}", rel);
        }
        Ok(cand_can)
    }
}
