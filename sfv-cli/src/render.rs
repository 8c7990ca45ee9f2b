use sfv_core::checksum::format_crc32;
use sfv_core::{BatchResult, FileResult, Manifest, Outcome};
use std::io::{self, Write};

/// One line per file, then a summary.
pub fn write_text(out: &mut impl Write, batch: &BatchResult) -> io::Result<()> {
    for f in &batch.files {
        writeln!(out, "{}", result_line(f))?;
    }
    let s = batch.summary();
    writeln!(
        out,
        "{} files: {} OK, {} mismatched, {} unreadable",
        batch.files.len(),
        s.ok,
        s.mismatched,
        s.unreadable
    )
}

pub fn result_line(f: &FileResult) -> String {
    let name = f.filename.to_string_lossy();
    match &f.outcome {
        Outcome::Match => format!("OK        {}  {}", name, format_crc32(f.expected_crc32)),
        Outcome::Mismatch { actual } => format!(
            "MISMATCH  {}  expected {} actual {}",
            name,
            format_crc32(f.expected_crc32),
            format_crc32(*actual)
        ),
        Outcome::Unreadable { detail } => format!("ERROR     {}  {}", name, detail),
    }
}

pub fn write_json(out: &mut impl Write, value: &impl serde::Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Manifest listing in SFV layout, useful for checking what the parser saw.
pub fn write_manifest(out: &mut impl Write, manifest: &Manifest) -> io::Result<()> {
    for e in manifest {
        writeln!(
            out,
            "{:>5}  {} {}",
            e.line,
            e.filename.to_string_lossy(),
            format_crc32(e.expected_crc32)
        )?;
    }
    Ok(())
}
