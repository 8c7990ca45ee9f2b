use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sfv_core::path_safety::PathPolicy;
use sfv_core::verify::DEFAULT_CHUNK_SIZE;
use sfv_core::{Manifest, NoProgress, Progress, VerifyConfig};

mod logging;
mod render;

const EXIT_OK: u8 = 0;
/// Bad arguments, or a manifest that cannot be read or parsed.
const EXIT_USAGE: u8 = 1;
/// At least one file mismatched or could not be read.
const EXIT_FAILED: u8 = 2;
/// Verification ran but its results could not be written (e.g. a closed pipe).
const EXIT_OUTPUT: u8 = 3;

#[derive(Parser)]
#[command(name = "sfv", version, about = "Check files against an SFV (CRC-32) manifest")]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Verify every file listed in the manifest
    Verify {
        manifest: PathBuf,
        /// Directory filenames are relative to (default: the manifest's directory)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Bytes read per step while hashing
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        chunk_size: usize,
        /// Refuse filenames that are absolute or climb out of the root
        #[arg(long, default_value_t = false)]
        confine: bool,
        /// With --confine, also refuse any symlink in a path
        #[arg(long, default_value_t = false)]
        no_follow_symlinks: bool,
        #[arg(long, default_value_t = false)]
        no_progress: bool,
    },
    /// Parse the manifest and print its entries
    List {
        manifest: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(EXIT_USAGE) } else { ExitCode::SUCCESS };
        }
    };
    logging::init(cli.verbose);

    let code = match cli.cmd {
        Cmd::Verify { manifest, root, json, chunk_size, confine, no_follow_symlinks, no_progress } => {
            let cfg = VerifyConfig {
                chunk_size,
                path_policy: PathPolicy { confine, follow_symlinks: !no_follow_symlinks },
            };
            let show_progress = !no_progress && std::io::stderr().is_terminal();
            verify(&manifest, root.as_deref(), &cfg, json, show_progress)
        }
        Cmd::List { manifest, json } => list(&manifest, json),
    };
    ExitCode::from(code)
}

fn load(manifest_path: &Path) -> Option<Manifest> {
    match Manifest::from_path(manifest_path) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::error!(file = %manifest_path.display(), "error parsing sfv file: {e}");
            None
        }
    }
}

fn verify(manifest_path: &Path, root: Option<&Path>, cfg: &VerifyConfig, json: bool, show_progress: bool) -> u8 {
    let prog = Progress::new(show_progress);
    prog.start();
    let batch = if show_progress {
        let mut sink = prog.clone();
        sfv_core::verify_path(manifest_path, root, cfg, &mut sink)
    } else {
        sfv_core::verify_path(manifest_path, root, cfg, &mut NoProgress)
    };
    prog.stop();

    let batch = match batch {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(file = %manifest_path.display(), "error parsing sfv file: {e}");
            return EXIT_USAGE;
        }
    };

    let written = if json {
        emit(|out| render::write_json(out, &batch))
    } else {
        emit(|out| Ok(render::write_text(out, &batch)?))
    };
    if let Err(e) = written {
        tracing::error!("write results: {e:#}");
        return EXIT_OUTPUT;
    }

    if batch.is_success() { EXIT_OK } else { EXIT_FAILED }
}

/// Run `write` against locked stdout and flush.
fn emit<F>(write: F) -> Result<()>
where
    F: FnOnce(&mut std::io::StdoutLock<'static>) -> Result<()>,
{
    let mut out = std::io::stdout().lock();
    write(&mut out)?;
    out.flush()?;
    Ok(())
}

fn list(manifest_path: &Path, json: bool) -> u8 {
    let Some(manifest) = load(manifest_path) else { return EXIT_USAGE };
    let written = if json {
        emit(|out| render::write_json(out, &manifest))
    } else {
        emit(|out| Ok(render::write_manifest(out, &manifest)?))
    };
    if let Err(e) = written {
        tracing::error!("write manifest: {e:#}");
        return EXIT_OUTPUT;
    }
    EXIT_OK
}
