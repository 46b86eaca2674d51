//! Check command implementation
//!
//! Compiles sequence files without producing audio and prints the
//! resulting timeline.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use brainseq_sequence::{Sequence, TimelineDump};
use colored::Colorize;

use super::load_sequence;

/// Printed before any other test-mode output.
pub const TEST_MODE_BANNER: &str = "*** This is a test mode. Use 'render' to generate audio. ***";

/// Run the check command
///
/// # Arguments
/// * `files` - Sequence files, read in order
/// * `json` - Print the compiled timeline as JSON instead of text
///
/// # Returns
/// Exit code 0 when the sequence compiles
pub fn run(files: &[PathBuf], json: bool) -> Result<ExitCode> {
    eprintln!("{}", TEST_MODE_BANNER.yellow());
    let sequence = load_sequence(files)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_timeline(&sequence, json, &mut out)?;
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}

/// Writes every period from the earliest, as text or JSON.
pub fn write_timeline<W: Write>(sequence: &Sequence, json: bool, out: &mut W) -> Result<()> {
    if json {
        let dump = TimelineDump::from_sequence(sequence)
            .to_json_pretty()
            .context("Failed to serialize timeline")?;
        writeln!(out, "{dump}")?;
    } else {
        out.write_all(sequence.describe().as_bytes())?;
    }
    Ok(())
}
