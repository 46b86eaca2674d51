//! CLI command implementations

pub mod check;
pub mod render;

use std::path::PathBuf;

use anyhow::Result;
use brainseq_sequence::{CompileOptions, Sequence};

/// Reads and compiles `files` in order, echoing `##` comments to stderr.
pub(crate) fn load_sequence(files: &[PathBuf]) -> Result<Sequence> {
    let sequence = Sequence::load(files, &CompileOptions::default(), |text| {
        eprintln!("> {text}")
    })?;
    Ok(sequence)
}
