//! CLI argument definitions for the brainseq command-line interface.
//!
//! The `#[derive(Parser)]` and `#[derive(Subcommand)]` types live here so
//! `main.rs` only dispatches.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// brainseq - brainwave entrainment sequencer
#[derive(Parser)]
#[command(name = "brainseq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Parse and compile sequence files, then print the timeline
    Check {
        /// Sequence files, read in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the compiled timeline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Synthesize a sequence to a WAV or raw PCM file
    Render {
        /// Sequence files, read in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output path, or `-` for stdout
        #[arg(short, long)]
        output: String,

        /// Write headerless PCM instead of WAV
        #[arg(long)]
        raw: bool,

        /// Bits per sample (8 or 16)
        #[arg(long, default_value_t = 16, value_parser = parse_bits)]
        bits: u16,

        /// Big-endian 16-bit samples (raw output only)
        #[arg(long)]
        big_endian: bool,

        /// Start at the current time of day and keep pace with the clock
        #[arg(long)]
        realtime: bool,

        /// Suppress the period display, status line and summary
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,

        /// Show debug diagnostics
        #[arg(short, long)]
        verbose: bool,
    },
}

fn parse_bits(value: &str) -> Result<u16, String> {
    match value {
        "8" => Ok(8),
        "16" => Ok(16),
        other => Err(format!("unsupported sample size '{other}' (expected 8 or 16)")),
    }
}
