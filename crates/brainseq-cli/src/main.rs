//! brainseq CLI - check and render brainwave entrainment sequences
//!
//! This binary compiles sequence files and either prints their timeline or
//! synthesizes them to WAV or raw PCM.

use std::process::ExitCode;

use clap::Parser;

use brainseq_cli::commands;
use brainseq_cli::logging::{self, Verbosity};

mod cli_args;

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { files, json } => {
            logging::init(Verbosity::Normal);
            commands::check::run(&files, json)
        }
        Commands::Render {
            files,
            output,
            raw,
            bits,
            big_endian,
            realtime,
            quiet,
            verbose,
        } => {
            logging::init(Verbosity::from_flags(quiet, verbose));
            commands::render::run(&commands::render::RenderArgs {
                files,
                output,
                raw,
                bits,
                big_endian,
                realtime,
                quiet,
            })
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
