//! Render command implementation
//!
//! Compiles sequence files and synthesizes them to a WAV or raw PCM file,
//! or to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use brainseq_backend_audio::{
    pick_sample_rate, BackgroundFile, Container, RenderMode, RenderReport, RenderSettings,
    Renderer, SampleFormat,
};
use brainseq_sequence::{format_time, Sequence};
use colored::Colorize;

use super::load_sequence;
use crate::display::ConsoleObserver;

/// Options of one `render` invocation.
#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub files: Vec<PathBuf>,
    /// Output path; `-` is stdout.
    pub output: String,
    pub raw: bool,
    pub bits: u16,
    pub big_endian: bool,
    pub realtime: bool,
    pub quiet: bool,
}

impl RenderArgs {
    pub fn sample_format(&self) -> SampleFormat {
        match (self.bits, self.big_endian) {
            (8, _) => SampleFormat::U8,
            (_, true) => SampleFormat::S16Be,
            (_, false) => SampleFormat::S16Le,
        }
    }

    fn container(&self) -> Container {
        if self.raw {
            Container::Raw
        } else {
            Container::Wav
        }
    }

    fn mode(&self) -> RenderMode {
        if self.realtime {
            RenderMode::Realtime
        } else {
            RenderMode::Batch
        }
    }
}

/// Run the render command
///
/// # Returns
/// Exit code 0 once the whole sequence has been written
pub fn run(args: &RenderArgs) -> Result<ExitCode> {
    // Everything that can reject the input happens before the output exists.
    let sequence = load_sequence(&args.files)?;
    let background = match &sequence.options().background {
        Some(path) => {
            let file = BackgroundFile::open(path)
                .with_context(|| format!("Failed to open background: {}", path.display()))?;
            Some(file)
        }
        None => None,
    };

    let settings = RenderSettings {
        sample_rate: pick_sample_rate(sequence.options(), background.as_ref()),
        format: args.sample_format(),
        container: args.container(),
        mode: args.mode(),
        ..RenderSettings::default()
    };

    let mut renderer = Renderer::new(&sequence, settings)?;
    if let Some(file) = background {
        renderer = renderer.with_background(Box::new(file))?;
    }

    if !args.quiet {
        print_header(&sequence, renderer.settings(), &args.output);
    }

    let mut observer = ConsoleObserver::new(io::stderr(), !args.quiet);
    let report = if args.output == "-" {
        let mut sink = BufWriter::new(io::stdout().lock());
        let report = renderer.run(&mut sink, &mut observer)?;
        sink.flush()?;
        report
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create output file: {}", args.output))?;
        let mut sink = BufWriter::new(file);
        let report = renderer
            .run(&mut sink, &mut observer)
            .with_context(|| format!("Failed to render to {}", args.output))?;
        sink.flush()?;
        report
    };
    observer.clear_status();

    if !args.quiet {
        print_summary(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_header(sequence: &Sequence, settings: &RenderSettings, output: &str) {
    eprintln!(
        "{} {} ({} Hz, {}-bit{})",
        "Rendering:".cyan().bold(),
        if output == "-" { "<stdout>" } else { output },
        settings.sample_rate,
        settings.format.bits(),
        if settings.container == Container::Raw { ", raw" } else { "" },
    );
    if settings.mode == RenderMode::Batch {
        eprintln!(
            "{} {} to {}",
            "Span:".dimmed(),
            format_time(sequence.first_time()),
            format_time(sequence.last_time())
        );
    }
}

fn print_summary(report: &RenderReport) {
    eprintln!(
        "{} {} bytes ({} frames)",
        "Done:".green().bold(),
        report.header_bytes + report.bytes,
        report.frames
    );
    eprintln!("{} {}", "PCM hash:".dimmed(), report.pcm_hash);
}
