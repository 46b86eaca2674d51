//! Sequence-file reader.
//!
//! A sequence file has three kinds of lines:
//!
//! - `@key value` options, only before the first other line of a file
//! - preset definitions: a bare name followed by commands indented by
//!   exactly two spaces
//! - timeline entries: `HH:MM:SS name`
//!
//! Several sources may be read into one [`Parser`]; presets and options
//! carry over from one source to the next. [`Parser::finish`] compiles the
//! accumulated timeline.

mod command;
mod lines;

#[cfg(test)]
mod tests;

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ErrorCode, SequenceError, SequenceResult};
use crate::namedef::{is_valid_name, NameDef, NameTable, SILENCE};
use crate::options::{GainLevel, SequenceOptions};
use crate::ring::{compile, CompileOptions, Period, PeriodRing, TransitionMark};
use crate::sequence::Sequence;
use crate::time::parse_time_token;
use crate::voice::{normalize_amplitudes, VoiceKind, CHANNEL_COUNT, SILENT_SET};

pub use command::{parse_command, CommandError};
pub use lines::{LineReader, SourceLine};

/// Accumulates presets, options and timeline entries from sequence sources.
pub struct Parser<'e> {
    names: NameTable,
    ring: PeriodRing,
    entry_times: Vec<u32>,
    options: SequenceOptions,
    uses_background: bool,
    echo: Box<dyn FnMut(&str) + 'e>,
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'e> Parser<'e> {
    /// Creates a parser that discards `##` comments.
    pub fn new() -> Self {
        Self {
            names: NameTable::new(),
            ring: PeriodRing::new(),
            entry_times: Vec::new(),
            options: SequenceOptions::default(),
            uses_background: false,
            echo: Box::new(|_| {}),
        }
    }

    /// Routes the text of `##` comments to `echo`.
    pub fn with_echo(mut self, echo: impl FnMut(&str) + 'e) -> Self {
        self.echo = Box::new(echo);
        self
    }

    /// Reads a sequence file; `-` reads standard input.
    pub fn parse_file(&mut self, path: &Path) -> SequenceResult<()> {
        let io_err = |source| SequenceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let text = if path == Path::new("-") {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(io_err)?;
            text
        } else {
            std::fs::read_to_string(path).map_err(io_err)?
        };

        debug!(path = %path.display(), bytes = text.len(), "reading sequence");
        self.parse_source(&text, path.parent())
    }

    /// Reads sequence text held in memory.
    pub fn parse_str(&mut self, text: &str) -> SequenceResult<()> {
        self.parse_source(text, None)
    }

    /// Compiles everything read so far.
    pub fn finish(mut self, options: &CompileOptions) -> SequenceResult<Sequence> {
        compile(&mut self.ring, &self.entry_times, options)?;
        Sequence::new(
            self.ring,
            self.options,
            &self.entry_times,
            self.uses_background,
        )
    }

    fn parse_source(&mut self, text: &str, base_dir: Option<&Path>) -> SequenceResult<()> {
        let mut reader = LineReader::new(text);
        let mut at_start = true;

        while let Some(line) = reader.next_line(&mut *self.echo) {
            let content = line.content();

            if content.starts_with('@') {
                if !at_start {
                    return Err(line_error(
                        &line,
                        ErrorCode::InvalidOption,
                        "Options are only permitted at start of sequence file",
                    ));
                }
                self.parse_option(content, base_dir)
                    .map_err(|e| attach(&line, e))?;
                continue;
            }
            at_start = false;

            if is_definition_header(content) {
                self.parse_definition(&line, &mut reader)?;
            } else {
                self.parse_timeline(&line)?;
            }
        }
        Ok(())
    }

    fn parse_option(&mut self, text: &str, base_dir: Option<&Path>) -> Result<(), CommandError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let invalid = |message: &str| CommandError {
            code: ErrorCode::InvalidOption,
            message: message.to_string(),
        };

        // Every option takes exactly one value.
        let (key, value) = match words.as_slice() {
            [key] => (*key, None),
            [key, value] => (*key, Some(*value)),
            _ => {
                return Err(CommandError {
                    code: ErrorCode::InvalidSyntax,
                    message: "Invalid syntax".to_string(),
                })
            }
        };

        match key {
            "@background" => {
                if self.options.background.is_some() {
                    return Err(CommandError {
                        code: ErrorCode::DuplicateBackground,
                        message: "Background file already set".to_string(),
                    });
                }
                let file = value.ok_or_else(|| invalid("File name expected"))?;
                self.options.background = Some(resolve_background(Path::new(file), base_dir));
            }
            "@gainlevel" => {
                let level = value.ok_or_else(|| invalid("Gain level expected"))?;
                self.options.gain_level =
                    GainLevel::from_name(level).ok_or_else(|| invalid("Invalid gain level"))?;
            }
            "@volume" => {
                let volume: i64 = value
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| invalid("Invalid volume value"))?;
                self.options.volume = u8::try_from(volume)
                    .ok()
                    .filter(|v| *v <= 100)
                    .ok_or_else(|| invalid("Volume value must be between 0 and 100"))?;
            }
            "@samplerate" => {
                let rate = value
                    .and_then(|v| v.parse::<u32>().ok())
                    .filter(|r| *r > 0)
                    .ok_or_else(|| invalid("Invalid samplerate value"))?;
                self.options.sample_rate = Some(rate);
            }
            _ => return Err(invalid("Invalid option")),
        }
        Ok(())
    }

    fn parse_definition(
        &mut self,
        header: &SourceLine,
        reader: &mut LineReader<'_>,
    ) -> SequenceResult<()> {
        let mut words = header.content().split_whitespace();
        let name = words.next().unwrap_or_default().to_string();
        if words.next().is_some() {
            return Err(line_error(header, ErrorCode::InvalidSyntax, "Invalid syntax"));
        }
        if !is_valid_name(&name) {
            return Err(line_error(
                header,
                ErrorCode::InvalidName,
                format!("Invalid name \"{name}\" in preset"),
            ));
        }
        if name == SILENCE {
            return Err(line_error(
                header,
                ErrorCode::ReservedName,
                "Cannot redefine built-in name 'silence'",
            ));
        }

        let mut voices = SILENT_SET;
        let mut count = 0;
        loop {
            let Some(line) = reader.next_line(&mut *self.echo) else {
                if count == 0 {
                    return Err(empty_definition(header, &name));
                }
                break;
            };

            if !line.body.starts_with(' ') {
                if count == 0 {
                    return Err(empty_definition(&line, &name));
                }
                reader.push_back(line);
                break;
            }
            if !line.body.starts_with("  ") || line.body.starts_with("   ") {
                return Err(line_error(
                    &line,
                    ErrorCode::InvalidIndentation,
                    "Invalid indentation. Definition lines must have exactly 2 spaces",
                ));
            }
            if count >= CHANNEL_COUNT {
                return Err(line_error(
                    &line,
                    ErrorCode::TooManyVoices,
                    format!("Too many voice definitions in '{name}' (max {CHANNEL_COUNT})"),
                ));
            }

            let voice =
                parse_command(&line.body[2..], &voices[..count]).map_err(|e| attach(&line, e))?;
            if voice.kind() == VoiceKind::Background {
                self.uses_background = true;
            }
            voices[count] = voice;
            count += 1;
        }

        normalize_amplitudes(&mut voices);
        debug!(name = %name, voices = count, "defined preset");
        self.names.insert(NameDef { name, voices });
        Ok(())
    }

    fn parse_timeline(&mut self, line: &SourceLine) -> SequenceResult<()> {
        let mut words = line.content().split_whitespace();
        let bad_line = || line_error(line, ErrorCode::InvalidSyntax, "Bad sequence line");

        let time_word = words.next().ok_or_else(bad_line)?;
        let time = parse_time_token(time_word).ok_or_else(|| {
            line_error(
                line,
                ErrorCode::InvalidTime,
                format!("Invalid time \"{time_word}\""),
            )
        })?;

        let name = words.next().ok_or_else(bad_line)?;
        let def = self.names.get(name).ok_or_else(|| {
            line_error(
                line,
                ErrorCode::UndefinedPreset,
                format!("Preset \"{name}\" not defined"),
            )
        })?;
        if words.next().is_some() {
            return Err(bad_line());
        }

        self.ring.push_back(Period::steady(time, def.voices));
        self.ring
            .push_back(Period::transition(time, TransitionMark::Slide));
        self.entry_times.push(time);
        Ok(())
    }
}

/// A definition header is a single word that starts with a letter and is
/// made of name characters.
fn is_definition_header(content: &str) -> bool {
    if !content.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    let end = content
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(content.len());
    content[end..].is_empty() || content[end..].starts_with(char::is_whitespace)
}

/// Relative paths are tried against the working directory first, then
/// against the directory of the sequence file.
fn resolve_background(file: &Path, base_dir: Option<&Path>) -> PathBuf {
    if file.is_relative() && !file.exists() {
        if let Some(candidate) = base_dir.map(|dir| dir.join(file)) {
            if candidate.exists() {
                return candidate;
            }
        }
    }
    file.to_path_buf()
}

fn line_error(line: &SourceLine, code: ErrorCode, message: impl Into<String>) -> SequenceError {
    SequenceError::line(code, message, line.number, line.content())
}

fn attach(line: &SourceLine, err: CommandError) -> SequenceError {
    line_error(line, err.code, err.message)
}

fn empty_definition(line: &SourceLine, name: &str) -> SequenceError {
    line_error(
        line,
        ErrorCode::EmptyDefinition,
        format!("Empty definition for '{name}'. Name definitions must have at least one indented line"),
    )
}
