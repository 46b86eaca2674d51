//! Error types for sequence parsing and compilation.

use std::path::PathBuf;

use thiserror::Error;

/// Stable error codes for sequence diagnostics.
///
/// `S0xx` codes are raised while reading a line, `T0xx` codes while
/// validating the compiled timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// S001: Unknown `@` option, malformed option value, or option in the wrong place
    InvalidOption,
    /// S002: Preset name contains characters other than alphanumerics, `-` and `_`
    InvalidName,
    /// S003: Attempt to redefine the built-in `silence` preset
    ReservedName,
    /// S004: Malformed line (missing keyword, wrong field count, trailing tokens)
    InvalidSyntax,
    /// S005: Definition line not indented by exactly two spaces
    InvalidIndentation,
    /// S006: Definition header without any command lines
    EmptyDefinition,
    /// S007: More than 16 voices in one definition
    TooManyVoices,
    /// S008: Unknown command, noise color, tone mode, effect or waveform
    UnknownKeyword,
    /// S009: Numeric value outside its accepted range
    ValueOutOfRange,
    /// S010: Token that should be a number is not one
    InvalidNumber,
    /// S011: `effect` voice in a definition without a `background` voice
    EffectWithoutBackground,
    /// S012: Timeline entry references an unknown preset
    UndefinedPreset,
    /// S013: Malformed timeline time
    InvalidTime,
    /// S014: `@background` given more than once
    DuplicateBackground,

    /// T001: Fewer than two timeline entries
    TooFewTimes,
    /// T002: Timeline entries are not in ascending order
    OutOfOrder,
    /// T003: Two timeline entries share the same time
    DuplicateTime,
    /// T004: First timeline entry is not at 00:00:00
    MissingStart,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "S001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidOption => "S001",
            ErrorCode::InvalidName => "S002",
            ErrorCode::ReservedName => "S003",
            ErrorCode::InvalidSyntax => "S004",
            ErrorCode::InvalidIndentation => "S005",
            ErrorCode::EmptyDefinition => "S006",
            ErrorCode::TooManyVoices => "S007",
            ErrorCode::UnknownKeyword => "S008",
            ErrorCode::ValueOutOfRange => "S009",
            ErrorCode::InvalidNumber => "S010",
            ErrorCode::EffectWithoutBackground => "S011",
            ErrorCode::UndefinedPreset => "S012",
            ErrorCode::InvalidTime => "S013",
            ErrorCode::DuplicateBackground => "S014",
            ErrorCode::TooFewTimes => "T001",
            ErrorCode::OutOfOrder => "T002",
            ErrorCode::DuplicateTime => "T003",
            ErrorCode::MissingStart => "T004",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result type for sequence operations.
pub type SequenceResult<T> = Result<T, SequenceError>;

/// Fatal errors raised while reading or compiling a sequence.
///
/// Parsing stops at the first error; there is no multi-error collection.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// A line could not be accepted.
    #[error("{code}: {message}, line {line}:\n  {text}")]
    Line {
        /// The error code.
        code: ErrorCode,
        /// Human-readable message.
        message: String,
        /// 1-based line number within its source.
        line: usize,
        /// Raw text of the offending line.
        text: String,
    },

    /// The compiled timeline failed validation.
    #[error("{code}: {message}")]
    Timeline {
        /// The error code.
        code: ErrorCode,
        /// Human-readable message, with times as HH:MM:SS.
        message: String,
    },

    /// A sequence source could not be read.
    #[error("cannot read sequence file {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SequenceError {
    /// Creates a line error.
    pub fn line(
        code: ErrorCode,
        message: impl Into<String>,
        line: usize,
        text: impl Into<String>,
    ) -> Self {
        Self::Line {
            code,
            message: message.into(),
            line,
            text: text.into(),
        }
    }

    /// Creates a timeline validation error.
    pub fn timeline(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Timeline {
            code,
            message: message.into(),
        }
    }

    /// Returns the error code, if the error carries one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SequenceError::Line { code, .. } | SequenceError::Timeline { code, .. } => Some(*code),
            SequenceError::Io { .. } => None,
        }
    }
}

/// Common interface for errors raised by synthesis backends.
///
/// Lets the CLI report backend failures uniformly without knowing each
/// backend's error type.
pub trait BackendError: std::error::Error {
    /// Stable code such as `AUDIO_001`.
    fn code(&self) -> &'static str;

    /// Human-readable message; the `Display` text by default.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error group, e.g. `audio` or `mix`.
    fn category(&self) -> &'static str;
}
