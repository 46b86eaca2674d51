//! Error types for the audio backend.

use std::path::PathBuf;

use brainseq_sequence::BackendError;
use thiserror::Error;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Invalid render setting.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Setting name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The background file could not be opened.
    #[error("Can't open background file: {}\n  {source}", path.display())]
    BackgroundOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure in the background stream.
    #[error(transparent)]
    Mix(#[from] MixError),

    /// Output I/O error.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl BackendError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::InvalidSampleRate { .. } => "AUDIO_001",
            AudioError::InvalidParameter { .. } => "AUDIO_002",
            AudioError::BackgroundOpen { .. } => "AUDIO_003",
            AudioError::Mix(err) => err.code(),
            AudioError::Io(_) => "AUDIO_004",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            AudioError::Mix(_) => "mix",
            _ => "audio",
        }
    }
}

/// Errors raised by the background stream and its buffer.
#[derive(Debug, Error)]
pub enum MixError {
    /// The consumer waited too long for data.
    #[error("Mix stream problem; waited more than 10 seconds for data; aborting")]
    Starved,

    /// The producer could not push data for too long and gave up.
    #[error("Mix stream halted for more than 10 seconds; aborting")]
    ProducerHalted,

    /// The background file uses a sample depth other than 16 or 24 bits.
    #[error("Unsupported WAV format: {bits} bits per sample")]
    UnsupportedBitDepth { bits: u16 },

    /// The decoder rejected the stream after the header was accepted.
    #[error("Decode error on mix input:\n  {0}")]
    Decode(String),

    /// The source could not be read.
    #[error("Read error on mix input:\n  {0}")]
    Read(#[from] std::io::Error),

    /// The producer thread could not be started or panicked.
    #[error("Failed to start input buffering thread")]
    Thread,
}

impl From<hound::Error> for MixError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => MixError::Read(io),
            other => MixError::Decode(other.to_string()),
        }
    }
}

impl BackendError for MixError {
    fn code(&self) -> &'static str {
        match self {
            MixError::Starved => "MIX_001",
            MixError::ProducerHalted => "MIX_002",
            MixError::UnsupportedBitDepth { .. } => "MIX_003",
            MixError::Decode(_) => "MIX_004",
            MixError::Read(_) => "MIX_005",
            MixError::Thread => "MIX_006",
        }
    }

    fn category(&self) -> &'static str {
        "mix"
    }
}
