//! Errors raised while parsing WAV data.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioAnalysisError {
    #[error("WAV data too short: expected at least {expected} bytes, got {actual}")]
    DataTooShort { expected: usize, actual: usize },

    #[error("Invalid or missing RIFF/WAVE header")]
    InvalidHeader,

    #[error("Missing {0} chunk in WAV file")]
    MissingChunk(&'static str),

    #[error("Unsupported audio format code: {0} (only PCM/1 supported)")]
    UnsupportedFormat(u16),

    #[error("Unsupported bits per sample: {0} (only 8 and 16 supported)")]
    UnsupportedBits(u16),
}
