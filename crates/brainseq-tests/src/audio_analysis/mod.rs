//! Audio analysis helpers for checking rendered output.
//!
//! Rendered WAV bytes are parsed into a header and normalized samples, which
//! the signal functions then measure.
//!
//! ## Example
//!
//! ```rust
//! use brainseq_tests::audio_analysis::{calculate_rms, is_silent};
//!
//! let silence = vec![0.0f32; 100];
//! assert_eq!(calculate_rms(&silence), 0.0);
//! assert!(is_silent(&silence, 0.001));
//! ```

mod error;
mod signal;
mod wav;

#[cfg(test)]
mod tests;

pub use error::AudioAnalysisError;
pub use signal::{
    calculate_rms, estimate_frequency, is_silent, largest_step, peak_amplitude, zero_crossings,
};
pub use wav::{parse_wav, parse_wav_header, DecodedWav, WavHeader};
