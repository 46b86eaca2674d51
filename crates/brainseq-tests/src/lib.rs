//! brainseq End-to-End Test Infrastructure
//!
//! Integration tests for whole-pipeline behavior:
//!
//! - Rendering: sequence text -> WAV bytes with the expected length and content
//! - Errors: bad sequences fail before any output is written
//! - **Determinism**: repeated renders are byte-identical
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p brainseq-tests
//! ```
//!
//! ## Helpers
//!
//! ```rust,ignore
//! use brainseq_tests::fixtures::{render_wav, TONE_440};
//! use brainseq_tests::audio_analysis::{parse_wav, estimate_frequency};
//!
//! let wav = parse_wav(&render_wav(TONE_440)).unwrap();
//! let left = wav.left();
//! println!("{:.1} Hz", estimate_frequency(&left, wav.header.sample_rate));
//! ```

pub mod audio_analysis;
pub mod determinism;
pub mod fixtures;

pub use determinism::{verify_determinism, DeterminismResult, DiffInfo};
