//! brainseq audio backend
//!
//! Synthesizes a compiled [`Sequence`](brainseq_sequence::Sequence) into
//! 16-bit or 8-bit stereo PCM.
//!
//! # Overview
//!
//! Sixteen channels each play one voice from the current period of the
//! sequence: binaural, monaural and isochronic tones, colored noise, spinning
//! noise, and a background sound with optional spin and pulse effects. Voice
//! settings are re-interpolated once per output buffer and the channels are
//! summed in fixed point, scaled by the volume and dithered down to 16 bits.
//!
//! # Determinism
//!
//! Synthesis uses fixed-point phase accumulators and small integer noise
//! generators with fixed seeds, so a batch render of the same sequence is
//! byte-identical on every run. [`RenderReport::pcm_hash`] carries a BLAKE3
//! hash of the payload for checking this.
//!
//! # Example
//!
//! ```
//! use brainseq_backend_audio::{NullObserver, RenderSettings, Renderer};
//! use brainseq_sequence::Sequence;
//!
//! let seq = Sequence::parse(
//!     "alpha\n  tone 200 binaural 10 amplitude 40\n\
//!      00:00:00 alpha\n\
//!      00:00:01 alpha\n",
//! )
//! .unwrap();
//! let mut wav = Vec::new();
//! let report = Renderer::new(&seq, RenderSettings::default())
//!     .unwrap()
//!     .run(&mut wav, &mut NullObserver)
//!     .unwrap();
//! assert_eq!(report.bytes, 176_400);
//! ```
//!
//! # Crate Structure
//!
//! - [`engine`]: per-channel synthesis and the mix-down
//! - [`render`]: buffer pump, sample formats and the real-time clock
//! - [`mix`]: threaded read-ahead of the background stream
//! - [`background`]: WAV and raw background files
//! - [`wav`]: streaming WAV header
//! - [`tables`], [`noise`], [`rng`]: waveform tables and noise sources

pub mod background;
pub mod engine;
pub mod error;
pub mod mix;
pub mod noise;
pub mod render;
pub mod rng;
pub mod tables;
pub mod wav;

pub use background::BackgroundFile;
pub use engine::{Engine, EngineEvent};
pub use error::{AudioError, AudioResult, MixError};
pub use mix::{MixBuffer, MixSource};
pub use render::{
    pick_sample_rate, Container, NullObserver, RenderMode, RenderObserver, RenderReport,
    RenderSettings, Renderer, SampleFormat, SystemClock, TimeSource,
};
