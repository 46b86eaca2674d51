//! brainseq sequence language
//!
//! This crate turns sequence files into a compiled, circular timeline of
//! voice settings. It knows nothing about audio: the backend crate walks
//! the compiled ring and synthesizes samples from it.
//!
//! # Example
//!
//! ```
//! use brainseq_sequence::Sequence;
//!
//! let seq = Sequence::parse(
//!     "alpha\n  tone 200 binaural 10 amplitude 40\n\
//!      00:00:00 silence\n\
//!      00:10:00 alpha\n\
//!      00:20:00 silence\n",
//! )
//! .unwrap();
//! assert_eq!(seq.duration_ms(), 20 * 60 * 1000);
//! print!("{}", seq.describe());
//! ```
//!
//! # Modules
//!
//! - [`time`]: 24-hour millisecond clock arithmetic
//! - [`voice`]: per-channel voice parameters
//! - [`parser`]: sequence-file reader
//! - [`ring`]: period ring and its compiler
//! - [`display`]: text rendering of voices and periods
//! - [`dump`]: JSON form of a compiled timeline

pub mod display;
pub mod dump;
pub mod error;
pub mod namedef;
pub mod options;
pub mod parser;
pub mod ring;
pub mod sequence;
pub mod time;
pub mod voice;

pub use display::{format_period, format_status, format_voice};
pub use dump::TimelineDump;
pub use error::{BackendError, ErrorCode, SequenceError, SequenceResult};
pub use namedef::{NameDef, NameTable};
pub use options::{GainLevel, SequenceOptions};
pub use parser::Parser;
pub use ring::{CompileOptions, FadeMode, Period, PeriodRing, TransitionMark};
pub use sequence::Sequence;
pub use time::{format_time, H12, H24};
pub use voice::{
    amplitude_from_percent, amplitude_to_percent, NoiseColor, Voice, VoiceKind, VoiceSet,
    Waveform, AMPLITUDE_FULL, CHANNEL_COUNT, SILENT_SET,
};
