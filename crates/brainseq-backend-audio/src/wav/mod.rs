//! WAV container output.
//!
//! The header is written before any audio, so its lengths come from the
//! render budget rather than from the bytes actually produced.

mod format;
mod header;

#[cfg(test)]
mod tests;

pub use format::WavFormat;
pub use header::{clamp_data_len, write_header, HEADER_LEN, MAX_DATA_LEN};
