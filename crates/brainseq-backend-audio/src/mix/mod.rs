//! Background stream buffering.
//!
//! A producer thread decodes the background source ahead of the synthesis
//! thread into a single-producer single-consumer ring, so file reads never
//! stall rendering.

mod buffer;


pub use buffer::{MixBuffer, MIX_BUFFER_LEN};

use crate::error::MixError;

/// Producer of interleaved stereo background samples, scaled to 20 bits.
pub trait MixSource: Send {
    /// Fills `dst` from the stream and returns the number of samples written.
    ///
    /// Returns fewer than `dst.len()` only at the end of the stream.
    fn read(&mut self, dst: &mut [i32]) -> Result<usize, MixError>;

    /// Rewinds to the start of the stream. `Ok(false)` when the source
    /// cannot be replayed.
    fn restart(&mut self) -> Result<bool, MixError>;
}
