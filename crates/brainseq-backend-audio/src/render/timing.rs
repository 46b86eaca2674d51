//! Buffer geometry and the time step between buffers.

use brainseq_sequence::time::period_length_0;

/// Output buffer geometry for one sample rate.
///
/// A buffer holds `samples` interleaved values. Its duration is kept as whole
/// milliseconds plus a 16-bit fraction, so the clock stays in step with the
/// sample count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTiming {
    /// Samples per buffer, both channels, a power of two.
    pub samples: usize,
    /// Whole milliseconds per buffer.
    pub ms: u32,
    /// Fractional milliseconds per buffer, in 1/65536 ms.
    pub ms_frac: u32,
}

impl BufferTiming {
    /// Sizes buffers for `rate` Hz so that about `update_rate` of them play
    /// per second.
    pub fn new(rate: u32, update_rate: u32) -> Self {
        let mut samples = (rate as usize * 2 / update_rate.max(1) as usize).max(2);
        while samples & (samples - 1) != 0 {
            samples &= samples - 1;
        }
        let fixed = (65536.0 * 1000.0 * 0.5 * samples as f64 / f64::from(rate)) as u32;

        Self {
            samples,
            ms: fixed >> 16,
            ms_frac: fixed & 0xFFFF,
        }
    }

    /// Stereo frames per buffer.
    pub fn frames(&self) -> usize {
        self.samples / 2
    }

    /// Buffers between two status updates, about two seconds apart.
    pub fn status_interval(&self) -> u32 {
        1 + 1999 / self.ms.max(1)
    }
}

/// Byte length of a batch render from `first` to `last` ms.
pub fn batch_byte_count(first: u32, last: u32, rate: u32, bytes_per_frame: u64) -> u64 {
    let duration = period_length_0(first, last);
    bytes_per_frame * (f64::from(duration) * 0.001 * f64::from(rate)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cd_rate_geometry() {
        let timing = BufferTiming::new(44_100, 10);
        assert_eq!(timing.samples, 8192);
        assert_eq!(timing.frames(), 4096);
        assert_eq!(timing.ms, 92);
        assert_eq!(timing.ms_frac, 57_659);
        assert_eq!(timing.status_interval(), 22);
    }

    #[test]
    fn test_samples_round_down_to_power_of_two() {
        assert_eq!(BufferTiming::new(48_000, 10).samples, 8192);
        assert_eq!(BufferTiming::new(8000, 10).samples, 1024);
        assert_eq!(BufferTiming::new(96_000, 10).samples, 16_384);
    }

    #[test]
    fn test_batch_byte_count() {
        assert_eq!(batch_byte_count(0, 20_000, 44_100, 4), 3_528_000);
        assert_eq!(batch_byte_count(0, 20_000, 44_100, 2), 1_764_000);
        assert_eq!(batch_byte_count(5000, 5000, 44_100, 4), 0);
    }
}
