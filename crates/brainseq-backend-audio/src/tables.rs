//! Fixed-point wave tables.
//!
//! One full cycle per table, `TABLE_SIZE` entries, peak `TABLE_AMPLITUDE`.
//! Oscillators keep a 16.16 phase and index with its integer part.

use std::f64::consts::PI;

use brainseq_sequence::Waveform;

/// Entries per table (power of two).
pub const TABLE_SIZE: usize = 16384;

/// Peak table value; a 20-bit signed range.
pub const TABLE_AMPLITUDE: i32 = 0x7FFFF;

/// Mask for a 16.16 phase accumulator covering one table cycle.
pub const PHASE_MASK: i32 = ((TABLE_SIZE as i32) << 16) - 1;

/// The four waveform tables.
#[derive(Debug, Clone)]
pub struct WaveTables {
    tables: [Vec<i32>; 4],
}

impl WaveTables {
    pub fn new() -> Self {
        Self {
            tables: Waveform::ALL.map(build_table),
        }
    }

    /// Table entry for a 16.16 phase.
    #[inline]
    pub fn sample(&self, waveform: Waveform, phase: i32) -> i32 {
        self.tables[waveform.index()][((phase & PHASE_MASK) >> 16) as usize]
    }

    /// The whole table for one waveform.
    pub fn table(&self, waveform: Waveform) -> &[i32] {
        &self.tables[waveform.index()]
    }
}

impl Default for WaveTables {
    fn default() -> Self {
        Self::new()
    }
}

fn build_table(waveform: Waveform) -> Vec<i32> {
    (0..TABLE_SIZE)
        .map(|a| {
            let phase = a as f64 * 2.0 * PI / TABLE_SIZE as f64;
            let value = match waveform {
                Waveform::Sine => phase.sin(),
                Waveform::Square => {
                    if phase.sin() >= 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                }
                Waveform::Triangle => {
                    if phase < PI {
                        2.0 * phase / PI - 1.0
                    } else {
                        3.0 - 2.0 * phase / PI
                    }
                }
                Waveform::Sawtooth => 2.0 * phase / (2.0 * PI) - 1.0,
            };
            (f64::from(TABLE_AMPLITUDE) * value) as i32
        })
        .collect()
}

/// Advances a 16.16 phase by `inc`, wrapping at one cycle.
#[inline]
pub fn advance_phase(phase: i32, inc: i32) -> i32 {
    phase.wrapping_add(inc) & PHASE_MASK
}

/// 16.16 phase increment for `freq` Hz at `rate` samples per second.
pub fn phase_increment(freq: f64, rate: u32) -> i32 {
    (freq / f64::from(rate) * TABLE_SIZE as f64 * 65536.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_landmarks() {
        let tables = WaveTables::new();
        let sine = tables.table(Waveform::Sine);
        assert_eq!(sine.len(), TABLE_SIZE);
        assert_eq!(sine[0], 0);
        assert_eq!(sine[TABLE_SIZE / 4], TABLE_AMPLITUDE);
        assert_eq!(sine[3 * TABLE_SIZE / 4], -TABLE_AMPLITUDE);
    }

    #[test]
    fn test_square_is_two_level() {
        let tables = WaveTables::new();
        let square = tables.table(Waveform::Square);
        assert!(square
            .iter()
            .all(|&v| v == TABLE_AMPLITUDE || v == -TABLE_AMPLITUDE));
        assert_eq!(square[1], TABLE_AMPLITUDE);
        assert_eq!(square[TABLE_SIZE - 1], -TABLE_AMPLITUDE);
    }

    #[test]
    fn test_triangle_and_saw_ramps() {
        let tables = WaveTables::new();
        let tri = tables.table(Waveform::Triangle);
        assert_eq!(tri[0], -TABLE_AMPLITUDE);
        assert_eq!(tri[TABLE_SIZE / 2], TABLE_AMPLITUDE);
        assert!(tri[TABLE_SIZE / 4].abs() <= 1);

        let saw = tables.table(Waveform::Sawtooth);
        assert_eq!(saw[0], -TABLE_AMPLITUDE);
        assert_eq!(saw[TABLE_SIZE / 2], 0);
        assert!(saw.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_phase_wraps() {
        let end = PHASE_MASK;
        assert_eq!(advance_phase(end, 1), 0);
        assert_eq!(advance_phase(0, -1), PHASE_MASK);
    }

    #[test]
    fn test_phase_increment_for_one_cycle_per_second() {
        // One table cycle per `rate` samples.
        let inc = phase_increment(1.0, 16384);
        assert_eq!(inc, 65536);
    }
}
