//! Pink, white and brown noise, plus the spin panner.
//!
//! All three colours share one [`NoiseRng`] and are scaled to the wave-table
//! amplitude so channel mixing can treat them like oscillators.

use brainseq_sequence::NoiseColor;

use crate::rng::NoiseRng;
use crate::tables::TABLE_AMPLITUDE;

/// Bands of the pink-noise generator.
const BANDS: usize = 9;

/// Extra headroom bits the pink generator works with internally.
const PINK_SHIFT: u32 = 12;

/// Internal pink amplitude, `TABLE_AMPLITUDE << PINK_SHIFT`.
const PINK_AMPLITUDE: i64 = (TABLE_AMPLITUDE as i64) << PINK_SHIFT;

/// Scale from one draw to one pink band.
const PINK_STEP: i64 = PINK_AMPLITUDE / 65535 / (BANDS as i64 + 1);

/// Scale from one draw to table amplitude.
const DRAW_SCALE: i32 = TABLE_AMPLITUDE / 65535;

#[derive(Debug, Clone, Copy, Default)]
struct Band {
    value: i64,
    step: i64,
}

/// Noise generator state for one render.
#[derive(Debug, Clone)]
pub struct NoiseBank {
    rng: NoiseRng,
    bands: [Band; BANDS],
    counter: u32,
    history: [i32; 256],
    cursor: u8,
    brown_last: i32,
}

impl NoiseBank {
    pub fn new() -> Self {
        Self {
            rng: NoiseRng::new(),
            bands: [Band::default(); BANDS],
            counter: 0,
            history: [0; 256],
            cursor: 0,
            brown_last: 0,
        }
    }

    /// Next pink sample.
    ///
    /// Band `k` is refreshed every `2^(k+1)` samples and slides linearly to
    /// its new value in between, so lower bands carry lower frequencies. Every
    /// sample is also kept in a 256-entry history for the pink spinner.
    pub fn pink(&mut self) -> i32 {
        let off = self.counter;
        self.counter = self.counter.wrapping_add(1);
        let mut cnt: u32 = 1;

        let mut total = i64::from(self.rng.next_value()) * PINK_STEP;
        let mut band = 0;
        while cnt & off != 0 && band < BANDS {
            let target = i64::from(self.rng.next_value()) * PINK_STEP;
            cnt += cnt;
            let b = &mut self.bands[band];
            b.step = (target - b.value) / i64::from(cnt);
            b.value += b.step;
            total += b.value;
            band += 1;
        }
        for b in &mut self.bands[band..] {
            b.value += b.step;
            total += b.value;
        }

        let sample = (total >> PINK_SHIFT) as i32;
        self.history[usize::from(self.cursor)] = sample;
        self.cursor = self.cursor.wrapping_add(1);
        sample
    }

    /// Next white sample.
    pub fn white(&mut self) -> i32 {
        self.rng.next_value() * DRAW_SCALE
    }

    /// Next brown sample: a leaky random walk clamped to the draw range.
    pub fn brown(&mut self) -> i32 {
        let draw = self.rng.next_value();
        let walked = (f64::from(self.brown_last + draw / 16) * 0.9) as i32;
        self.brown_last = walked.clamp(-65535, 65535);
        self.brown_last * DRAW_SCALE
    }

    /// Pink sample from half the history ago, decorrelated from the current
    /// frame's pink output.
    pub fn pink_delayed(&self) -> i32 {
        self.history[usize::from(self.cursor.wrapping_add(128))]
    }

    /// Base sample for a spinning channel of the given colour.
    pub fn spin_source(&mut self, color: NoiseColor) -> i32 {
        match color {
            NoiseColor::Pink => self.pink_delayed(),
            NoiseColor::White => self.white(),
            NoiseColor::Brown => self.brown(),
        }
    }
}

impl Default for NoiseBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps a scaled pan position to the signed 8-bit range.
pub fn pan_position(position: i32, intensity: f64) -> i32 {
    ((f64::from(position) * intensity) as i32).clamp(-128, 127)
}

/// Pans a stereo pair by `pan` in `-128..=127`.
///
/// At zero both sides pass unchanged. Moving right fades the left side and
/// folds it into the right, and the reverse for negative values.
pub fn cross_pan(left: i32, right: i32, pan: i32) -> (i32, i32) {
    let p = pan.abs();
    if pan >= 0 {
        (
            left.wrapping_mul(128 - p) >> 7,
            right.wrapping_add(left.wrapping_mul(p) >> 7),
        )
    } else {
        (
            left.wrapping_add(right.wrapping_mul(p) >> 7),
            right.wrapping_mul(128 - p) >> 7,
        )
    }
}

/// Spins a mono noise sample across the stereo field and scales it by `amp`.
pub fn spin(base: i32, amp: i32, position: i32) -> (i32, i32) {
    let (l, r) = cross_pan(base, base, pan_position(position, 1.5));
    (amp.wrapping_mul(l), amp.wrapping_mul(r))
}
