//! Deterministic integer generators.
//!
//! Synthesis must be byte-identical from run to run, so the noise source and
//! the output dither use fixed linear congruential sequences instead of a
//! seeded library RNG.

/// Noise source: `seed = seed * 75 % 131074`, yielding values in
/// `-65535..=65535`.
///
/// Starting from 2 the sequence is a closed cycle of odd offsets.
#[derive(Debug, Clone)]
pub struct NoiseRng {
    seed: i32,
}

impl NoiseRng {
    const MULTIPLIER: i32 = 75;
    const MODULUS: i32 = 131_074;

    pub fn new() -> Self {
        Self { seed: 2 }
    }

    /// Next draw.
    #[inline]
    pub fn next_value(&mut self) -> i32 {
        self.seed = self.seed * Self::MULTIPLIER % Self::MODULUS;
        self.seed - 65535
    }
}

impl Default for NoiseRng {
    fn default() -> Self {
        Self::new()
    }
}

/// Dither source: a 16-bit LCG whose previous output is added below the
/// output bit depth.
#[derive(Debug, Clone, Default)]
pub struct Dither {
    r0: i32,
    r1: i32,
}

impl Dither {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps the generator and returns the dither value for this frame.
    #[inline]
    pub fn next_value(&mut self) -> i32 {
        self.r0 = self.r1;
        self.r1 = (self.r0 * 0x660D + 0xF35F) & 0xFFFF;
        self.r0
    }
}
