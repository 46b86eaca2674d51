//! Channel synthesis engine.
//!
//! [`Engine::update`] positions the engine in the period ring and sets every
//! channel's phase increments for the current instant.
//! [`Engine::render_chunk`] then synthesizes interleaved stereo frames with
//! those settings. Parameters are recomputed once per buffer, not per frame.

mod frame;

#[cfg(test)]
mod tests;

use brainseq_sequence::time::{in_interval, period_length_0, period_length_24};
use brainseq_sequence::{GainLevel, Sequence, Voice, VoiceKind, VoiceSet, CHANNEL_COUNT};
use tracing::debug;

use crate::error::{AudioError, AudioResult};
use crate::noise::NoiseBank;
use crate::rng::Dither;
use crate::tables::{phase_increment, WaveTables, TABLE_AMPLITUDE};

pub use frame::pulse_gate;

/// Notifications raised while the engine moves through the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine entered the period at this ring index.
    PeriodChanged { period: usize },
}

/// Oscillator state of one channel.
#[derive(Debug, Clone, Copy, Default)]
struct Channel {
    /// Interpolated settings for the current buffer.
    voice: Voice,
    amp: i32,
    amp2: i32,
    inc1: i32,
    inc2: i32,
    off1: i32,
    off2: i32,
}

impl Channel {
    /// Derives the fixed-point amplitude and increments from `self.voice`.
    fn apply(&mut self, rate: u32) {
        let amp = self.voice.amplitude() as i32;
        match self.voice {
            Voice::Off => {}
            Voice::Binaural { carrier, beat, .. } => {
                self.amp = amp;
                self.amp2 = amp;
                self.inc1 = phase_increment(carrier + beat / 2.0, rate);
                self.inc2 = phase_increment(carrier - beat / 2.0, rate);
            }
            Voice::Monaural { carrier, beat, .. } => {
                self.amp = amp;
                self.inc1 = phase_increment(carrier + beat / 2.0, rate);
                self.inc2 = phase_increment(carrier - beat / 2.0, rate);
            }
            Voice::Isochronic { carrier, pulse, .. } => {
                self.amp = amp;
                self.inc1 = phase_increment(carrier, rate);
                self.inc2 = phase_increment(pulse, rate);
            }
            Voice::Noise { .. } | Voice::Background { .. } => self.amp = amp,
            Voice::Spin { width, rate: hz, .. } | Voice::EffectSpin { width, rate: hz, .. } => {
                self.amp = amp;
                self.inc1 = phase_increment(hz, rate);
                self.inc2 = spin_depth(width, rate);
            }
            Voice::EffectPulse { pulse, .. } => {
                self.amp = amp;
                self.inc2 = phase_increment(pulse, rate);
            }
        }
    }
}

/// Fixed-point pan depth for a spin width in microseconds.
///
/// Scaled so that `(depth * table_sample) >> 24` is the pan position.
fn spin_depth(width_us: f64, rate: u32) -> i32 {
    (width_us * 1e-6 * f64::from(rate) * f64::from(1u32 << 24) / f64::from(TABLE_AMPLITUDE)) as i32
}

/// Everything the synthesis thread touches while rendering one sequence.
#[derive(Debug, Clone)]
pub struct Engine<'s> {
    sequence: &'s Sequence,
    period: usize,
    rate: u32,
    channels: [Channel; CHANNEL_COUNT],
    tables: WaveTables,
    noise: NoiseBank,
    dither: Dither,
    /// Linear background gain from the gain level.
    gain: f64,
    /// Global volume in percent.
    volume: i32,
    /// Largest spin width, in microseconds, the pan range can express.
    spin_limit: f64,
    /// Channel whose amplitude scales the background effects.
    mix_amp_channel: Option<usize>,
    /// Add the background at full level when no preset mixes it explicitly.
    mix_direct: bool,
}

impl<'s> Engine<'s> {
    /// Creates an engine for `sequence` producing `rate` frames per second.
    pub fn new(sequence: &'s Sequence, rate: u32) -> AudioResult<Self> {
        if rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate });
        }
        let options = sequence.options();
        let spin_limit = 127.0 / 1e-6 / f64::from(rate);
        debug!(rate, spin_limit, "engine ready");

        Ok(Self {
            sequence,
            period: sequence.earliest(),
            rate,
            channels: [Channel::default(); CHANNEL_COUNT],
            tables: WaveTables::new(),
            noise: NoiseBank::new(),
            dither: Dither::new(),
            gain: options.gain_level.gain_factor(),
            volume: i32::from(options.volume),
            spin_limit,
            mix_amp_channel: None,
            mix_direct: !sequence.uses_background(),
        })
    }

    pub fn sequence(&self) -> &'s Sequence {
        self.sequence
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Ring index of the current period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Current interpolated voice of every channel.
    pub fn voices(&self) -> VoiceSet {
        self.channels.map(|ch| ch.voice)
    }

    /// Changes the background gain level.
    pub fn set_gain_level(&mut self, level: GainLevel) {
        self.gain = level.gain_factor();
    }

    /// Changes the global volume, clamped to 100.
    pub fn set_volume(&mut self, percent: u8) {
        self.volume = i32::from(percent.min(100));
    }

    /// Positions the engine at `now` without reporting period changes.
    pub fn seek(&mut self, now: u32) {
        self.update(now, &mut |_| {});
    }

    /// Recomputes every channel for the instant `now`.
    ///
    /// Steps forward through the ring until `now` falls inside the current
    /// period, reporting each step, then blends the period's start and end
    /// voices by the elapsed fraction.
    pub fn update(&mut self, now: u32, events: &mut dyn FnMut(EngineEvent)) {
        let sequence = self.sequence;
        let ring = sequence.ring();
        let (t0, t1) = loop {
            let t0 = ring.get(self.period).time;
            let t1 = sequence.period_end(self.period);
            if in_interval(now, t0, t1) {
                break (t0, t1);
            }
            self.period = ring.next(self.period);
            events(EngineEvent::PeriodChanged {
                period: self.period,
            });
        };

        let ratio = f64::from(period_length_0(t0, now)) / f64::from(period_length_24(t0, t1));
        let period = ring.get(self.period);
        for (idx, ch) in self.channels.iter_mut().enumerate() {
            if self.mix_amp_channel.is_none() && ch.voice.kind() == VoiceKind::Background {
                self.mix_amp_channel = Some(idx);
            }

            let v0 = &period.start[idx];
            let v1 = &period.end[idx];
            if ch.voice.kind() != v0.kind() {
                ch.off1 = 0;
                ch.off2 = 0;
            }
            ch.voice = Voice::lerp(v0, v1, ratio).with_width_limit(self.spin_limit);
            ch.apply(self.rate);
        }
    }

    /// Fills `out` with interleaved stereo samples.
    ///
    /// `mix` holds the background frames for the same span, interleaved and
    /// scaled to 20 bits; it must be as long as `out`.
    pub fn render_chunk(&mut self, mix: &[i32], out: &mut [i16]) {
        for (m, o) in mix.chunks_exact(2).zip(out.chunks_exact_mut(2)) {
            let (left, right) = self.next_frame(m[0], m[1]);
            o[0] = left;
            o[1] = right;
        }
    }
}
