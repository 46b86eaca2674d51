//! Per-frame mixing of all channels into one stereo sample pair.
//!
//! Channel outputs are summed in 32-bit fixed point with 16 bits of headroom
//! below the output sample; overflow wraps.

use brainseq_sequence::{NoiseColor, Voice};

use super::Engine;
use crate::noise::{cross_pan, pan_position, spin};
use crate::tables::{advance_phase, TABLE_AMPLITUDE};

/// Level below which the pulse gate is closed, as a fraction of full scale.
const GATE_THRESHOLD: f64 = 0.3;

/// Share of the background level used by the background effects.
const EFFECT_LEVEL: f64 = 0.7;

/// Dither is skipped above this total so it cannot wrap.
const DITHER_CEILING: i32 = 0x7FFF_0000;

/// Smoothed on/off gate for isochronic pulses.
///
/// Closed while the modulator is below 30% of full scale; above that the
/// remaining range is mapped to `0..=1` and eased with `f²(3 - 2f)`.
pub fn pulse_gate(modulator: i32) -> f64 {
    let full = f64::from(TABLE_AMPLITUDE);
    let threshold = full * GATE_THRESHOLD;
    if f64::from(modulator) > threshold {
        let f = (f64::from(modulator) - threshold) / (full * (1.0 - GATE_THRESHOLD));
        f * f * (3.0 - 2.0 * f)
    } else {
        0.0
    }
}

impl Engine<'_> {
    pub(super) fn next_frame(&mut self, mix1: i32, mix2: i32) -> (i16, i16) {
        // Pink advances every frame; the pink spinner reads its history.
        let pink = self.noise.pink();
        let gain = self.gain;

        let (mut tot1, mut tot2) = if self.mix_direct {
            (
                ((f64::from(mix1) * gain) as i32) << 12,
                ((f64::from(mix2) * gain) as i32) << 12,
            )
        } else {
            (0, 0)
        };

        let mix_amp = self
            .mix_amp_channel
            .map_or(4096.0, |idx| self.channels[idx].voice.amplitude());

        let Self {
            channels,
            tables,
            noise,
            ..
        } = self;

        for ch in channels.iter_mut() {
            match ch.voice {
                Voice::Off => {}
                Voice::Binaural { waveform, .. } => {
                    ch.off1 = advance_phase(ch.off1, ch.inc1);
                    ch.off2 = advance_phase(ch.off2, ch.inc2);
                    tot1 = tot1.wrapping_add(ch.amp.wrapping_mul(tables.sample(waveform, ch.off1)));
                    tot2 = tot2.wrapping_add(ch.amp2.wrapping_mul(tables.sample(waveform, ch.off2)));
                }
                Voice::Monaural { waveform, .. } => {
                    ch.off1 = advance_phase(ch.off1, ch.inc1);
                    ch.off2 = advance_phase(ch.off2, ch.inc2);
                    let both = tables.sample(waveform, ch.off1) + tables.sample(waveform, ch.off2);
                    let val = (ch.amp / 2).wrapping_mul(both);
                    tot1 = tot1.wrapping_add(val);
                    tot2 = tot2.wrapping_add(val);
                }
                Voice::Isochronic { waveform, .. } => {
                    ch.off1 = advance_phase(ch.off1, ch.inc1);
                    ch.off2 = advance_phase(ch.off2, ch.inc2);
                    let gate = pulse_gate(tables.sample(waveform, ch.off2));
                    let carrier = ch.amp.wrapping_mul(tables.sample(waveform, ch.off1));
                    let val = (f64::from(carrier) * gate) as i32;
                    tot1 = tot1.wrapping_add(val);
                    tot2 = tot2.wrapping_add(val);
                }
                Voice::Noise { color, .. } => {
                    let base = match color {
                        NoiseColor::Pink => pink,
                        NoiseColor::White => noise.white(),
                        NoiseColor::Brown => noise.brown(),
                    };
                    let val = base.wrapping_mul(ch.amp);
                    tot1 = tot1.wrapping_add(val);
                    tot2 = tot2.wrapping_add(val);
                }
                Voice::Spin {
                    color, waveform, ..
                } => {
                    ch.off1 = advance_phase(ch.off1, ch.inc1);
                    let position = ch.inc2.wrapping_mul(tables.sample(waveform, ch.off1)) >> 24;
                    let (l, r) = spin(noise.spin_source(color), ch.amp, position);
                    tot1 = tot1.wrapping_add(l);
                    tot2 = tot2.wrapping_add(r);
                }
                Voice::Background { .. } => {
                    let level = (f64::from(ch.amp) * gain) as i32;
                    tot1 = tot1.wrapping_add(mix1.wrapping_mul(level));
                    tot2 = tot2.wrapping_add(mix2.wrapping_mul(level));
                }
                Voice::EffectSpin { waveform, .. } => {
                    ch.off1 = advance_phase(ch.off1, ch.inc1);
                    let position = ch.inc2.wrapping_mul(tables.sample(waveform, ch.off1)) >> 24;
                    let intensity = 0.5 + f64::from(ch.amp) / 4096.0 * 3.5;
                    let (l, r) = cross_pan(mix1, mix2, pan_position(position, intensity));
                    let level = (f64::from(mix_amp as i32) * EFFECT_LEVEL * gain) as i32;
                    tot1 = tot1.wrapping_add(level.wrapping_mul((f64::from(l) * gain) as i32));
                    tot2 = tot2.wrapping_add(level.wrapping_mul((f64::from(r) * gain) as i32));
                }
                Voice::EffectPulse { waveform, .. } => {
                    ch.off2 = advance_phase(ch.off2, ch.inc2);
                    let gate = pulse_gate(tables.sample(waveform, ch.off2));
                    let level = (mix_amp * EFFECT_LEVEL * gain) as i32;
                    let depth = f64::from(ch.amp) / 4096.0 * 1.5;
                    let factor = (1.0 - depth) + depth * gate;
                    let l = level.wrapping_mul((f64::from(mix1) * gain) as i32);
                    let r = level.wrapping_mul((f64::from(mix2) * gain) as i32);
                    tot1 = (f64::from(tot1) + f64::from(l) * factor) as i32;
                    tot2 = (f64::from(tot2) + f64::from(r) * factor) as i32;
                }
            }
        }

        if self.volume != 100 {
            let volume = i64::from(self.volume);
            tot1 = ((i64::from(tot1) * volume + 50) / 100) as i32;
            tot2 = ((i64::from(tot2) * volume + 50) / 100) as i32;
        }

        let dither = self.dither.next_value();
        if tot1 <= DITHER_CEILING {
            tot1 += dither;
        }
        if tot2 <= DITHER_CEILING {
            tot2 += dither;
        }

        ((tot1 >> 16) as i16, (tot2 >> 16) as i16)
    }
}
