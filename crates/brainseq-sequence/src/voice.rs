//! Voice parameters for one channel slot.
//!
//! A [`Voice`] is a snapshot of one channel's settings at an instant. Each
//! variant carries only the fields its channel kind uses. Amplitudes (and
//! effect intensities) are stored on the internal `0..=4096` scale; use
//! [`amplitude_from_percent`] and [`amplitude_to_percent`] at the text
//! boundary.

use serde::Serialize;

/// Number of channel slots in a voice set.
pub const CHANNEL_COUNT: usize = 16;

/// Full-scale internal amplitude (100%).
pub const AMPLITUDE_FULL: f64 = 4096.0;

const PERCENT_SCALE: f64 = 40.96;

/// Converts a 0-100 percentage to the internal amplitude scale.
pub fn amplitude_from_percent(percent: f64) -> f64 {
    PERCENT_SCALE * percent
}

/// Converts an internal amplitude back to a 0-100 percentage.
pub fn amplitude_to_percent(amplitude: f64) -> f64 {
    amplitude / PERCENT_SCALE
}

/// Oscillator waveform shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// All waveforms, in table order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    /// Index of this waveform's lookup table.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Keyword used in sequence files.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }

    /// Parses a sequence-file keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.name() == name)
    }
}

/// Noise color used by plain noise and spin voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    Pink,
    White,
    Brown,
}

impl NoiseColor {
    /// Keyword used in sequence files.
    pub fn name(self) -> &'static str {
        match self {
            NoiseColor::Pink => "pink",
            NoiseColor::White => "white",
            NoiseColor::Brown => "brown",
        }
    }

    /// Parses a sequence-file keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pink" => Some(NoiseColor::Pink),
            "white" => Some(NoiseColor::White),
            "brown" => Some(NoiseColor::Brown),
            _ => None,
        }
    }
}

/// The thirteen channel kinds, with their stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceKind {
    Off = 0,
    Binaural = 1,
    PinkNoise = 2,
    Monaural = 3,
    SpinPink = 4,
    Background = 5,
    EffectSpin = 6,
    EffectPulse = 7,
    Isochronic = 8,
    WhiteNoise = 9,
    BrownNoise = 10,
    SpinBrown = 11,
    SpinWhite = 12,
}

impl VoiceKind {
    /// Numeric code of this kind.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True for kinds that pan noise with a slow rotation oscillator.
    pub fn is_spin(self) -> bool {
        matches!(
            self,
            VoiceKind::SpinPink | VoiceKind::SpinBrown | VoiceKind::SpinWhite | VoiceKind::EffectSpin
        )
    }

    /// True for the two kinds that modulate the background stream.
    pub fn is_background_effect(self) -> bool {
        matches!(self, VoiceKind::EffectSpin | VoiceKind::EffectPulse)
    }
}

/// One channel's synthesis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Voice {
    /// Channel is silent.
    #[default]
    Off,
    /// Carrier split into `carrier ± beat/2`, one frequency per ear.
    Binaural {
        amplitude: f64,
        carrier: f64,
        beat: f64,
        waveform: Waveform,
    },
    /// Both frequencies of a beat summed into both ears.
    Monaural {
        amplitude: f64,
        carrier: f64,
        beat: f64,
        waveform: Waveform,
    },
    /// Carrier gated on and off at the pulse rate.
    Isochronic {
        amplitude: f64,
        carrier: f64,
        pulse: f64,
        waveform: Waveform,
    },
    /// Plain noise.
    Noise { color: NoiseColor, amplitude: f64 },
    /// Noise panned left and right; `width` is in microseconds.
    Spin {
        color: NoiseColor,
        amplitude: f64,
        width: f64,
        rate: f64,
        waveform: Waveform,
    },
    /// Background stream mixed at this level.
    Background { amplitude: f64 },
    /// Background stream panned left and right.
    EffectSpin {
        intensity: f64,
        width: f64,
        rate: f64,
        waveform: Waveform,
    },
    /// Background stream gated at the pulse rate.
    EffectPulse {
        intensity: f64,
        pulse: f64,
        waveform: Waveform,
    },
}

impl Voice {
    /// The channel kind of this voice.
    pub fn kind(&self) -> VoiceKind {
        match self {
            Voice::Off => VoiceKind::Off,
            Voice::Binaural { .. } => VoiceKind::Binaural,
            Voice::Monaural { .. } => VoiceKind::Monaural,
            Voice::Isochronic { .. } => VoiceKind::Isochronic,
            Voice::Noise { color, .. } => match color {
                NoiseColor::Pink => VoiceKind::PinkNoise,
                NoiseColor::White => VoiceKind::WhiteNoise,
                NoiseColor::Brown => VoiceKind::BrownNoise,
            },
            Voice::Spin { color, .. } => match color {
                NoiseColor::Pink => VoiceKind::SpinPink,
                NoiseColor::White => VoiceKind::SpinWhite,
                NoiseColor::Brown => VoiceKind::SpinBrown,
            },
            Voice::Background { .. } => VoiceKind::Background,
            Voice::EffectSpin { .. } => VoiceKind::EffectSpin,
            Voice::EffectPulse { .. } => VoiceKind::EffectPulse,
        }
    }

    /// Returns true for [`Voice::Off`].
    pub fn is_off(&self) -> bool {
        matches!(self, Voice::Off)
    }

    /// Amplitude on the internal scale; intensity for the effect kinds.
    pub fn amplitude(&self) -> f64 {
        match *self {
            Voice::Off => 0.0,
            Voice::Binaural { amplitude, .. }
            | Voice::Monaural { amplitude, .. }
            | Voice::Isochronic { amplitude, .. }
            | Voice::Noise { amplitude, .. }
            | Voice::Spin { amplitude, .. }
            | Voice::Background { amplitude } => amplitude,
            Voice::EffectSpin { intensity, .. } | Voice::EffectPulse { intensity, .. } => intensity,
        }
    }

    /// Returns a copy with the amplitude (or intensity) replaced.
    pub fn with_amplitude(mut self, value: f64) -> Self {
        match &mut self {
            Voice::Off => {}
            Voice::Binaural { amplitude, .. }
            | Voice::Monaural { amplitude, .. }
            | Voice::Isochronic { amplitude, .. }
            | Voice::Noise { amplitude, .. }
            | Voice::Spin { amplitude, .. }
            | Voice::Background { amplitude } => *amplitude = value,
            Voice::EffectSpin { intensity, .. } | Voice::EffectPulse { intensity, .. } => {
                *intensity = value
            }
        }
        self
    }

    /// Waveform of the voice's oscillator; sine for kinds without one.
    pub fn waveform(&self) -> Waveform {
        match *self {
            Voice::Binaural { waveform, .. }
            | Voice::Monaural { waveform, .. }
            | Voice::Isochronic { waveform, .. }
            | Voice::Spin { waveform, .. }
            | Voice::EffectSpin { waveform, .. }
            | Voice::EffectPulse { waveform, .. } => waveform,
            Voice::Off | Voice::Noise { .. } | Voice::Background { .. } => Waveform::Sine,
        }
    }

    /// The pair of frequency-like parameters: carrier or width first, then
    /// beat, pulse or rate.
    ///
    /// Kinds without a parameter report zero in its place.
    pub fn pitch(&self) -> (f64, f64) {
        match *self {
            Voice::Binaural { carrier, beat, .. } | Voice::Monaural { carrier, beat, .. } => {
                (carrier, beat)
            }
            Voice::Isochronic { carrier, pulse, .. } => (carrier, pulse),
            Voice::Spin { width, rate, .. } | Voice::EffectSpin { width, rate, .. } => (width, rate),
            Voice::EffectPulse { pulse, .. } => (0.0, pulse),
            Voice::Off | Voice::Noise { .. } | Voice::Background { .. } => (0.0, 0.0),
        }
    }

    /// Returns a copy with the frequency-like parameters replaced.
    ///
    /// Parameters the kind does not carry are ignored.
    pub fn with_pitch(mut self, first: f64, second: f64) -> Self {
        match &mut self {
            Voice::Binaural { carrier, beat, .. } | Voice::Monaural { carrier, beat, .. } => {
                *carrier = first;
                *beat = second;
            }
            Voice::Isochronic { carrier, pulse, .. } => {
                *carrier = first;
                *pulse = second;
            }
            Voice::Spin { width, rate, .. } | Voice::EffectSpin { width, rate, .. } => {
                *width = first;
                *rate = second;
            }
            Voice::EffectPulse { pulse, .. } => *pulse = second,
            Voice::Off | Voice::Noise { .. } | Voice::Background { .. } => {}
        }
        self
    }

    /// Returns a copy with the width clamped to `±max` for kinds that have one.
    pub fn with_width_limit(self, max: f64) -> Self {
        match self {
            Voice::Spin { width, rate, .. } | Voice::EffectSpin { width, rate, .. } => {
                self.with_pitch(width.clamp(-max, max), rate)
            }
            _ => self,
        }
    }

    /// Compares kind, amplitude and parameters, ignoring the waveform.
    pub fn same_settings(&self, other: &Voice) -> bool {
        self.kind() == other.kind()
            && self.amplitude() == other.amplitude()
            && self.pitch() == other.pitch()
    }

    /// Linear blend from `v0` (at `ratio == 0`) to `v1` (at `ratio == 1`).
    ///
    /// The result keeps `v0`'s kind and waveform.
    pub fn lerp(v0: &Voice, v1: &Voice, ratio: f64) -> Voice {
        let keep = 1.0 - ratio;
        let (c0, r0) = v0.pitch();
        let (c1, r1) = v1.pitch();
        v0.with_amplitude(keep * v0.amplitude() + ratio * v1.amplitude())
            .with_pitch(keep * c0 + ratio * c1, keep * r0 + ratio * r1)
    }
}

/// One voice per channel slot.
pub type VoiceSet = [Voice; CHANNEL_COUNT];

/// A voice set with every channel off.
pub const SILENT_SET: VoiceSet = [Voice::Off; CHANNEL_COUNT];

/// Returns true when every channel of `a` has the same settings as in `b`.
pub fn voice_sets_equal(a: &VoiceSet, b: &VoiceSet) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.same_settings(y))
}

/// Slack for the re-summed total after scaling, which can land a few ulps
/// above 100.
const NORMALIZE_SLACK: f64 = 1e-9;

/// Scales the amplitudes of a voice set so they sum to at most 100%.
///
/// Off voices and the two background-effect kinds are excluded from both
/// the total and the scaling. Applying this twice has the same effect as
/// applying it once.
pub fn normalize_amplitudes(voices: &mut VoiceSet) {
    let counted = |v: &Voice| !v.is_off() && !v.kind().is_background_effect();

    let total: f64 = voices
        .iter()
        .filter(|v| counted(v))
        .map(|v| amplitude_to_percent(v.amplitude()))
        .sum();

    if total > 100.0 + NORMALIZE_SLACK {
        let factor = 100.0 / total;
        for voice in voices.iter_mut().filter(|v| counted(v)) {
            *voice = voice.with_amplitude(voice.amplitude() * factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pink(percent: f64) -> Voice {
        Voice::Noise {
            color: NoiseColor::Pink,
            amplitude: amplitude_from_percent(percent),
        }
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(Voice::Off.kind().code(), 0);
        assert_eq!(pink(1.0).kind().code(), 2);
        let spin = Voice::Spin {
            color: NoiseColor::White,
            amplitude: 0.0,
            width: 300.0,
            rate: 1.0,
            waveform: Waveform::Sine,
        };
        assert_eq!(spin.kind(), VoiceKind::SpinWhite);
        assert_eq!(spin.kind().code(), 12);
        assert!(spin.kind().is_spin());
    }

    #[test]
    fn test_waveform_names_round_trip() {
        for w in Waveform::ALL {
            assert_eq!(Waveform::from_name(w.name()), Some(w));
        }
        assert_eq!(Waveform::from_name("noise"), None);
    }

    #[test]
    fn test_pitch_accessors_ignore_missing_fields() {
        let pulse = Voice::EffectPulse {
            intensity: 100.0,
            pulse: 4.0,
            waveform: Waveform::Sine,
        };
        assert_eq!(pulse.pitch(), (0.0, 4.0));
        let moved = pulse.with_pitch(123.0, 8.0);
        assert_eq!(moved.pitch(), (0.0, 8.0));
        assert_eq!(Voice::Off.with_pitch(1.0, 2.0), Voice::Off);
    }

    #[test]
    fn test_lerp_blends_amplitude_and_pitch() {
        let v0 = Voice::Binaural {
            amplitude: 0.0,
            carrier: 200.0,
            beat: 10.0,
            waveform: Waveform::Triangle,
        };
        let v1 = Voice::Binaural {
            amplitude: 2048.0,
            carrier: 400.0,
            beat: 4.0,
            waveform: Waveform::Sine,
        };
        let mid = Voice::lerp(&v0, &v1, 0.5);
        assert_eq!(
            mid,
            Voice::Binaural {
                amplitude: 1024.0,
                carrier: 300.0,
                beat: 7.0,
                waveform: Waveform::Triangle,
            }
        );
    }

    #[test]
    fn test_width_limit_only_touches_spin_kinds() {
        let spin = Voice::Spin {
            color: NoiseColor::Pink,
            amplitude: 100.0,
            width: 5000.0,
            rate: 1.0,
            waveform: Waveform::Sine,
        };
        assert_eq!(spin.with_width_limit(2880.0).pitch(), (2880.0, 1.0));
        let tone = Voice::Binaural {
            amplitude: 100.0,
            carrier: 5000.0,
            beat: 1.0,
            waveform: Waveform::Sine,
        };
        assert_eq!(tone.with_width_limit(2880.0), tone);
    }

    #[test]
    fn test_normalize_scales_by_exact_factor() {
        let mut set = SILENT_SET;
        set[0] = pink(60.0);
        set[1] = Voice::Noise {
            color: NoiseColor::White,
            amplitude: amplitude_from_percent(60.0),
        };
        normalize_amplitudes(&mut set);

        let expected = amplitude_from_percent(60.0) * (100.0 / 120.0);
        assert!((set[0].amplitude() - expected).abs() < 1e-9);
        assert!((set[1].amplitude() - expected).abs() < 1e-9);
    }

    fn counted_percent(set: &VoiceSet) -> f64 {
        set.iter()
            .filter(|v| !v.is_off() && !v.kind().is_background_effect())
            .map(|v| amplitude_to_percent(v.amplitude()))
            .sum()
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut set = SILENT_SET;
        set[0] = pink(70.0);
        set[1] = pink(50.0);
        set[2] = Voice::EffectPulse {
            intensity: amplitude_from_percent(90.0),
            pulse: 2.0,
            waveform: Waveform::Sine,
        };
        normalize_amplitudes(&mut set);
        let once = set;
        normalize_amplitudes(&mut set);
        assert_eq!(set, once);
        // Effects are neither counted nor scaled.
        assert_eq!(set[2].amplitude(), amplitude_from_percent(90.0));
    }

    #[test]
    fn test_normalize_is_idempotent_across_mixes() {
        let noise = |color, percent| Voice::Noise {
            color,
            amplitude: amplitude_from_percent(percent),
        };

        for a in 1..=100 {
            for b in 1..=100 {
                let mut set = SILENT_SET;
                set[0] = noise(NoiseColor::Pink, f64::from(a));
                set[1] = noise(NoiseColor::White, f64::from(b));
                set[2] = noise(NoiseColor::Brown, 33.0);
                set[3] = Voice::Binaural {
                    amplitude: amplitude_from_percent(f64::from(a % 17)),
                    carrier: 200.0,
                    beat: 10.0,
                    waveform: Waveform::Sine,
                };

                normalize_amplitudes(&mut set);
                let once = set;
                normalize_amplitudes(&mut set);
                assert_eq!(set, once, "pink {a}% white {b}%");
                assert!(counted_percent(&set) <= 100.0 + 1e-9, "pink {a}% white {b}%");
            }
        }
    }

    #[test]
    fn test_voice_sets_equal_ignores_waveform() {
        let mut a = SILENT_SET;
        let mut b = SILENT_SET;
        a[0] = Voice::Isochronic {
            amplitude: 10.0,
            carrier: 100.0,
            pulse: 5.0,
            waveform: Waveform::Sine,
        };
        b[0] = Voice::Isochronic {
            amplitude: 10.0,
            carrier: 100.0,
            pulse: 5.0,
            waveform: Waveform::Square,
        };
        assert!(voice_sets_equal(&a, &b));
        b[0] = b[0].with_amplitude(11.0);
        assert!(!voice_sets_equal(&a, &b));
    }
}
