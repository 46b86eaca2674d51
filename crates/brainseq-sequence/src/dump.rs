//! Machine-readable form of a compiled timeline.

use serde::Serialize;

use crate::options::SequenceOptions;
use crate::sequence::Sequence;
use crate::time::format_time;
use crate::voice::{amplitude_to_percent, Voice, VoiceKind, VoiceSet, Waveform};

/// A compiled sequence, as printed by `check --json`.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineDump {
    pub options: SequenceOptions,
    pub uses_background: bool,
    /// Batch render length, `HH:MM:SS`.
    pub duration: String,
    pub periods: Vec<PeriodDump>,
}

/// One period of the ring.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodDump {
    pub start: String,
    pub end: String,
    pub voices_at_start: Vec<VoiceDump>,
    pub voices_at_end: Vec<VoiceDump>,
}

/// One channel; amplitudes are percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceDump {
    pub channel: usize,
    pub kind: VoiceKind,
    pub amplitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Waveform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

impl VoiceDump {
    fn from_voice(channel: usize, voice: &Voice) -> Self {
        let mut dump = Self {
            channel,
            kind: voice.kind(),
            amplitude: amplitude_to_percent(voice.amplitude()),
            waveform: None,
            carrier: None,
            beat: None,
            pulse: None,
            width: None,
            rate: None,
        };
        match *voice {
            Voice::Binaural {
                carrier,
                beat,
                waveform,
                ..
            }
            | Voice::Monaural {
                carrier,
                beat,
                waveform,
                ..
            } => {
                dump.carrier = Some(carrier);
                dump.beat = Some(beat);
                dump.waveform = Some(waveform);
            }
            Voice::Isochronic {
                carrier,
                pulse,
                waveform,
                ..
            } => {
                dump.carrier = Some(carrier);
                dump.pulse = Some(pulse);
                dump.waveform = Some(waveform);
            }
            Voice::Spin {
                width,
                rate,
                waveform,
                ..
            }
            | Voice::EffectSpin {
                width,
                rate,
                waveform,
                ..
            } => {
                dump.width = Some(width);
                dump.rate = Some(rate);
                dump.waveform = Some(waveform);
            }
            Voice::EffectPulse {
                pulse, waveform, ..
            } => {
                dump.pulse = Some(pulse);
                dump.waveform = Some(waveform);
            }
            Voice::Off | Voice::Noise { .. } | Voice::Background { .. } => {}
        }
        dump
    }
}

fn dump_set(voices: &VoiceSet) -> Vec<VoiceDump> {
    voices
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_off())
        .map(|(ch, v)| VoiceDump::from_voice(ch, v))
        .collect()
}

impl TimelineDump {
    /// Captures the periods of `sequence`, starting from the earliest.
    pub fn from_sequence(sequence: &Sequence) -> Self {
        let periods = sequence
            .periods_from_earliest()
            .map(|idx| {
                let p = sequence.period(idx);
                PeriodDump {
                    start: format_time(p.time),
                    end: format_time(sequence.period_end(idx)),
                    voices_at_start: dump_set(&p.start),
                    voices_at_end: dump_set(&p.end),
                }
            })
            .collect();

        Self {
            options: sequence.options().clone(),
            uses_background: sequence.uses_background(),
            duration: format_time(sequence.duration_ms()),
            periods,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
