//! Human-readable rendering of voices and periods.
//!
//! The multiline form reads back like sequence-file commands; the compact
//! form fits on the one-line status display.

use crate::time::format_time;
use crate::voice::{amplitude_to_percent, Voice, VoiceSet, CHANNEL_COUNT};

/// Marker printed for a value unchanged from the line above.
const UNCHANGED: &str = "  --";

/// Formats one voice.
///
/// When `dup` is given and holds the same values, the voice is shown as
/// `  --`. White spin and background effects compare only the values they
/// display.
pub fn format_voice(voice: &Voice, dup: Option<&Voice>, multiline: bool) -> String {
    if let Some(dup) = dup {
        if unchanged(voice, dup) {
            return UNCHANGED.to_string();
        }
    }

    let amp = amplitude_to_percent(voice.amplitude());
    let wave = voice.waveform().name();
    match *voice {
        Voice::Off => " -".to_string(),
        Voice::Binaural { carrier, beat, .. } | Voice::Monaural { carrier, beat, .. } => {
            let mode = if matches!(voice, Voice::Binaural { .. }) {
                "binaural"
            } else {
                "monaural"
            };
            if multiline {
                format!("\n\twaveform {wave} tone {carrier:.2} {mode} {beat:.2} amplitude {amp:.2}")
            } else {
                format!(" (tone:{carrier:.2} {mode}:{beat:.2} amplitude:{amp:.2})")
            }
        }
        Voice::Isochronic { carrier, pulse, .. } => {
            if multiline {
                format!(
                    "\n\twaveform {wave} tone {carrier:.2} isochronic {pulse:.2} amplitude {amp:.2}"
                )
            } else {
                format!(" (tone:{carrier:.2} isochronic:{pulse:.2} amplitude:{amp:.2})")
            }
        }
        Voice::Noise { color, .. } => {
            if multiline {
                format!("\n\tnoise {} amplitude {amp:.2}", color.name())
            } else {
                format!(" (noise:{amp:.2})")
            }
        }
        Voice::Spin {
            color, width, rate, ..
        } => {
            if multiline {
                format!(
                    "\n\twaveform {wave} spin {} width {width:.2} rate {rate:.2} amplitude {amp:.2}",
                    color.name()
                )
            } else {
                format!(" (width:{width:.2} rate:{rate:.2} amplitude:{amp:.2})")
            }
        }
        Voice::Background { .. } => {
            if multiline {
                format!("\n\tbackground amplitude {amp:.2}")
            } else {
                format!(" (amplitude:{amp:.2})")
            }
        }
        Voice::EffectSpin { width, rate, .. } => {
            if multiline {
                format!(
                    "\n\twaveform {wave} effect spin width {width:.2} rate {rate:.2} intensity {amp:.2}"
                )
            } else {
                format!(" (width:{width:.2} rate:{rate:.2} intensity:{amp:.2})")
            }
        }
        Voice::EffectPulse { pulse, .. } => {
            if multiline {
                format!("\n\twaveform {wave} effect pulse {pulse:.2} intensity {amp:.2}")
            } else {
                format!(" (pulse:{pulse:.2} intensity:{amp:.2})")
            }
        }
    }
}

fn unchanged(voice: &Voice, dup: &Voice) -> bool {
    use crate::voice::NoiseColor;

    let same_amp = voice.amplitude() == dup.amplitude();
    match voice {
        Voice::Off => false,
        Voice::Noise { .. } | Voice::Background { .. } => same_amp,
        Voice::Spin {
            color: NoiseColor::White,
            ..
        } => same_amp,
        Voice::EffectPulse { .. } => same_amp && voice.pitch().1 == dup.pitch().1,
        _ => same_amp && voice.pitch() == dup.pitch(),
    }
}

/// Number of leading channels worth showing: trailing off channels are
/// dropped, but at least one channel is kept.
fn shown_channels(voices: &VoiceSet) -> usize {
    let mut count = CHANNEL_COUNT;
    while count > 1 && voices[count - 1].is_off() {
        count -= 1;
    }
    count
}

/// Formats a period as two lines: its start state and its end state.
///
/// Each channel's text is padded so the two lines stay aligned; values
/// that do not change across the period show as `--` on the second line.
pub fn format_period(start_time: u32, end_time: u32, v0: &VoiceSet, v1: &VoiceSet) -> String {
    let mut first = format!("- {}", format_time(start_time));
    let mut second = format!("  {}", format_time(end_time));

    for ch in 0..shown_channels(v0) {
        let a = format_voice(&v0[ch], None, true);
        let b = format_voice(&v1[ch], Some(&v0[ch]), true);
        let width = a.len().max(b.len());
        first.push_str(&format!("{a:<width$}"));
        second.push_str(&format!("{b:<width$}"));
    }

    format!("{first}\n{second}\n")
}

/// Formats the one-line status: current time and compact channel values.
pub fn format_status(now: u32, voices: &VoiceSet) -> String {
    let mut line = format!("  {}", format_time(now));
    for voice in &voices[..shown_channels(voices)] {
        line.push_str(&format_voice(voice, None, false));
    }
    line
}
