//! Definition body commands: one voice per line.

use crate::error::ErrorCode;
use crate::voice::{amplitude_from_percent, NoiseColor, Voice, VoiceKind, Waveform};

/// A command rejected before line context is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

type CommandResult<T> = Result<T, CommandError>;

const NOISE_USAGE: &str = "noise <type> amplitude <value>";
const TONE_USAGE: &str = "tone <freq> <type> <value> amplitude <amp>";
const SPIN_USAGE: &str = "spin <type> width <width> rate <rate> amplitude <amp>";
const BACKGROUND_USAGE: &str = "background amplitude <amp>";
const PULSE_USAGE: &str = "effect pulse <pulse> intensity <intensity>";
const EFFECT_SPIN_USAGE: &str = "effect spin width <width> rate <rate> intensity <intensity>";

/// Parses one command. `earlier` holds the voices already defined in the
/// same block.
pub fn parse_command(text: &str, earlier: &[Voice]) -> CommandResult<Voice> {
    let words: Vec<&str> = text.split_whitespace().collect();
    match words.as_slice() {
        ["noise", rest @ ..] => parse_noise(rest),
        ["tone", rest @ ..] => parse_tone(rest, Waveform::Sine),
        ["spin", rest @ ..] => parse_spin(rest, Waveform::Sine),
        ["background", rest @ ..] => parse_background(rest),
        ["effect", rest @ ..] => parse_effect(rest, Waveform::Sine, earlier),
        ["waveform", rest @ ..] => parse_waveform(rest, earlier),
        [cmd, ..] => Err(CommandError::new(
            ErrorCode::UnknownKeyword,
            format!("Unknown command '{cmd}'. Use: noise, tone, waveform, spin, effect, background"),
        )),
        [] => Err(CommandError::new(ErrorCode::InvalidSyntax, "Empty command")),
    }
}

/// Checks word count and fixed keywords (`(position, keyword)` pairs).
fn expect_form(
    rest: &[&str],
    count: usize,
    keywords: &[(usize, &str)],
    kind: &str,
    usage: &str,
) -> CommandResult<()> {
    let well_formed =
        rest.len() >= count && keywords.iter().all(|(pos, word)| rest[*pos] == *word);
    if well_formed {
        Ok(())
    } else {
        Err(CommandError::new(
            ErrorCode::InvalidSyntax,
            format!("Invalid {kind} syntax. Expected: {usage}"),
        ))
    }
}

fn expect_end(rest: &[&str], count: usize, usage: &str) -> CommandResult<()> {
    if rest.len() > count {
        Err(CommandError::new(
            ErrorCode::InvalidSyntax,
            format!("Invalid syntax. Expected: {usage}"),
        ))
    } else {
        Ok(())
    }
}

fn number(word: &str, what: &str) -> CommandResult<f64> {
    word.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::new(ErrorCode::InvalidNumber, format!("Invalid {what}")))
}

fn non_negative(value: f64, what: &str) -> CommandResult<f64> {
    if value < 0.0 {
        Err(CommandError::new(
            ErrorCode::ValueOutOfRange,
            format!("Invalid {what}"),
        ))
    } else {
        Ok(value)
    }
}

/// Converts a 0-100 percentage to the internal amplitude scale.
fn percent(value: f64, what: &str) -> CommandResult<f64> {
    if (0.0..=100.0).contains(&value) {
        Ok(amplitude_from_percent(value))
    } else {
        Err(CommandError::new(
            ErrorCode::ValueOutOfRange,
            format!("Invalid {what}.\nSupported range: 0 to 100."),
        ))
    }
}

fn noise_color(word: &str, kind: &str) -> CommandResult<NoiseColor> {
    NoiseColor::from_name(word).ok_or_else(|| {
        CommandError::new(
            ErrorCode::UnknownKeyword,
            format!("Unknown {kind} type '{word}'. Use: pink, white, brown"),
        )
    })
}

fn parse_noise(rest: &[&str]) -> CommandResult<Voice> {
    expect_form(rest, 3, &[(1, "amplitude")], "noise", NOISE_USAGE)?;
    let amp = number(rest[2], "noise amplitude")?;
    let color = noise_color(rest[0], "noise")?;
    expect_end(rest, 3, NOISE_USAGE)?;
    Ok(Voice::Noise {
        color,
        amplitude: percent(amp, "noise amplitude")?,
    })
}

fn parse_tone(rest: &[&str], waveform: Waveform) -> CommandResult<Voice> {
    expect_form(rest, 5, &[(3, "amplitude")], "tone", TONE_USAGE)?;
    let carrier = number(rest[0], "tone frequency")?;
    let value = number(rest[2], "tone value")?;
    let amp = number(rest[4], "tone amplitude")?;

    let mode = rest[1];
    if !matches!(mode, "binaural" | "monaural" | "isochronic") {
        return Err(CommandError::new(
            ErrorCode::UnknownKeyword,
            format!("Unknown tone type '{mode}'. Use: binaural, monaural, isochronic"),
        ));
    }
    expect_end(rest, 5, TONE_USAGE)?;

    let carrier = non_negative(carrier, "tone frequency")?;
    let value = non_negative(value, "tone value")?;
    let amplitude = percent(amp, "tone amplitude")?;

    Ok(match mode {
        "binaural" => Voice::Binaural {
            amplitude,
            carrier,
            beat: value,
            waveform,
        },
        "monaural" => Voice::Monaural {
            amplitude,
            carrier,
            beat: value,
            waveform,
        },
        _ => Voice::Isochronic {
            amplitude,
            carrier,
            pulse: value,
            waveform,
        },
    })
}

fn parse_spin(rest: &[&str], waveform: Waveform) -> CommandResult<Voice> {
    expect_form(
        rest,
        7,
        &[(1, "width"), (3, "rate"), (5, "amplitude")],
        "spin",
        SPIN_USAGE,
    )?;
    let width = number(rest[2], "spin width")?;
    let rate = number(rest[4], "spin rate")?;
    let amp = number(rest[6], "spin amplitude")?;
    let color = noise_color(rest[0], "spin")?;
    expect_end(rest, 7, SPIN_USAGE)?;

    Ok(Voice::Spin {
        color,
        width: non_negative(width, "spin width")?,
        rate: non_negative(rate, "spin rate")?,
        amplitude: percent(amp, "spin amplitude")?,
        waveform,
    })
}

fn parse_background(rest: &[&str]) -> CommandResult<Voice> {
    expect_form(rest, 2, &[(0, "amplitude")], "background", BACKGROUND_USAGE)?;
    let amp = number(rest[1], "background amplitude")?;
    expect_end(rest, 2, BACKGROUND_USAGE)?;
    Ok(Voice::Background {
        amplitude: percent(amp, "background amplitude")?,
    })
}

fn parse_effect(rest: &[&str], waveform: Waveform, earlier: &[Voice]) -> CommandResult<Voice> {
    if !earlier.iter().any(|v| v.kind() == VoiceKind::Background) {
        return Err(CommandError::new(
            ErrorCode::EffectWithoutBackground,
            "effect spin/pulse without file amplitude specified",
        ));
    }

    match rest.split_first() {
        Some((&"pulse", rest)) => {
            expect_form(rest, 3, &[(1, "intensity")], "pulse", PULSE_USAGE)?;
            let pulse = number(rest[0], "pulse")?;
            let intensity = number(rest[2], "intensity")?;
            expect_end(rest, 3, PULSE_USAGE)?;
            Ok(Voice::EffectPulse {
                pulse: non_negative(pulse, "pulse")?,
                intensity: percent(intensity, "intensity")?,
                waveform,
            })
        }
        Some((&"spin", rest)) => {
            expect_form(
                rest,
                6,
                &[(0, "width"), (2, "rate"), (4, "intensity")],
                "spin",
                EFFECT_SPIN_USAGE,
            )?;
            let width = number(rest[1], "spin width")?;
            let rate = number(rest[3], "spin rate")?;
            let intensity = number(rest[5], "intensity")?;
            expect_end(rest, 6, EFFECT_SPIN_USAGE)?;
            Ok(Voice::EffectSpin {
                width: non_negative(width, "spin width")?,
                rate: non_negative(rate, "spin rate")?,
                intensity: percent(intensity, "intensity")?,
                waveform,
            })
        }
        Some((other, _)) => Err(CommandError::new(
            ErrorCode::UnknownKeyword,
            format!("Unknown effect type '{other}'. Use: pulse, spin"),
        )),
        None => Err(CommandError::new(
            ErrorCode::InvalidSyntax,
            format!("Invalid effect syntax. Expected: {PULSE_USAGE} or {EFFECT_SPIN_USAGE}"),
        )),
    }
}

fn parse_waveform(rest: &[&str], earlier: &[Voice]) -> CommandResult<Voice> {
    let Some((&name, rest)) = rest.split_first() else {
        return Err(CommandError::new(
            ErrorCode::InvalidSyntax,
            "Invalid waveform syntax. Expected: waveform <type> tone|spin|effect ...",
        ));
    };
    let waveform = Waveform::from_name(name).ok_or_else(|| {
        CommandError::new(
            ErrorCode::UnknownKeyword,
            format!("Unknown waveform type '{name}'. Use: sine, square, triangle, sawtooth"),
        )
    })?;

    match rest.split_first() {
        Some((&"tone", rest)) => parse_tone(rest, waveform),
        Some((&"spin", rest)) => parse_spin(rest, waveform),
        Some((&"effect", rest)) => parse_effect(rest, waveform, earlier),
        other => {
            let follower = other.map(|(w, _)| *w).unwrap_or_default();
            Err(CommandError::new(
                ErrorCode::UnknownKeyword,
                format!("Waveform not valid for '{follower}'. Use: tone, spin, effect"),
            ))
        }
    }
}
