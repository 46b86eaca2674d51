//! Tests for the synthesis engine.

use brainseq_sequence::{amplitude_from_percent, GainLevel, Sequence, Voice, VoiceKind};
use pretty_assertions::assert_eq;

use super::{pulse_gate, Engine, EngineEvent};
use crate::tables::{phase_increment, TABLE_AMPLITUDE};

const RATE: u32 = 44_100;

const FADE: &str = "\
beat
  tone 200 binaural 10 amplitude 100
00:00:00 silence
00:00:10 beat
00:00:20 silence
";

fn seq(text: &str) -> Sequence {
    Sequence::parse(text).unwrap()
}

fn render(engine: &mut Engine<'_>, mix: &[i32]) -> Vec<i16> {
    let mut out = vec![0i16; mix.len()];
    engine.render_chunk(mix, &mut out);
    out
}

// =========================================================================
// Period tracking
// =========================================================================

#[test]
fn test_update_reports_each_period_entered() {
    let seq = seq(FADE);
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(0);
    assert_eq!(seq.period(engine.period()).time, 0);

    let mut events = Vec::new();
    engine.update(15_000, &mut |e| events.push(e));
    assert_eq!(events.len(), 1);
    let EngineEvent::PeriodChanged { period } = events[0];
    assert_eq!(seq.period(period).time, 10_000);

    events.clear();
    engine.update(16_000, &mut |e| events.push(e));
    assert!(events.is_empty());
}

#[test]
fn test_update_wraps_past_midnight() {
    let seq = seq(FADE);
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(25_000);
    let mut events = Vec::new();
    engine.update(1_000, &mut |e| events.push(e));
    let EngineEvent::PeriodChanged { period } = events[0];
    assert_eq!(seq.period(period).time, 0);
}

// =========================================================================
// Interpolation
// =========================================================================

#[test]
fn test_fade_in_is_linear() {
    let seq = seq(FADE);
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(5_000);
    let voice = engine.voices()[0];
    assert_eq!(voice.kind(), VoiceKind::Binaural);
    assert!((voice.amplitude() - amplitude_from_percent(50.0)).abs() < 1e-9);
    assert_eq!(engine.channels[0].amp, 2048);
}

#[test]
fn test_binaural_increments_split_the_beat() {
    let seq = seq(FADE);
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(10_000);
    let ch = &engine.channels[0];
    assert_eq!(ch.inc1, phase_increment(205.0, RATE));
    assert_eq!(ch.inc2, phase_increment(195.0, RATE));
    assert_eq!(ch.amp, ch.amp2);
}

#[test]
fn test_spin_width_is_clamped() {
    let seq = seq("\
wide
  spin pink width 9000 rate 2 amplitude 50
00:00:00 wide
00:01:00 wide
");
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(30_000);
    let limit = 127.0 / 1e-6 / f64::from(RATE);
    match engine.voices()[0] {
        Voice::Spin { width, .. } => assert!((width - limit).abs() < 1e-9),
        other => panic!("unexpected voice {other:?}"),
    }
    assert!(engine.channels[0].inc2 <= 127 << 24 >> 19);
}

#[test]
fn test_kind_change_resets_phase() {
    let seq = seq(FADE);
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(10_000);
    let mix = vec![0; 64];
    render(&mut engine, &mix);
    assert_ne!(engine.channels[0].off1, 0);

    engine.channels[0].voice = Voice::Off;
    engine.seek(12_000);
    assert_eq!(engine.channels[0].off1, 0);
    assert_eq!(engine.channels[0].off2, 0);
}

// =========================================================================
// Mixing
// =========================================================================

#[test]
fn test_silence_renders_zeros() {
    let seq = seq("00:00:00 silence\n00:00:10 silence\n");
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(0);
    let out = render(&mut engine, &vec![0; 4096]);
    assert!(out.iter().all(|&s| s == 0));
}

#[test]
fn test_direct_mix_follows_gain_and_volume() {
    let seq = seq("00:00:00 silence\n00:00:10 silence\n");
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.set_gain_level(GainLevel::VeryHigh);
    engine.seek(0);
    assert_eq!(render(&mut engine, &[256, -256]), vec![16, -16]);

    engine.set_volume(50);
    assert_eq!(render(&mut engine, &[256, 256]), vec![8, 8]);
}

#[test]
fn test_background_voice_replaces_direct_mix() {
    let seq = seq("\
bg
  background amplitude 100
00:00:00 bg
00:01:00 bg
");
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.set_gain_level(GainLevel::VeryHigh);
    engine.seek(0);
    assert_eq!(render(&mut engine, &[256, 512]), vec![16, 32]);
}

#[test]
fn test_tone_is_audible_and_deterministic() {
    let seq = seq(FADE);
    let mut a = Engine::new(&seq, RATE).unwrap();
    let mut b = Engine::new(&seq, RATE).unwrap();
    a.seek(10_000);
    b.seek(10_000);
    let mix = vec![0; 8192];
    let xs = render(&mut a, &mix);
    let ys = render(&mut b, &mix);
    assert_eq!(xs, ys);
    let peak = xs.iter().map(|s| i32::from(*s).abs()).max().unwrap();
    assert!(peak > 30_000, "peak {peak}");
}

#[test]
fn test_noise_uses_both_channels_equally() {
    let seq = seq("\
hiss
  noise white amplitude 40
00:00:00 hiss
00:01:00 hiss
");
    let mut engine = Engine::new(&seq, RATE).unwrap();
    engine.seek(0);
    let out = render(&mut engine, &vec![0; 1024]);
    assert!(out.chunks(2).all(|f| f[0] == f[1]));
    assert!(out.iter().any(|&s| s != 0));
}

#[test]
fn test_pulse_gate_shape() {
    let full = TABLE_AMPLITUDE;
    assert_eq!(pulse_gate(0), 0.0);
    assert_eq!(pulse_gate(-full), 0.0);
    assert_eq!(pulse_gate((f64::from(full) * 0.3) as i32), 0.0);
    assert!((pulse_gate(full) - 1.0).abs() < 1e-12);
    assert!((pulse_gate((f64::from(full) * 0.65) as i32) - 0.5).abs() < 1e-4);
}

#[test]
fn test_zero_rate_is_rejected() {
    let seq = seq(FADE);
    assert!(Engine::new(&seq, 0).is_err());
}
