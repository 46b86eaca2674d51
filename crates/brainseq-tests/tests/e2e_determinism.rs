//! Repeated renders must be byte-identical.

use brainseq_backend_audio::{Container, RenderSettings, SampleFormat};
use brainseq_tests::determinism::verify_determinism;
use brainseq_tests::fixtures::{render_wav, render_with, LAYERED, TONE_440};
use pretty_assertions::assert_eq;

#[test]
fn test_tone440_is_deterministic() {
    let result = verify_determinism(|| render_wav(TONE_440), 3);
    result.assert_deterministic();
    assert_eq!(result.output_size, 44 + 3_528_000);
}

#[test]
fn test_layered_voices_are_deterministic() {
    verify_determinism(|| render_wav(LAYERED), 2).assert_deterministic();
}

#[test]
fn test_report_hash_covers_the_payload() {
    let (bytes, report) = render_with(LAYERED, RenderSettings::default());
    assert_eq!(
        report.pcm_hash,
        blake3::hash(&bytes[44..]).to_hex().to_string()
    );
    assert_eq!(report.bytes as usize, bytes.len() - 44);
}

#[test]
fn test_payload_does_not_depend_on_container() {
    let (wav, _) = render_with(LAYERED, RenderSettings::default());
    let raw_settings = RenderSettings {
        container: Container::Raw,
        format: SampleFormat::S16Le,
        ..RenderSettings::default()
    };
    let (raw, _) = render_with(LAYERED, raw_settings);
    assert_eq!(blake3::hash(&wav[44..]), blake3::hash(&raw));
}
