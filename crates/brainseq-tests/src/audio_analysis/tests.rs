//! Tests for the audio analysis helpers.

use pretty_assertions::assert_eq;

use super::*;

fn sine(freq: f64, rate: u32, seconds: f64, amplitude: f32) -> Vec<f32> {
    let n = (f64::from(rate) * seconds) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / f64::from(rate);
            amplitude * (2.0 * std::f64::consts::PI * freq * t + 0.1).sin() as f32
        })
        .collect()
}

fn wav_bytes(rate: u32, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&(rate * 4).to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

// =========================================================================
// Signal
// =========================================================================

#[test]
fn test_rms_and_peak() {
    assert_eq!(calculate_rms(&[]), 0.0);
    assert_eq!(calculate_rms(&[1.0; 10]), 1.0);
    assert_eq!(peak_amplitude(&[0.1, -0.7, 0.3]), 0.7);
    let s = sine(100.0, 8000, 1.0, 1.0);
    assert!((calculate_rms(&s) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
}

#[test]
fn test_silence_threshold() {
    assert!(is_silent(&[0.0005; 50], 0.001));
    assert!(!is_silent(&[0.0, 0.5], 0.001));
}

#[test]
fn test_frequency_estimate() {
    let s = sine(440.0, 44_100, 1.0, 0.5);
    let f = estimate_frequency(&s, 44_100);
    assert!((f - 440.0).abs() < 1.0, "estimated {f}");
    assert_eq!(estimate_frequency(&[], 44_100), 0.0);
}

#[test]
fn test_zero_crossings_skip_exact_zeros() {
    assert_eq!(zero_crossings(&[1.0, 0.0, -1.0, 0.0, 1.0]), 2);
}

#[test]
fn test_largest_step_finds_click() {
    let mut s = sine(50.0, 8000, 0.1, 0.2);
    assert!(largest_step(&s) < 0.01);
    s[100] = 0.9;
    assert!(largest_step(&s) > 0.5);
}

// =========================================================================
// WAV
// =========================================================================

#[test]
fn test_parse_stereo_wav() {
    let bytes = wav_bytes(22_050, &[16_384, -16_384, 0, 32_767]);
    let wav = parse_wav(&bytes).unwrap();
    assert_eq!(wav.header.channels, 2);
    assert_eq!(wav.header.sample_rate, 22_050);
    assert_eq!(wav.header.block_align, 4);
    assert_eq!(wav.header.data_offset, 44);
    assert_eq!(wav.header.data_len, 8);
    assert_eq!(wav.frames(), 2);
    assert_eq!(wav.left(), vec![0.5, 0.0]);
    assert_eq!(wav.right()[0], -0.5);
}

#[test]
fn test_parse_rejects_garbage() {
    assert_eq!(
        parse_wav_header(&[0u8; 10]).unwrap_err(),
        AudioAnalysisError::DataTooShort {
            expected: 44,
            actual: 10
        }
    );
    assert_eq!(
        parse_wav_header(&[0u8; 44]).unwrap_err(),
        AudioAnalysisError::InvalidHeader
    );
}

#[test]
fn test_declared_length_beyond_file_is_tolerated() {
    let mut bytes = wav_bytes(8000, &[100, 200]);
    bytes[40..44].copy_from_slice(&1000u32.to_le_bytes());
    let wav = parse_wav(&bytes).unwrap();
    assert_eq!(wav.header.data_len, 1000);
    assert_eq!(wav.samples.len(), 2);
}
