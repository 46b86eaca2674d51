//! Tests for the WAV header writer.

use pretty_assertions::assert_eq;

use super::format::WavFormat;
use super::header::{clamp_data_len, write_header, HEADER_LEN, MAX_DATA_LEN};

fn u16_at(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

fn u32_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

// =========================================================================
// Format arithmetic
// =========================================================================

#[test]
fn test_stereo_16_bit() {
    let format = WavFormat::stereo(44_100, 16);
    assert_eq!(format.bytes_per_sample(), 2);
    assert_eq!(format.block_align(), 4);
    assert_eq!(format.byte_rate(), 176_400);
}

#[test]
fn test_stereo_8_bit() {
    let format = WavFormat::stereo(8000, 8);
    assert_eq!(format.block_align(), 2);
    assert_eq!(format.byte_rate(), 16_000);
}

// =========================================================================
// Header layout
// =========================================================================

#[test]
fn test_header_layout() {
    let format = WavFormat::stereo(44_100, 16);
    let mut buf = Vec::new();
    write_header(&mut buf, &format, 3_528_000).unwrap();

    assert_eq!(buf.len(), HEADER_LEN);
    assert_eq!(&buf[0..4], b"RIFF");
    assert_eq!(u32_at(&buf, 4), 3_528_036);
    assert_eq!(&buf[8..12], b"WAVE");
    assert_eq!(&buf[12..16], b"fmt ");
    assert_eq!(u32_at(&buf, 16), 16);
    assert_eq!(u16_at(&buf, 20), 1);
    assert_eq!(u16_at(&buf, 22), 2);
    assert_eq!(u32_at(&buf, 24), 44_100);
    assert_eq!(u32_at(&buf, 28), 176_400);
    assert_eq!(u16_at(&buf, 32), 4);
    assert_eq!(u16_at(&buf, 34), 16);
    assert_eq!(&buf[36..40], b"data");
    assert_eq!(u32_at(&buf, 40), 3_528_000);
}

#[test]
fn test_header_is_readable_by_hound() {
    let format = WavFormat::stereo(22_050, 16);
    let mut buf = Vec::new();
    write_header(&mut buf, &format, 8).unwrap();
    buf.extend_from_slice(&[0, 0, 1, 0, 2, 0, 3, 0]);

    let reader = hound::WavReader::new(std::io::Cursor::new(buf)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 22_050);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 4);
}

// =========================================================================
// Length clamp
// =========================================================================

#[test]
fn test_clamp_keeps_small_lengths() {
    let format = WavFormat::stereo(44_100, 16);
    assert_eq!(clamp_data_len(3_528_000, &format), 3_528_000);
    let edge = u64::from(u32::MAX) - 36;
    assert_eq!(clamp_data_len(edge, &format), edge);
}

#[test]
fn test_clamp_truncates_long_renders() {
    let format = WavFormat::stereo(44_100, 16);
    // 24 hours of 16-bit stereo at 44.1 kHz
    let day = 176_400u64 * 86_400;
    assert_eq!(clamp_data_len(day, &format), MAX_DATA_LEN);
    assert_eq!(MAX_DATA_LEN, 0xFFFF_FFD4);
}
