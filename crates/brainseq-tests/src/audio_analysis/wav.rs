//! WAV parsing into normalized samples.

use super::error::AudioAnalysisError;

/// Format fields and data location of a PCM WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Offset of the first data byte.
    pub data_offset: usize,
    /// Data length as declared in the header.
    pub data_len: u32,
}

/// A parsed WAV file with samples scaled to `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct DecodedWav {
    pub header: WavHeader,
    /// Interleaved samples.
    pub samples: Vec<f32>,
}

impl DecodedWav {
    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        let channels = usize::from(self.header.channels.max(1));
        self.samples
            .iter()
            .skip(index)
            .step_by(channels)
            .copied()
            .collect()
    }

    pub fn left(&self) -> Vec<f32> {
        self.channel(0)
    }

    pub fn right(&self) -> Vec<f32> {
        self.channel(1)
    }

    /// Frames per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.header.channels.max(1))
    }
}

fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Walks the RIFF chunks and returns the body offset and declared size of `id`.
fn find_chunk(data: &[u8], id: &[u8; 4]) -> Option<(usize, u32)> {
    let mut pos = 12;
    while pos + 8 <= data.len() {
        let size = u32_at(data, pos + 4);
        if &data[pos..pos + 4] == id {
            return Some((pos + 8, size));
        }
        pos += 8 + size as usize + (size as usize & 1);
    }
    None
}

/// Parses the RIFF header and the `fmt ` chunk.
pub fn parse_wav_header(data: &[u8]) -> Result<WavHeader, AudioAnalysisError> {
    if data.len() < 44 {
        return Err(AudioAnalysisError::DataTooShort {
            expected: 44,
            actual: data.len(),
        });
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(AudioAnalysisError::InvalidHeader);
    }

    let (fmt, _) = find_chunk(data, b"fmt ").ok_or(AudioAnalysisError::MissingChunk("fmt"))?;
    let format = u16_at(data, fmt);
    if format != 1 {
        return Err(AudioAnalysisError::UnsupportedFormat(format));
    }
    let (data_offset, data_len) =
        find_chunk(data, b"data").ok_or(AudioAnalysisError::MissingChunk("data"))?;

    Ok(WavHeader {
        channels: u16_at(data, fmt + 2),
        sample_rate: u32_at(data, fmt + 4),
        byte_rate: u32_at(data, fmt + 8),
        block_align: u16_at(data, fmt + 12),
        bits_per_sample: u16_at(data, fmt + 14),
        data_offset,
        data_len,
    })
}

/// Parses a whole 8- or 16-bit PCM WAV file.
pub fn parse_wav(data: &[u8]) -> Result<DecodedWav, AudioAnalysisError> {
    let header = parse_wav_header(data)?;
    let end = (header.data_offset + header.data_len as usize).min(data.len());
    let payload = &data[header.data_offset..end];

    let samples = match header.bits_per_sample {
        8 => payload
            .iter()
            .map(|&b| (f32::from(b) - 128.0) / 128.0)
            .collect(),
        16 => payload
            .chunks_exact(2)
            .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / 32768.0)
            .collect(),
        bits => return Err(AudioAnalysisError::UnsupportedBits(bits)),
    };

    Ok(DecodedWav { header, samples })
}
