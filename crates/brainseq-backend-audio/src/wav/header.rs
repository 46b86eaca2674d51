//! The 44-byte RIFF header.

use std::io::{self, Write};

use brainseq_sequence::time::format_duration_hms;
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::warn;

use super::format::WavFormat;

/// Size of the header written by [`write_header`].
pub const HEADER_LEN: usize = 44;

/// Largest data chunk whose RIFF size still fits in 32 bits.
pub const MAX_DATA_LEN: u64 = 0xFFFF_FFF8 - 36;

/// Limits `data_len` to what the RIFF size fields can hold.
///
/// Logs the playable length when the request is cut short.
pub fn clamp_data_len(data_len: u64, format: &WavFormat) -> u64 {
    if data_len + 36 <= u64::from(u32::MAX) {
        return data_len;
    }
    let secs = MAX_DATA_LEN / u64::from(format.byte_rate().max(1));
    warn!(
        "Selected length is too long for the WAV format; truncating to {}",
        format_duration_hms(secs)
    );
    MAX_DATA_LEN
}

/// Writes a PCM WAV header announcing `data_len` bytes of audio.
pub fn write_header<W: Write>(writer: &mut W, format: &WavFormat, data_len: u32) -> io::Result<()> {
    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(data_len.saturating_add(36))?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(1)?; // PCM
    writer.write_u16::<LittleEndian>(format.channels)?;
    writer.write_u32::<LittleEndian>(format.sample_rate)?;
    writer.write_u32::<LittleEndian>(format.byte_rate())?;
    writer.write_u16::<LittleEndian>(format.block_align())?;
    writer.write_u16::<LittleEndian>(format.bits_per_sample)?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_len)?;
    Ok(())
}
