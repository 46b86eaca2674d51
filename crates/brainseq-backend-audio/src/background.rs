//! Background audio files.
//!
//! WAV files are decoded with `hound`; anything else is read as headerless
//! 16-bit little-endian stereo. Samples are scaled to the 20-bit range the
//! engine mixes at.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

use crate::error::{AudioError, MixError};
use crate::mix::MixSource;

enum Decoder {
    Wav {
        reader: hound::WavReader<BufReader<File>>,
        channels: u16,
        bits: u16,
    },
    Raw {
        reader: BufReader<File>,
    },
}

/// A background file opened for streaming.
pub struct BackgroundFile {
    path: PathBuf,
    decoder: Decoder,
}

impl BackgroundFile {
    /// Opens `path`, picking the decoder from its extension.
    ///
    /// A `.wav` file whose header cannot be parsed is read as raw PCM with a
    /// warning. A WAV file with a depth other than 16 or 24 bits is an error.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let decoder = if has_wav_extension(path) {
            open_wav(path)?
        } else {
            open_raw(path)?
        };
        Ok(Self {
            path: path.to_path_buf(),
            decoder,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample rate declared by the file header, if there is one.
    pub fn sample_rate(&self) -> Option<u32> {
        match &self.decoder {
            Decoder::Wav { reader, .. } => Some(reader.spec().sample_rate),
            Decoder::Raw { .. } => None,
        }
    }
}

fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn open_file(path: &Path) -> Result<File, AudioError> {
    File::open(path).map_err(|source| AudioError::BackgroundOpen {
        path: path.to_path_buf(),
        source,
    })
}

fn open_raw(path: &Path) -> Result<Decoder, AudioError> {
    Ok(Decoder::Raw {
        reader: BufReader::new(open_file(path)?),
    })
}

fn open_wav(path: &Path) -> Result<Decoder, AudioError> {
    let file = BufReader::new(open_file(path)?);
    let reader = match hound::WavReader::new(file) {
        Ok(reader) => reader,
        Err(hound::Error::IoError(source)) if source.kind() != io::ErrorKind::UnexpectedEof => {
            return Err(AudioError::BackgroundOpen {
                path: path.to_path_buf(),
                source,
            });
        }
        Err(err) => {
            warn!("Not a valid WAV file, treating as RAW ({err})");
            return open_raw(path);
        }
    };

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || !matches!(spec.bits_per_sample, 16 | 24) {
        return Err(MixError::UnsupportedBitDepth {
            bits: spec.bits_per_sample,
        }
        .into());
    }
    debug!(
        channels = spec.channels,
        rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "background wav"
    );

    Ok(Decoder::Wav {
        channels: spec.channels,
        bits: spec.bits_per_sample,
        reader,
    })
}

/// Scales a decoded sample to 20 bits.
fn scale(sample: i32, bits: u16) -> i32 {
    if bits == 24 {
        sample >> 4
    } else {
        sample << 4
    }
}

impl MixSource for BackgroundFile {
    fn read(&mut self, dst: &mut [i32]) -> Result<usize, MixError> {
        match &mut self.decoder {
            Decoder::Wav {
                reader,
                channels,
                bits,
            } => {
                let channels = usize::from(*channels);
                let bits = *bits;
                let mut samples = reader.samples::<i32>();
                let mut frame = [0i32; 2];
                let mut n = 0;
                'frames: while n + 2 <= dst.len() {
                    for c in 0..channels {
                        let Some(sample) = samples.next() else {
                            break 'frames;
                        };
                        if c < 2 {
                            frame[c] = scale(sample?, bits);
                        }
                    }
                    // Mono plays in both ears.
                    if channels == 1 {
                        frame[1] = frame[0];
                    }
                    dst[n..n + 2].copy_from_slice(&frame);
                    n += 2;
                }
                Ok(n)
            }
            Decoder::Raw { reader } => {
                let mut n = 0;
                while n < dst.len() {
                    match reader.read_i16::<LittleEndian>() {
                        Ok(sample) => {
                            dst[n] = i32::from(sample) << 4;
                            n += 1;
                        }
                        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => break,
                        Err(err) => return Err(MixError::Read(err)),
                    }
                }
                Ok(n)
            }
        }
    }

    fn restart(&mut self) -> Result<bool, MixError> {
        let reopened = match self.decoder {
            Decoder::Wav { .. } => open_wav(&self.path),
            Decoder::Raw { .. } => open_raw(&self.path),
        };
        match reopened {
            Ok(decoder) => {
                self.decoder = decoder;
                Ok(true)
            }
            Err(err) => {
                warn!("Could not seek to beginning of background file for loop: {err}");
                Ok(false)
            }
        }
    }
}
