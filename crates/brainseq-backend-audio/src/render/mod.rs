//! Output pump.
//!
//! [`Renderer::run`] drives the engine one buffer at a time, encodes each
//! buffer in the chosen sample format and writes it to any `Write` sink.
//! Batch renders stop after the sequence's first-to-last span; real-time
//! renders follow the wall clock and run until the sink fails.

mod clock;
mod timing;


use std::io::Write;

use brainseq_sequence::{Sequence, SequenceOptions, VoiceSet, H12, H24};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, info, warn};

use crate::background::BackgroundFile;
use crate::engine::{Engine, EngineEvent};
use crate::error::{AudioError, AudioResult};
use crate::mix::{MixBuffer, MixSource, MIX_BUFFER_LEN};
use crate::wav::{clamp_data_len, write_header, WavFormat, HEADER_LEN, MAX_DATA_LEN};

pub use clock::{SystemClock, TimeSource};
pub use timing::{batch_byte_count, BufferTiming};

/// Output rate when neither the sequence nor the background sets one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Parameter updates per second.
pub const DEFAULT_UPDATE_RATE: u32 = 10;

/// PCM sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// Signed 16-bit little-endian.
    #[default]
    S16Le,
    /// Signed 16-bit big-endian.
    S16Be,
    /// Unsigned 8-bit, offset by 128.
    U8,
}

impl SampleFormat {
    pub fn bits(self) -> u16 {
        match self {
            SampleFormat::S16Le | SampleFormat::S16Be => 16,
            SampleFormat::U8 => 8,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        usize::from(self.bits() / 8)
    }

    /// Bytes per stereo frame.
    pub fn bytes_per_frame(self) -> u64 {
        2 * self.bytes_per_sample() as u64
    }

    /// Encodes `samples` into `out`, which must hold
    /// `samples.len() * bytes_per_sample()` bytes.
    pub fn encode(self, samples: &[i16], out: &mut [u8]) {
        match self {
            SampleFormat::S16Le => LittleEndian::write_i16_into(samples, out),
            SampleFormat::S16Be => BigEndian::write_i16_into(samples, out),
            SampleFormat::U8 => {
                for (byte, &s) in out.iter_mut().zip(samples) {
                    *byte = ((s >> 8) + 128) as u8;
                }
            }
        }
    }
}

/// File container around the PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    Wav,
    Raw,
}

/// How the render clock advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// As fast as possible, from the first to the last timeline entry.
    #[default]
    Batch,
    /// Starting at the current time of day, kept in step with the wall clock.
    Realtime,
}

/// Everything about a render that is not in the sequence itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub sample_rate: u32,
    /// Parameter updates per second; sets the buffer size.
    pub update_rate: u32,
    pub format: SampleFormat,
    pub container: Container,
    pub mode: RenderMode,
    /// Stop after this much audio, in ms, whatever the mode.
    pub limit_ms: Option<u32>,
    /// Background ring length in samples.
    pub mix_buffer_len: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            update_rate: DEFAULT_UPDATE_RATE,
            format: SampleFormat::default(),
            container: Container::default(),
            mode: RenderMode::default(),
            limit_ms: None,
            mix_buffer_len: MIX_BUFFER_LEN,
        }
    }
}

impl RenderSettings {
    /// Checks the settings for combinations that cannot be rendered.
    pub fn validate(&self) -> AudioResult<()> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if self.update_rate == 0 {
            return Err(AudioError::invalid_param("update_rate", "must be positive"));
        }
        if self.format == SampleFormat::S16Be && self.container == Container::Wav {
            return Err(AudioError::invalid_param(
                "format",
                "big-endian samples are only available for raw output",
            ));
        }
        Ok(())
    }
}

/// Output rate for a sequence: `@samplerate`, else the background file's
/// rate, else [`DEFAULT_SAMPLE_RATE`].
pub fn pick_sample_rate(options: &SequenceOptions, background: Option<&BackgroundFile>) -> u32 {
    options
        .sample_rate
        .or_else(|| background.and_then(BackgroundFile::sample_rate))
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

/// Receives progress while rendering.
pub trait RenderObserver {
    /// The render entered the period at ring index `period`.
    fn period_changed(&mut self, sequence: &Sequence, period: usize) {
        let _ = (sequence, period);
    }

    /// Periodic snapshot of the clock and the current voices.
    fn status(&mut self, now: u32, voices: &VoiceSet) {
        let _ = (now, voices);
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RenderObserver for NullObserver {}

/// Summary of a finished render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderReport {
    /// Header bytes written before the payload.
    pub header_bytes: u64,
    /// PCM payload bytes written.
    pub bytes: u64,
    /// Stereo frames in the payload.
    pub frames: u64,
    /// Buffers synthesized.
    pub buffers: u64,
    /// BLAKE3 hash of the payload, hex.
    pub pcm_hash: String,
}

/// Drives one sequence through the engine to a sink.
pub struct Renderer<'s> {
    engine: Engine<'s>,
    settings: RenderSettings,
    timing: BufferTiming,
    mix: Option<MixBuffer>,
    clock: Box<dyn TimeSource>,
}

impl<'s> Renderer<'s> {
    pub fn new(sequence: &'s Sequence, settings: RenderSettings) -> AudioResult<Self> {
        settings.validate()?;
        let engine = Engine::new(sequence, settings.sample_rate)?;
        let timing = BufferTiming::new(settings.sample_rate, settings.update_rate);
        debug!(
            samples = timing.samples,
            ms = timing.ms,
            frac = timing.ms_frac,
            "buffer geometry"
        );

        Ok(Self {
            engine,
            settings,
            timing,
            mix: None,
            clock: Box::new(SystemClock),
        })
    }

    /// Streams `source` into the mix through a background buffer.
    pub fn with_background(mut self, source: Box<dyn MixSource>) -> AudioResult<Self> {
        self.mix = Some(MixBuffer::start(source, self.settings.mix_buffer_len)?);
        Ok(self)
    }

    /// Replaces the wall clock used in real-time mode.
    pub fn with_clock(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn timing(&self) -> BufferTiming {
        self.timing
    }

    pub fn engine_mut(&mut self) -> &mut Engine<'s> {
        &mut self.engine
    }

    /// Renders to `sink` until the budget is spent.
    ///
    /// Without a budget (real-time mode, no limit) this only returns on a
    /// write or background error.
    pub fn run<W: Write>(
        &mut self,
        sink: &mut W,
        observer: &mut dyn RenderObserver,
    ) -> AudioResult<RenderReport> {
        let sequence = self.engine.sequence();
        let rate = self.settings.sample_rate;
        let format = self.settings.format;
        let realtime = self.settings.mode == RenderMode::Realtime;
        let timing = self.timing;

        let mut budget = match (self.settings.limit_ms, self.settings.mode) {
            (Some(limit), _) => Some(
                format.bytes_per_frame() * (f64::from(limit) * 0.001 * f64::from(rate)) as u64,
            ),
            (None, RenderMode::Batch) => Some(batch_byte_count(
                sequence.first_time(),
                sequence.last_time(),
                rate,
                format.bytes_per_frame(),
            )),
            (None, RenderMode::Realtime) => None,
        };

        let mut report = RenderReport::default();
        if self.settings.container == Container::Wav {
            let wav = WavFormat::stereo(rate, format.bits());
            let data_len = match budget {
                Some(bytes) => {
                    let clamped = clamp_data_len(bytes, &wav);
                    budget = Some(clamped);
                    clamped
                }
                None => MAX_DATA_LEN,
            };
            write_header(sink, &wav, data_len as u32)?;
            report.header_bytes = HEADER_LEN as u64;
        }

        let mut now = if realtime {
            self.clock.now_ms()
        } else {
            sequence.first_time()
        };
        info!(rate, ?format, ?budget, "render started");

        self.engine.seek(now);
        observer.period_changed(sequence, self.engine.period());
        observer.status(now, &self.engine.voices());

        let mut mix = vec![0i32; timing.samples];
        let mut pcm = vec![0i16; timing.samples];
        let mut bytes = vec![0u8; timing.samples * format.bytes_per_sample()];
        let mut hasher = blake3::Hasher::new();

        let ticks = timing.status_interval();
        let mut now_lo: i64 = 0;
        let mut err: i64 = 0;
        let mut err_lo: i64 = 0;

        loop {
            for _ in 0..ticks {
                self.engine.update(now, &mut |event| match event {
                    EngineEvent::PeriodChanged { period } => {
                        observer.period_changed(sequence, period)
                    }
                });
                self.fill_mix(&mut mix)?;
                self.engine.render_chunk(&mix, &mut pcm);
                format.encode(&pcm, &mut bytes);

                let take = budget.map_or(bytes.len(), |left| left.min(bytes.len() as u64) as usize);
                sink.write_all(&bytes[..take])?;
                hasher.update(&bytes[..take]);
                report.bytes += take as u64;
                report.buffers += 1;

                if let Some(left) = budget.as_mut() {
                    *left -= take as u64;
                    if *left == 0 {
                        sink.flush()?;
                        report.frames = report.bytes / format.bytes_per_frame();
                        report.pcm_hash = hasher.finalize().to_hex().to_string();
                        info!(bytes = report.bytes, "render finished");
                        return Ok(report);
                    }
                }

                let mut ms_inc = i64::from(timing.ms) + err;
                now_lo += i64::from(timing.ms_frac) + err_lo;
                if now_lo >= 0x10000 {
                    ms_inc += now_lo >> 16;
                    now_lo &= 0xFFFF;
                }
                now = (i64::from(now) + ms_inc).rem_euclid(i64::from(H24)) as u32;
            }

            observer.status(now, &self.engine.voices());

            if realtime {
                (err, err_lo) = clock_correction(self.clock.now_ms(), now, ticks);
            }
        }
    }

    /// Reads one buffer of background, restarting or falling silent at the end.
    fn fill_mix(&mut self, buf: &mut [i32]) -> AudioResult<()> {
        let Some(mix) = self.mix.as_mut() else {
            buf.fill(0);
            return Ok(());
        };

        let mut n = mix.read(buf)?;
        if n == 0 {
            match mix.restart() {
                Ok(true) => n = mix.read(buf)?,
                Ok(false) => {
                    warn!("Background sound ended; continuing without it");
                    self.mix = None;
                }
                Err(err) => {
                    warn!("Could not restart background sound: {err}");
                    self.mix = None;
                }
            }
        }
        buf[n..].fill(0);
        Ok(())
    }
}

/// Per-buffer clock error that spreads `wall - now` over `ticks` buffers.
///
/// Returns whole and fractional (1/65536) milliseconds. A difference of more
/// than twelve hours, as seen just after midnight, is dropped.
fn clock_correction(wall: u32, now: u32, ticks: u32) -> (i64, i64) {
    let mut diff = i64::from(wall) - i64::from(now);
    if diff.abs() > i64::from(H12) {
        diff = 0;
    }
    let per_tick = (diff << 16) / i64::from(ticks.max(1));
    (per_tick >> 16, per_tick & 0xFFFF)
}
