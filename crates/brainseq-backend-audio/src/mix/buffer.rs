//! Lock-free ring between the decoder thread and the synthesis thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, warn};

use super::MixSource;
use crate::error::MixError;

/// Default ring length in samples.
pub const MIX_BUFFER_LEN: usize = 256 * 1024;

/// Longest the consumer waits for data before giving up.
const STARVE_LIMIT_MS: u64 = 10_000;

/// Longest the consumer sleeps between polls.
const MAX_POLL_MS: u64 = 100;

/// Initial guess for the time the producer takes to wrap the ring.
const INITIAL_CYCLE_MS: u64 = 100;

/// State shared between both halves.
#[derive(Debug)]
struct Shared {
    /// The source ended and could not be restarted.
    eof: AtomicBool,
    /// The producer found no room for too long.
    halted: AtomicBool,
    /// The source failed; the error is returned by the thread.
    failed: AtomicBool,
    /// Ask the producer to exit.
    stop: AtomicBool,
    /// Measured time to wrap the ring once.
    cycle_ms: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            eof: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            cycle_ms: AtomicU64::new(INITIAL_CYCLE_MS),
        }
    }

    fn cycle(&self) -> u64 {
        self.cycle_ms.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.eof.store(false, Ordering::Release);
        self.halted.store(false, Ordering::Release);
        self.failed.store(false, Ordering::Release);
        self.stop.store(false, Ordering::Release);
    }
}

/// What the producer thread hands back when it exits.
struct ProducerExit {
    producer: HeapProd<i32>,
    source: Box<dyn MixSource>,
    error: Option<MixError>,
}

enum ProducerState {
    Running(JoinHandle<ProducerExit>),
    Finished(ProducerExit),
    /// Only while switching between the two states.
    Gone,
}

/// Consumer side of the background stream.
pub struct MixBuffer {
    consumer: HeapCons<i32>,
    shared: Arc<Shared>,
    state: ProducerState,
    len: usize,
}

impl MixBuffer {
    /// Preloads three quarters of a `len`-sample ring from `source` and starts
    /// the producer thread.
    ///
    /// `len` is rounded up to a power of two.
    pub fn start(source: Box<dyn MixSource>, len: usize) -> Result<Self, MixError> {
        let len = len.max(8).next_power_of_two();
        let (producer, consumer) = HeapRb::<i32>::new(len).split();
        let shared = Arc::new(Shared::new());
        let exit = ProducerExit {
            producer,
            source,
            error: None,
        };
        let state = spawn_producer(exit, Arc::clone(&shared), len)?;
        debug!(len, "mix buffer started");

        Ok(Self {
            consumer,
            shared,
            state,
            len,
        })
    }

    /// Ring length in samples.
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Samples ready to read.
    pub fn available(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Fills `dst` in FIFO order, waiting for the producer when needed.
    ///
    /// Returns fewer than `dst.len()` samples only once the stream has ended
    /// and the ring is drained.
    pub fn read(&mut self, dst: &mut [i32]) -> Result<usize, MixError> {
        let mut filled = 0;
        let mut waited = 0;
        while filled < dst.len() {
            let n = self.consumer.pop_slice(&mut dst[filled..]);
            if n > 0 {
                filled += n;
                waited = 0;
                continue;
            }

            if self.shared.eof.load(Ordering::Acquire) {
                // Samples pushed before the flag was raised are visible now.
                let n = self.consumer.pop_slice(&mut dst[filled..]);
                if n == 0 {
                    return Ok(filled);
                }
                filled += n;
                continue;
            }
            if self.shared.halted.load(Ordering::Acquire) {
                return Err(MixError::ProducerHalted);
            }
            if self.shared.failed.load(Ordering::Acquire) {
                return Err(self.take_error());
            }
            if waited > STARVE_LIMIT_MS {
                return Err(MixError::Starved);
            }

            let nap = MAX_POLL_MS.min(1 + self.shared.cycle() / 4);
            thread::sleep(Duration::from_millis(nap));
            waited += nap;
        }
        Ok(filled)
    }

    /// Rewinds the source and restarts the producer.
    ///
    /// Returns `Ok(false)` when the source cannot be replayed; the buffer then
    /// stays at end of stream.
    pub fn restart(&mut self) -> Result<bool, MixError> {
        let mut exit = self.finish()?;
        if let Some(err) = exit.error.take() {
            return Err(err);
        }
        if !exit.source.restart()? {
            self.state = ProducerState::Finished(exit);
            return Ok(false);
        }

        self.shared.reset();
        self.state = spawn_producer(exit, Arc::clone(&self.shared), self.len)?;
        debug!("mix stream restarted");
        Ok(true)
    }

    /// Stops the producer if it is still running and takes back its parts.
    fn finish(&mut self) -> Result<ProducerExit, MixError> {
        match std::mem::replace(&mut self.state, ProducerState::Gone) {
            ProducerState::Running(handle) => {
                self.shared.stop.store(true, Ordering::Release);
                handle.join().map_err(|_| MixError::Thread)
            }
            ProducerState::Finished(exit) => Ok(exit),
            ProducerState::Gone => Err(MixError::Thread),
        }
    }

    fn take_error(&mut self) -> MixError {
        match self.finish() {
            Ok(mut exit) => {
                let err = exit.error.take().unwrap_or(MixError::Thread);
                self.state = ProducerState::Finished(exit);
                err
            }
            Err(err) => err,
        }
    }
}

impl Drop for MixBuffer {
    fn drop(&mut self) {
        if let ProducerState::Running(handle) = std::mem::replace(&mut self.state, ProducerState::Gone) {
            self.shared.stop.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}

/// Preloads the ring on the calling thread, then spawns the producer loop.
fn spawn_producer(
    mut exit: ProducerExit,
    shared: Arc<Shared>,
    len: usize,
) -> Result<ProducerState, MixError> {
    let preload = (len * 3 / 4).min(exit.producer.vacant_len());
    let mut scratch = vec![0; preload];
    match exit.source.read(&mut scratch) {
        Ok(n) => {
            exit.producer.push_slice(&scratch[..n]);
        }
        Err(err) => {
            shared.failed.store(true, Ordering::Release);
            exit.error = Some(err);
            return Ok(ProducerState::Finished(exit));
        }
    }

    thread::Builder::new()
        .name("brainseq-mix".into())
        .spawn(move || produce(exit, &shared, len))
        .map(ProducerState::Running)
        .map_err(|_| MixError::Thread)
}

/// Producer loop: keeps the ring topped up in `len / 8` chunks.
fn produce(mut exit: ProducerExit, shared: &Shared, len: usize) -> ProducerExit {
    let chunk = len / 8;
    let mut scratch = vec![0; chunk];
    let mut waited = 0;
    let mut since_wrap = 0;
    let mut wrap_start: Option<Instant> = None;

    loop {
        if shared.stop.load(Ordering::Acquire) {
            return exit;
        }

        if exit.producer.vacant_len() < chunk {
            let cycle = shared.cycle();
            if waited > STARVE_LIMIT_MS + cycle {
                warn!("background producer halted");
                shared.halted.store(true, Ordering::Release);
                return exit;
            }
            let nap = 1 + cycle / 4;
            thread::sleep(Duration::from_millis(nap));
            waited += nap;
            continue;
        }
        waited = 0;

        let mut got = match exit.source.read(&mut scratch) {
            Ok(n) => n,
            Err(err) => return fail(exit, shared, err),
        };
        let mut ended = false;
        if got < chunk {
            match exit.source.restart() {
                Ok(true) => match exit.source.read(&mut scratch[got..]) {
                    Ok(n) => {
                        got += n;
                        ended = got < chunk;
                    }
                    Err(err) => return fail(exit, shared, err),
                },
                Ok(false) => ended = true,
                Err(err) => {
                    warn!("Could not restart background stream: {err}");
                    ended = true;
                }
            }
        }

        exit.producer.push_slice(&scratch[..got]);
        if ended {
            shared.eof.store(true, Ordering::Release);
            return exit;
        }

        since_wrap += got;
        if since_wrap >= len {
            since_wrap -= len;
            let now = Instant::now();
            if let Some(start) = wrap_start {
                let ms = now.duration_since(start).as_millis() as u64;
                if ms > 0 {
                    shared.cycle_ms.store(ms, Ordering::Relaxed);
                }
            }
            wrap_start = Some(now);
        }
    }
}

fn fail(mut exit: ProducerExit, shared: &Shared, err: MixError) -> ProducerExit {
    exit.error = Some(err);
    shared.failed.store(true, Ordering::Release);
    exit
}
