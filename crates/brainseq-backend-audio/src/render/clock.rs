//! Wall-clock source for real-time rendering.

use chrono::{Local, NaiveTime, Timelike};

use brainseq_sequence::H24;

/// Supplies the current time of day.
pub trait TimeSource {
    /// Milliseconds since midnight, in `[0, H24)`.
    fn now_ms(&mut self) -> u32;
}

/// The system clock, as local time of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&mut self) -> u32 {
        time_of_day_ms(Local::now().time())
    }
}

/// A leap second is held at the last millisecond of its second.
fn time_of_day_ms(time: NaiveTime) -> u32 {
    let millis = (time.nanosecond() / 1_000_000).min(999);
    (time.num_seconds_from_midnight() * 1000 + millis) % H24
}
