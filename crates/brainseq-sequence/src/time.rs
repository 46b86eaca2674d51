//! Wraparound-safe arithmetic on a 24-hour millisecond clock.
//!
//! Instants are milliseconds since midnight in `[0, H24)`. The two length
//! functions differ only in how they treat `t0 == t1`: a full day for
//! [`period_length_24`], nothing for [`period_length_0`]. Every fade ratio in
//! the engine depends on getting that distinction right.

/// Milliseconds in 24 hours.
pub const H24: u32 = 86_400_000;

/// Milliseconds in 12 hours.
pub const H12: u32 = 43_200_000;

/// Length of the period from `t0` forward to `t1`; a full day when equal.
pub fn period_length_24(t0: u32, t1: u32) -> u32 {
    let td = i64::from(t1) - i64::from(t0);
    if td > 0 {
        td as u32
    } else {
        (td + i64::from(H24)) as u32
    }
}

/// Length of the period from `t0` forward to `t1`; zero when equal.
pub fn period_length_0(t0: u32, t1: u32) -> u32 {
    let td = i64::from(t1) - i64::from(t0);
    if td >= 0 {
        td as u32
    } else {
        (td + i64::from(H24)) as u32
    }
}

/// Wrap-aware midpoint of the period from `t0` to `t1`.
pub fn midpoint(t0: u32, t1: u32) -> u32 {
    let sum = if t1 < t0 {
        u64::from(H24) + u64::from(t0) + u64::from(t1)
    } else {
        u64::from(t0) + u64::from(t1)
    };
    ((sum / 2) % u64::from(H24)) as u32
}

/// Returns true while `now` lies inside the interval starting at `t0` and
/// ending at `t1`, going forward around the clock.
///
/// When `t0 == t1` the interval covers the whole day.
pub fn in_interval(now: u32, t0: u32, t1: u32) -> bool {
    !((now >= t0) ^ (now >= t1) ^ (t1 > t0))
}

/// Parses one time word made of one or more concatenated `H:M:S` groups.
///
/// Each field takes one or two digits. Groups are summed modulo 24 hours, so
/// `00:30:0000:15:00` is 00:45:00. Returns `None` for malformed input or an
/// out-of-range field.
pub fn parse_time_token(word: &str) -> Option<u32> {
    let bytes = word.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    let mut pos = 0;
    let mut total: u32 = 0;
    while pos < bytes.len() {
        let (hh, next) = read_field(bytes, pos)?;
        pos = expect_colon(bytes, next)?;
        let (mm, next) = read_field(bytes, pos)?;
        pos = expect_colon(bytes, next)?;
        let (ss, next) = read_field(bytes, pos)?;
        pos = next;

        if hh >= 24 || mm >= 60 || ss >= 60 {
            return None;
        }
        let group = ((hh * 60 + mm) * 60 + ss) * 1000;
        total = (total + group) % H24;
    }
    Some(total)
}

fn read_field(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    let mut value = 0u32;
    let mut pos = start;
    while pos < bytes.len() && pos - start < 2 && bytes[pos].is_ascii_digit() {
        value = value * 10 + u32::from(bytes[pos] - b'0');
        pos += 1;
    }
    if pos == start {
        None
    } else {
        Some((value, pos))
    }
}

fn expect_colon(bytes: &[u8], pos: usize) -> Option<usize> {
    (bytes.get(pos) == Some(&b':')).then_some(pos + 1)
}

/// Formats an instant as `HH:MM:SS`.
pub fn format_time(ms: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        ms % H24 / 3_600_000,
        ms % 3_600_000 / 60_000,
        ms % 60_000 / 1000
    )
}

/// Formats a length in seconds as `XhYYmZZs`.
pub fn format_duration_hms(secs: u64) -> String {
    format!("{}h{:02}m{:02}s", secs / 3600, secs / 60 % 60, secs % 60)
}
