//! One-shot compilation of a freshly parsed ring.
//!
//! The parser leaves a steady period for every timeline entry followed by a
//! transition placeholder. Compilation times the placeholders, fills in
//! their voices, validates the entry times and folds away zero-length and
//! redundant periods. Afterwards the ring is read-only.

use std::collections::HashSet;

use tracing::debug;

use super::{FadeMode, Period, PeriodRing, TransitionMark};
use crate::error::{ErrorCode, SequenceError, SequenceResult};
use crate::time::{format_time, midpoint, period_length_0};
use crate::voice::{voice_sets_equal, Voice, VoiceKind, CHANNEL_COUNT};

/// Default minimum length of a transition, in ms.
pub const DEFAULT_FADE_INTERVAL_MS: u32 = 60_000;

/// Compiler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Transitions shorter than this are stretched into their neighbours.
    pub fade_interval_ms: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fade_interval_ms: DEFAULT_FADE_INTERVAL_MS,
        }
    }
}

/// Compiles `ring` in place.
///
/// `entry_times` are the timeline entry times in the order they were read.
pub fn compile(
    ring: &mut PeriodRing,
    entry_times: &[u32],
    options: &CompileOptions,
) -> SequenceResult<()> {
    if ring.head().is_some() {
        resolve_transition_times(ring);
        stretch_short_transitions(ring, options.fade_interval_ms);
        expand_transitions(ring);
    }
    validate_entry_times(entry_times)?;
    let before = ring.len();
    remove_degenerate(ring);
    debug!(
        nodes = ring.len(),
        removed = before - ring.len(),
        "compiled period ring"
    );
    Ok(())
}

/// Gives every unresolved placeholder its successor's time.
fn resolve_transition_times(ring: &mut PeriodRing) {
    let lap: Vec<usize> = ring.iter().collect();
    for idx in lap {
        if ring.get(idx).transition == Some(TransitionMark::Unresolved) {
            let next_time = ring.get(ring.next(idx)).time;
            let node = ring.get_mut(idx);
            node.time = next_time;
            node.transition = Some(TransitionMark::Pending);
        }
    }
}

/// Widens pending transitions to the fade interval where the neighbouring
/// periods leave room.
///
/// Only `Unresolved` marks become pending, and the timeline parser never
/// emits those: its entries carry `Slide` marks. This pass only acts on
/// rings built directly against the compile stage.
fn stretch_short_transitions(ring: &mut PeriodRing, fade_interval: u32) {
    let lap: Vec<usize> = ring.iter().collect();
    for idx in lap {
        if ring.get(idx).transition != Some(TransitionMark::Pending) {
            continue;
        }
        let prev = ring.prev(idx);
        let next = ring.next(idx);
        let after = ring.next(next);
        let (t_prev, t, t_next, t_after) = (
            ring.get(prev).time,
            ring.get(idx).time,
            ring.get(next).time,
            ring.get(after).time,
        );

        let len = period_length_0(t, t_next);
        if len >= fade_interval {
            continue;
        }
        let adj = (fade_interval - len) / 2;
        let back = adj.min(period_length_0(t_prev, t));
        let forward = adj.min(period_length_0(t_next, t_after));

        ring.get_mut(idx).time = shift(t, -i64::from(back));
        ring.get_mut(next).time = shift(t_next, i64::from(forward));
    }
}

fn shift(t: u32, by: i64) -> u32 {
    (i64::from(t) + by).rem_euclid(i64::from(crate::time::H24)) as u32
}

/// Fills in the voices of every transition, splitting it at its midpoint
/// when some channel has to pass through silence.
fn expand_transitions(ring: &mut PeriodRing) {
    let Some(head) = ring.head() else {
        return;
    };

    let mut idx = head;
    loop {
        if let Some(mark) = ring.get(idx).transition {
            idx = expand_one(ring, idx, mark);
        }
        idx = ring.next(idx);
        if idx == head {
            break;
        }
    }
}

/// Expands the transition at `idx`; returns the last node it occupies.
fn expand_one(ring: &mut PeriodRing, idx: usize, mark: TransitionMark) -> usize {
    let prev = ring.prev(idx);
    let next = ring.next(idx);
    let t = ring.get(idx).time;
    let t_next = ring.get(next).time;

    let mut from = ring.get(prev).end;
    let mut to = ring.get(next).start;
    let mut fade_out = ring.get(prev).fade_out;
    let mut fade_in = ring.get(next).fade_in;

    if mark == TransitionMark::Slide {
        fade_out = FadeMode::Slide;
        fade_in = FadeMode::Slide;
        for ch in 0..CHANNEL_COUNT {
            if from[ch].is_off() && !to[ch].is_off() {
                from[ch] = to[ch].with_amplitude(0.0);
            } else if !from[ch].is_off() && to[ch].is_off() {
                to[ch] = from[ch].with_amplitude(0.0);
            }
        }
    }

    // `near` ends the first half, `far` starts the second.
    let mut near = from;
    let mut far = to;
    let mut needs_midpoint = false;

    for ch in 0..CHANNEL_COUNT {
        let (a, b) = (near[ch], far[ch]);
        if must_pass_through_silence(&a, &b, fade_out, fade_in) {
            near[ch] = a.with_amplitude(0.0);
            far[ch] = b.with_amplitude(0.0);
            needs_midpoint = true;
        } else {
            let amp = (a.amplitude() + b.amplitude()) / 2.0;
            let (mut na, mut nb) = (a.with_amplitude(amp), b.with_amplitude(amp));
            if matches!(a.kind(), VoiceKind::Binaural | VoiceKind::SpinPink) {
                let ((c0, r0), (c1, r1)) = (a.pitch(), b.pitch());
                let (c, r) = ((c0 + c1) / 2.0, (r0 + r1) / 2.0);
                na = na.with_pitch(c, r);
                nb = nb.with_pitch(c, r);
            }
            near[ch] = na;
            far[ch] = nb;
        }
    }

    let node = ring.get_mut(idx);
    node.start = from;
    node.transition = None;

    if needs_midpoint {
        node.end = near;
        let mut mid = Period::steady(midpoint(t, t_next), far);
        mid.end = to;
        ring.insert_after(idx, mid)
    } else {
        node.end = to;
        idx
    }
}

fn must_pass_through_silence(a: &Voice, b: &Voice, fade_out: FadeMode, fade_in: FadeMode) -> bool {
    let through = fade_out == FadeMode::Through || fade_in == FadeMode::Through;
    fade_out == FadeMode::Silence
        || fade_in == FadeMode::Silence
        || a.kind() != b.kind()
        || a.waveform() != b.waveform()
        || (through && a.kind() == VoiceKind::Binaural && a.pitch() != b.pitch())
}

/// Checks the timeline entry times.
pub fn validate_entry_times(times: &[u32]) -> SequenceResult<()> {
    let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
        return Err(too_few_times());
    };
    if times.len() < 2 {
        return Err(too_few_times());
    }

    if first >= last {
        return Err(SequenceError::timeline(
            ErrorCode::OutOfOrder,
            format!(
                "Times out of chronological order.\nFirst time: {}\nLast time: {}\n\
                 Last time must be greater than first time.",
                format_time(first),
                format_time(last)
            ),
        ));
    }

    let mut seen = HashSet::with_capacity(times.len());
    if let Some(&dup) = times.iter().find(|t| !seen.insert(**t)) {
        return Err(SequenceError::timeline(
            ErrorCode::DuplicateTime,
            format!(
                "Duplicate time found: {}\nEach time in sequence must be unique.",
                format_time(dup)
            ),
        ));
    }

    if let Some(pair) = times.windows(2).find(|w| w[1] < w[0]) {
        return Err(SequenceError::timeline(
            ErrorCode::OutOfOrder,
            format!(
                "Times out of chronological order: {} comes after {}\n\
                 Times in sequence file must be written in ascending chronological order.",
                format_time(pair[1]),
                format_time(pair[0])
            ),
        ));
    }

    let earliest = times.iter().copied().min().unwrap_or(first);
    if earliest != 0 {
        return Err(SequenceError::timeline(
            ErrorCode::MissingStart,
            format!(
                "Sequence must start at 00:00:00.\nFirst time found: {}\n\
                 Add a period starting at 00:00:00 to your sequence.",
                format_time(earliest)
            ),
        ));
    }

    Ok(())
}

fn too_few_times() -> SequenceError {
    SequenceError::timeline(
        ErrorCode::TooFewTimes,
        "Sequence must have at least a start and end time.",
    )
}

/// Folds zero-length periods and periods that merely continue a steady
/// neighbour, until nothing changes or one node is left.
fn remove_degenerate(ring: &mut PeriodRing) {
    while ring.len() > 1 {
        let lap: Vec<usize> = ring.iter().collect();
        let mut removed = false;

        for idx in lap {
            let next = ring.next(idx);
            let (node, succ) = (ring.get(idx), ring.get(next));
            if voice_sets_equal(&node.start, &node.end)
                && voice_sets_equal(&node.start, &succ.start)
                && voice_sets_equal(&node.start, &succ.end)
            {
                let time = node.time;
                ring.get_mut(next).time = time;
            }

            if ring.get(idx).time == ring.get(next).time {
                ring.unlink(idx);
                removed = true;
                break;
            }
        }

        if !removed {
            break;
        }
    }
}
