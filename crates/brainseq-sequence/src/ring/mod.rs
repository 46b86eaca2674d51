//! Circular timeline of periods.
//!
//! Periods live in an arena and link to their neighbours by index. The
//! compiler inserts and unlinks nodes freely; unlinked nodes stay in the
//! arena marked dead, so indices held elsewhere never dangle.

pub mod compile;


use serde::Serialize;

use crate::voice::{VoiceSet, SILENT_SET};

pub use compile::{compile, CompileOptions};

/// How a channel leaves or enters a period boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeMode {
    /// Fade to silence and back.
    Silence,
    /// Fade through: slide when the settings match, else via silence.
    #[default]
    Through,
    /// Always slide from one setting to the next.
    Slide,
}

/// Compilation state of a transition placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionMark {
    /// Has no time yet; takes its successor's time.
    Unresolved,
    /// Timed, but may still be stretched to the fade interval.
    Pending,
    /// Written by a timeline entry; always slides.
    Slide,
}

/// One node of the ring: the interval from `time` to the next node's time.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// Start of the interval, ms since midnight.
    pub time: u32,
    /// Voices at the start of the interval.
    pub start: VoiceSet,
    /// Voices at the end of the interval.
    pub end: VoiceSet,
    pub fade_in: FadeMode,
    pub fade_out: FadeMode,
    /// Set while the node is an uncompiled transition.
    pub transition: Option<TransitionMark>,
    prev: usize,
    next: usize,
    live: bool,
}

impl Period {
    /// A period holding `voices` steady for its whole length.
    pub fn steady(time: u32, voices: VoiceSet) -> Self {
        Self {
            time,
            start: voices,
            end: voices,
            fade_in: FadeMode::Through,
            fade_out: FadeMode::Through,
            transition: None,
            prev: 0,
            next: 0,
            live: true,
        }
    }

    /// A transition placeholder; its voices are filled in by the compiler.
    pub fn transition(time: u32, mark: TransitionMark) -> Self {
        Self {
            transition: Some(mark),
            ..Self::steady(time, SILENT_SET)
        }
    }

    /// True while the node is linked into its ring.
    pub fn is_live(&self) -> bool {
        self.live
    }
}

/// Arena-backed circular doubly-linked list of periods.
#[derive(Debug, Clone, Default)]
pub struct PeriodRing {
    nodes: Vec<Period>,
    head: Option<usize>,
    len: usize,
}

impl PeriodRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the head node, if any.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Moves the head to another linked node.
    pub fn set_head(&mut self, idx: usize) {
        debug_assert!(self.nodes[idx].live);
        self.head = Some(idx);
    }

    pub fn get(&self, idx: usize) -> &Period {
        &self.nodes[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Period {
        &mut self.nodes[idx]
    }

    pub fn next(&self, idx: usize) -> usize {
        self.nodes[idx].next
    }

    pub fn prev(&self, idx: usize) -> usize {
        self.nodes[idx].prev
    }

    /// Appends a node just before the head, at the end of the ring.
    pub fn push_back(&mut self, period: Period) -> usize {
        match self.head {
            None => {
                let idx = self.alloc(period);
                self.nodes[idx].prev = idx;
                self.nodes[idx].next = idx;
                self.head = Some(idx);
                self.len = 1;
                idx
            }
            Some(head) => {
                let tail = self.nodes[head].prev;
                self.insert_after(tail, period)
            }
        }
    }

    /// Links a new node directly after `idx`.
    pub fn insert_after(&mut self, idx: usize, period: Period) -> usize {
        let next = self.nodes[idx].next;
        let new = self.alloc(period);
        self.nodes[new].prev = idx;
        self.nodes[new].next = next;
        self.nodes[idx].next = new;
        self.nodes[next].prev = new;
        self.len += 1;
        new
    }

    /// Unlinks `idx`. If it was the head, the head moves to its predecessor.
    pub fn unlink(&mut self, idx: usize) {
        if !self.nodes[idx].live {
            return;
        }
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].live = false;
        self.len -= 1;

        if self.head == Some(idx) {
            self.head = (self.len > 0).then_some(prev);
        }
    }

    /// Walks one lap of the ring starting at `start`.
    pub fn iter_from(&self, start: usize) -> RingIter<'_> {
        RingIter {
            ring: self,
            start,
            cursor: Some(start),
        }
    }

    /// One lap from the head; empty for an empty ring.
    pub fn iter(&self) -> RingIter<'_> {
        RingIter {
            ring: self,
            start: self.head.unwrap_or(0),
            cursor: self.head,
        }
    }

    fn alloc(&mut self, mut period: Period) -> usize {
        period.live = true;
        self.nodes.push(period);
        self.nodes.len() - 1
    }
}

/// Iterator over node indices for one lap of a [`PeriodRing`].
pub struct RingIter<'a> {
    ring: &'a PeriodRing,
    start: usize,
    cursor: Option<usize>,
}

impl Iterator for RingIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.cursor?;
        let next = self.ring.next(current);
        self.cursor = (next != self.start).then_some(next);
        Some(current)
    }
}
