//! A compiled sequence, ready for synthesis.

use std::path::Path;

use crate::display::format_period;
use crate::error::{ErrorCode, SequenceError, SequenceResult};
use crate::options::SequenceOptions;
use crate::parser::Parser;
use crate::ring::{CompileOptions, Period, PeriodRing, RingIter};
use crate::time::period_length_0;

/// The compiled period ring plus everything the renderer needs to know
/// about the sequence as a whole.
#[derive(Debug, Clone)]
pub struct Sequence {
    ring: PeriodRing,
    head: usize,
    options: SequenceOptions,
    first_time: u32,
    last_time: u32,
    uses_background: bool,
}

impl Sequence {
    pub(crate) fn new(
        ring: PeriodRing,
        options: SequenceOptions,
        entry_times: &[u32],
        uses_background: bool,
    ) -> SequenceResult<Self> {
        let too_few = || {
            SequenceError::timeline(
                ErrorCode::TooFewTimes,
                "Sequence must have at least a start and end time.",
            )
        };
        let head = ring.head().ok_or_else(too_few)?;
        let first_time = *entry_times.first().ok_or_else(too_few)?;
        let last_time = *entry_times.last().ok_or_else(too_few)?;

        Ok(Self {
            ring,
            head,
            options,
            first_time,
            last_time,
            uses_background,
        })
    }

    /// Parses and compiles in-memory sequence text with default settings.
    pub fn parse(text: &str) -> SequenceResult<Self> {
        let mut parser = Parser::new();
        parser.parse_str(text)?;
        parser.finish(&CompileOptions::default())
    }

    /// Reads and compiles one or more sequence files in order.
    ///
    /// `echo` receives the text of every `##` comment.
    pub fn load<P: AsRef<Path>>(
        paths: &[P],
        options: &CompileOptions,
        echo: impl FnMut(&str),
    ) -> SequenceResult<Self> {
        let mut parser = Parser::new().with_echo(echo);
        for path in paths {
            parser.parse_file(path.as_ref())?;
        }
        parser.finish(options)
    }

    pub fn ring(&self) -> &PeriodRing {
        &self.ring
    }

    /// Index of the node the ring was left at by compilation.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    /// Time of the first timeline entry.
    pub fn first_time(&self) -> u32 {
        self.first_time
    }

    /// Time of the last timeline entry.
    pub fn last_time(&self) -> u32 {
        self.last_time
    }

    /// Length of a batch render, from the first to the last entry.
    pub fn duration_ms(&self) -> u32 {
        period_length_0(self.first_time, self.last_time)
    }

    /// True when some preset mixes the background stream.
    pub fn uses_background(&self) -> bool {
        self.uses_background
    }

    /// Node with the earliest start time.
    pub fn earliest(&self) -> usize {
        let mut idx = self.head;
        if self.ring.len() > 1 {
            while self.ring.get(self.ring.prev(idx)).time < self.ring.get(idx).time {
                idx = self.ring.next(idx);
            }
        }
        idx
    }

    /// One lap of the ring starting from the earliest period.
    pub fn periods_from_earliest(&self) -> RingIter<'_> {
        self.ring.iter_from(self.earliest())
    }

    pub fn period(&self, idx: usize) -> &Period {
        self.ring.get(idx)
    }

    /// End time of the period at `idx`.
    pub fn period_end(&self, idx: usize) -> u32 {
        self.ring.get(self.ring.next(idx)).time
    }

    /// The full timeline as text, two lines per period.
    pub fn describe(&self) -> String {
        self.periods_from_earliest()
            .map(|idx| {
                let p = self.period(idx);
                format_period(p.time, self.period_end(idx), &p.start, &p.end)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::H24;
    use pretty_assertions::assert_eq;

    const SESSION: &str = "\
# test session
alpha
  tone 200 binaural 10 amplitude 50

00:00:00 silence
00:00:10 alpha
00:00:20 silence
";

    #[test]
    fn test_parse_and_compile() {
        let seq = Sequence::parse(SESSION).unwrap();
        assert_eq!(seq.first_time(), 0);
        assert_eq!(seq.last_time(), 20_000);
        assert_eq!(seq.duration_ms(), 20_000);
        assert!(!seq.uses_background());
        assert_eq!(seq.ring().len(), 3);
    }

    #[test]
    fn test_earliest_rotates_to_midnight() {
        let seq = Sequence::parse(SESSION).unwrap();
        let times: Vec<u32> = seq
            .periods_from_earliest()
            .map(|i| seq.period(i).time)
            .collect();
        assert_eq!(times, vec![0, 10_000, 20_000]);
        assert_eq!(seq.period_end(seq.earliest()), 10_000);
        let last = seq.periods_from_earliest().last().unwrap();
        assert_eq!(seq.period_end(last), 0);
        assert!(seq.period(last).time < H24);
    }

    #[test]
    fn test_describe_shows_fades() {
        let seq = Sequence::parse(SESSION).unwrap();
        let text = seq.describe();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "- 00:00:00");
        assert_eq!(
            lines[1],
            "\twaveform sine tone 200.00 binaural 10.00 amplitude 0.00 "
        );
        assert_eq!(lines[2], "  00:00:10");
        assert_eq!(
            lines[3],
            "\twaveform sine tone 200.00 binaural 10.00 amplitude 50.00"
        );
        assert_eq!(lines[4], "- 00:00:10");
    }
}
