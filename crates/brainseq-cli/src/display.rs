//! Console progress display for `render`.
//!
//! Periods are printed in full as they start; between them a single status
//! line is rewritten in place with `\r`.

use std::io::Write;

use brainseq_backend_audio::RenderObserver;
use brainseq_sequence::{format_period, format_status, Sequence, VoiceSet};

/// Writes period changes and the status line to `out`.
pub struct ConsoleObserver<W: Write> {
    out: W,
    enabled: bool,
    /// Length of the status line currently on screen.
    status_len: usize,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W, enabled: bool) -> Self {
        Self {
            out,
            enabled,
            status_len: 0,
        }
    }

    /// Blanks out the status line so the next output starts clean.
    pub fn clear_status(&mut self) {
        if self.status_len > 0 {
            let _ = write!(self.out, "{}\r", " ".repeat(self.status_len));
            let _ = self.out.flush();
            self.status_len = 0;
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderObserver for ConsoleObserver<W> {
    fn period_changed(&mut self, sequence: &Sequence, period: usize) {
        if !self.enabled {
            return;
        }
        self.clear_status();
        let p = sequence.period(period);
        let text = format_period(p.time, sequence.period_end(period), &p.start, &p.end);
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn status(&mut self, now: u32, voices: &VoiceSet) {
        if !self.enabled {
            return;
        }
        let line = format_status(now, voices);
        // Pad over whatever is left of a longer previous line.
        let pad = self.status_len.saturating_sub(line.len());
        let _ = write!(self.out, "{line}{}\r", " ".repeat(pad));
        let _ = self.out.flush();
        self.status_len = line.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainseq_sequence::H24;
    use pretty_assertions::assert_eq;

    const SESSION: &str = "\
alpha
  tone 200 binaural 10 amplitude 50
00:00:00 silence
00:00:10 alpha
00:00:20 silence
";

    fn text(observer: ConsoleObserver<Vec<u8>>) -> String {
        String::from_utf8(observer.into_inner()).unwrap()
    }

    #[test]
    fn test_period_is_printed_in_full() {
        let seq = Sequence::parse(SESSION).unwrap();
        let mut observer = ConsoleObserver::new(Vec::new(), true);
        let idx = seq.earliest();
        observer.period_changed(&seq, idx);

        let out = text(observer);
        let p = seq.period(idx);
        assert_eq!(out, format_period(p.time, seq.period_end(idx), &p.start, &p.end));
        assert!(out.starts_with("- 00:00:00"));
    }

    #[test]
    fn test_status_line_is_overwritten() {
        let seq = Sequence::parse(SESSION).unwrap();
        let voices = seq.period(seq.earliest()).end;
        let mut observer = ConsoleObserver::new(Vec::new(), true);
        observer.status(5000, &voices);
        observer.status(6000, &voices);

        let out = text(observer);
        let first = format_status(5000, &voices);
        let second = format_status(6000, &voices);
        assert_eq!(out, format!("{first}\r{second}\r"));
    }

    #[test]
    fn test_status_is_cleared_before_period() {
        let seq = Sequence::parse(SESSION).unwrap();
        let voices = seq.period(seq.earliest()).start;
        let mut observer = ConsoleObserver::new(Vec::new(), true);
        observer.status(H24 - 1, &voices);
        let len = format_status(H24 - 1, &voices).len();
        observer.period_changed(&seq, seq.earliest());

        let out = text(observer);
        let blank = format!("{}\r", " ".repeat(len));
        assert!(out.contains(&blank));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_disabled_prints_nothing() {
        let seq = Sequence::parse(SESSION).unwrap();
        let mut observer = ConsoleObserver::new(Vec::new(), false);
        observer.period_changed(&seq, seq.earliest());
        observer.status(0, &seq.period(seq.earliest()).start);
        assert!(text(observer).is_empty());
    }
}
