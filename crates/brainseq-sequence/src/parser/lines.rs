//! Physical line reader with comment stripping and one-line pushback.

/// One non-blank physical line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    /// 1-based line number within its source.
    pub number: usize,
    /// Text before any comment, trailing whitespace removed, indentation kept.
    pub body: String,
}

impl SourceLine {
    /// The body without its indentation.
    pub fn content(&self) -> &str {
        self.body.trim_start()
    }
}

/// Reads lines from one source text.
///
/// `#` starts a comment. A `##` comment is handed to the echo callback
/// when its line is first read; pushed-back lines are not echoed again.
pub struct LineReader<'t> {
    lines: std::iter::Enumerate<std::str::Lines<'t>>,
    pushed: Option<SourceLine>,
}

impl<'t> LineReader<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            pushed: None,
        }
    }

    /// Returns a line to the reader; the next call yields it again.
    pub fn push_back(&mut self, line: SourceLine) {
        debug_assert!(self.pushed.is_none());
        self.pushed = Some(line);
    }

    /// Next non-blank line, or `None` at end of input.
    pub fn next_line(&mut self, echo: &mut dyn FnMut(&str)) -> Option<SourceLine> {
        if let Some(line) = self.pushed.take() {
            return Some(line);
        }

        for (idx, raw) in self.lines.by_ref() {
            let body = match raw.find('#') {
                Some(pos) => {
                    if let Some(note) = raw[pos + 1..].strip_prefix('#') {
                        echo(note.trim_end());
                    }
                    &raw[..pos]
                }
                None => raw,
            };
            let body = body.trim_end();
            if body.trim_start().is_empty() {
                continue;
            }
            return Some(SourceLine {
                number: idx + 1,
                body: body.to_string(),
            });
        }
        None
    }
}
