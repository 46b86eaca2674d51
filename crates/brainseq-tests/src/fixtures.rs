//! Canonical sequences and helpers for rendering them.

use std::fs;
use std::path::{Path, PathBuf};

use brainseq_backend_audio::{NullObserver, RenderReport, RenderSettings, Renderer};
use brainseq_sequence::Sequence;
use tempfile::TempDir;

/// Silence, a 440 Hz carrier with a 4 Hz binaural beat at 10 s, silence at 20 s.
pub const TONE_440: &str = "\
# fade in to a 440 Hz carrier and back out
tone440
  tone 440 binaural 4 amplitude 50

00:00:00 silence
00:00:10 tone440
00:00:20 silence
";

/// The second entry is earlier than the first.
pub const OUT_OF_ORDER: &str = "\
tone440
  tone 440 binaural 4 amplitude 50
00:00:10 tone440
00:00:05 silence
";

/// A definition header with no indented lines under it.
pub const EMPTY_DEFINITION: &str = "\
empty
00:00:00 silence
00:00:10 empty
";

/// Several voice kinds at once, for determinism checks.
pub const LAYERED: &str = "\
@volume 80
deep
  tone 150 binaural 2.5 amplitude 30
  noise pink amplitude 20
  tone 300 isochronic 10 amplitude 15
  spin pink width 300 rate 4 amplitude 10
drift
  tone 200 monaural 6 amplitude 30
  noise brown amplitude 25

00:00:00 deep
00:00:03 drift
00:00:06 deep
";

/// Renders `text` to an in-memory WAV with default settings.
pub fn render_wav(text: &str) -> Vec<u8> {
    render_with(text, RenderSettings::default()).0
}

/// Renders `text` with `settings`, returning the bytes and the report.
pub fn render_with(text: &str, settings: RenderSettings) -> (Vec<u8>, RenderReport) {
    let sequence = Sequence::parse(text).expect("fixture sequence must compile");
    let mut out = Vec::new();
    let report = Renderer::new(&sequence, settings)
        .expect("fixture settings must be valid")
        .run(&mut out, &mut NullObserver)
        .expect("in-memory render cannot fail");
    (out, report)
}

/// A scratch directory of sequence files.
pub struct SequenceDir {
    pub root: TempDir,
}

impl SequenceDir {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Writes `content` to `name` and returns its path.
    pub fn add(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).expect("Failed to write sequence file");
        path
    }
}

impl Default for SequenceDir {
    fn default() -> Self {
        Self::new()
    }
}
