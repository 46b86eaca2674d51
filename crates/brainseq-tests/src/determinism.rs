//! Byte-for-byte determinism checks.
//!
//! A render is deterministic when every run of it produces the same bytes.
//! [`verify_determinism`] runs a closure several times and reports the first
//! byte that differs, if any.

use std::fmt;

/// Outcome of a determinism check.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    pub is_deterministic: bool,
    pub runs: usize,
    /// Length of the first run's output.
    pub output_size: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    pub diff: Option<DiffInfo>,
}

/// First mismatch between the reference run and a later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    pub run_index: usize,
    pub offset: usize,
    /// Reference byte, or `None` past its end.
    pub expected: Option<u8>,
    /// Later run's byte, or `None` past its end.
    pub actual: Option<u8>,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| b.map_or_else(|| "end".to_string(), |b| format!("0x{b:02X}"));
        write!(
            f,
            "run {} differs at byte {}: expected {}, got {}",
            self.run_index,
            self.offset,
            show(self.expected),
            show(self.actual)
        )
    }
}

impl DeterminismResult {
    /// Panics with the first difference when the runs disagree.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff {
            panic!(
                "Non-deterministic output after {} runs ({} bytes, hash {}): {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Runs `render` `runs` times and compares every output with the first.
pub fn verify_determinism<F, O>(render: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = render();
    let reference = reference.as_ref();
    let hash = blake3::hash(reference).to_hex().to_string();

    let diff = (1..runs).find_map(|run_index| {
        let output = render();
        first_difference(reference, output.as_ref(), run_index)
    });

    DeterminismResult {
        is_deterministic: diff.is_none(),
        runs,
        output_size: reference.len(),
        hash,
        diff,
    }
}

fn first_difference(expected: &[u8], actual: &[u8], run_index: usize) -> Option<DiffInfo> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;

    Some(DiffInfo {
        run_index,
        offset,
        expected: expected.get(offset).copied(),
        actual: actual.get(offset).copied(),
    })
}
