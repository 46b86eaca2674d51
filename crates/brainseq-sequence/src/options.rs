//! Options set by `@key value` lines at the top of a sequence file.

use std::path::PathBuf;

use serde::Serialize;

/// Background gain reduction presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GainLevel {
    VeryLow,
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl GainLevel {
    /// Parses a `@gainlevel` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "verylow" => Some(GainLevel::VeryLow),
            "low" => Some(GainLevel::Low),
            "medium" => Some(GainLevel::Medium),
            "high" => Some(GainLevel::High),
            "veryhigh" => Some(GainLevel::VeryHigh),
            _ => None,
        }
    }

    /// Reduction applied to the background stream, in dB.
    pub fn reduction_db(self) -> f64 {
        match self {
            GainLevel::VeryLow => 20.0,
            GainLevel::Low => 16.0,
            GainLevel::Medium => 12.0,
            GainLevel::High => 6.0,
            GainLevel::VeryHigh => 0.0,
        }
    }

    /// Linear gain factor, `10^(-dB/20)`.
    pub fn gain_factor(self) -> f64 {
        10f64.powf(-self.reduction_db() / 20.0)
    }
}

/// Sequence-level options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceOptions {
    /// Background audio file, as written in the sequence.
    pub background: Option<PathBuf>,
    /// Background gain reduction.
    pub gain_level: GainLevel,
    /// Global volume, 0-100.
    pub volume: u8,
    /// Output sample rate requested by the sequence.
    pub sample_rate: Option<u32>,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            background: None,
            gain_level: GainLevel::default(),
            volume: 100,
            sample_rate: None,
        }
    }
}
