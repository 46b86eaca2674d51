//! Signal measurements on normalized samples.

/// Root mean square level. 0.0 for empty input.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Largest absolute sample.
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// True when no sample exceeds `threshold` in magnitude.
pub fn is_silent(samples: &[f32], threshold: f32) -> bool {
    samples.iter().all(|s| s.abs() <= threshold)
}

/// Number of sign changes, counting only strict crossings.
pub fn zero_crossings(samples: &[f32]) -> usize {
    let mut last = 0.0f32;
    let mut count = 0;
    for &s in samples {
        if s == 0.0 {
            continue;
        }
        if last != 0.0 && (s > 0.0) != (last > 0.0) {
            count += 1;
        }
        last = s;
    }
    count
}

/// Frequency of a single tone in one channel, from its zero crossings.
pub fn estimate_frequency(samples: &[f32], sample_rate: u32) -> f64 {
    if samples.is_empty() || sample_rate == 0 {
        return 0.0;
    }
    let seconds = samples.len() as f64 / f64::from(sample_rate);
    zero_crossings(samples) as f64 / 2.0 / seconds
}

/// Largest change between consecutive samples; a click shows up as a spike.
pub fn largest_step(samples: &[f32]) -> f32 {
    samples
        .windows(2)
        .fold(0.0f32, |max, w| max.max((w[1] - w[0]).abs()))
}
