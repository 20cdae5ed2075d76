// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Scalar Statistics
// ─────────────────────────────────────────────────────────────────────
//! Rolling-window statistics shared by the oscillator dynamics and the
//! feature extractor.

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; 0.0 for fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
