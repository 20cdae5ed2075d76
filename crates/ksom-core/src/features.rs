// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Feature Extraction
// ─────────────────────────────────────────────────────────────────────
//! Derives a 3-component descriptor per oscillator from its usage
//! history: mean usage, variability, and a phase-locking value over the
//! recent load signal. Pure and deterministic given the history.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use ksom_dynamics::ProcessOscillator;
use ksom_types::clamp_unit;
use ksom_types::stats::{mean, variance};

/// Neutral value used when history is too short to say anything.
const NEUTRAL: f64 = 0.5;

/// Minimum samples for any non-default feature.
const MIN_SAMPLES: usize = 5;

/// Samples required (and used) for the PLV component.
const PLV_WINDOW: usize = 10;

/// Per-oscillator SOM input descriptor; every component is in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Normalized mean resource usage.
    pub mean_usage: f64,
    /// Normalized resource variability.
    pub variability: f64,
    /// Phase-locking value of the recent load signal.
    pub plv: f64,
}

impl FeatureVector {
    pub fn neutral() -> Self {
        Self {
            mean_usage: NEUTRAL,
            variability: NEUTRAL,
            plv: NEUTRAL,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.mean_usage, self.variability, self.plv]
    }
}

/// Compute the feature vector for one oscillator.
pub fn extract(oscillator: &ProcessOscillator) -> FeatureVector {
    if oscillator.cpu_history.len() < MIN_SAMPLES {
        return FeatureVector::neutral();
    }

    let cpu: Vec<f64> = oscillator.cpu_history.iter().copied().collect();
    let mem: Vec<f64> = oscillator.mem_history.iter().copied().collect();

    let mean_usage = clamp_unit((mean(&cpu) + mean(&mem)) / 200.0);
    let variability = clamp_unit((variance(&cpu) / 100.0 + variance(&mem) / 100.0) / 2.0);

    let plv = if oscillator.cpu_history.len() >= PLV_WINDOW {
        plv_over_window(
            &oscillator.cpu_window(PLV_WINDOW),
            &oscillator.mem_window(PLV_WINDOW),
        )
    } else {
        NEUTRAL
    };

    FeatureVector {
        mean_usage,
        variability,
        plv,
    }
}

/// Phase-locking value: map each load sample to an angle on the unit
/// circle, average the unit vectors, take the magnitude. 1.0 means the
/// load keeps hitting the same phase; near 0 means it is spread out.
fn plv_over_window(cpu: &[f64], mem: &[f64]) -> f64 {
    let n = cpu.len().min(mem.len());
    if n == 0 {
        return NEUTRAL;
    }
    let (sum_sin, sum_cos) = cpu
        .iter()
        .zip(mem.iter())
        .map(|(&c, &m)| ((c + m) / 200.0 * TAU).rem_euclid(TAU))
        .fold((0.0, 0.0), |(s, co), angle| (s + angle.sin(), co + angle.cos()));
    let nf = n as f64;
    clamp_unit(((sum_sin / nf).powi(2) + (sum_cos / nf).powi(2)).sqrt())
}
