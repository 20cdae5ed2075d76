// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Global Coherence Monitor
// ─────────────────────────────────────────────────────────────────────
//! Kuramoto order parameter over the live process oscillators, with a
//! bounded history of per-cycle values. Grid cells are excluded: this
//! measures the processes, not the lattice.

use serde::{Deserialize, Serialize};

use ksom_types::clamp_unit;

/// Aggregate statistics over the retained coherence history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Bounded history of global coherence values, appended once per cycle.
pub struct CoherenceMonitor {
    history: Vec<f64>,
    capacity: usize,
}

impl CoherenceMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Order parameter |mean e^{iθ}| over the given phases.
    ///
    /// Empty input returns 0.0 without touching the history. A single
    /// phase always yields exactly 1.0 (magnitude of one unit vector).
    pub fn compute(&mut self, phases: &[f64]) -> f64 {
        if phases.is_empty() {
            return 0.0;
        }
        let n = phases.len() as f64;
        let (sum_sin, sum_cos) = phases
            .iter()
            .fold((0.0, 0.0), |(s, c), &th| (s + th.sin(), c + th.cos()));
        let coherence = clamp_unit(((sum_sin / n).powi(2) + (sum_cos / n).powi(2)).sqrt());

        self.history.push(coherence);
        if self.history.len() > self.capacity {
            let start = self.history.len() - self.capacity;
            self.history.drain(..start);
        }
        coherence
    }

    /// Retained coherence values, oldest-first.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn latest(&self) -> Option<f64> {
        self.history.last().copied()
    }

    /// Session statistics over the retained history; `None` when empty.
    pub fn summary(&self) -> Option<CoherenceSummary> {
        if self.history.is_empty() {
            return None;
        }
        let sum: f64 = self.history.iter().sum();
        let min = self.history.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(CoherenceSummary {
            avg: sum / self.history.len() as f64,
            min,
            max,
        })
    }
}
