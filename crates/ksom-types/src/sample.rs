// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Metrics Input Contract
// ─────────────────────────────────────────────────────────────────────
//! Input contract with the external metrics collector.
//!
//! Once per cycle the collector supplies a snapshot of every live
//! process. Entries with zero usage are permitted and must still be
//! tracked if previously known; the core never filters them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// OS process identifier, externally assigned, stable for the process
/// lifetime.
pub type Pid = u32;

/// One process entry in a metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSample {
    /// Process name as reported by the collector.
    pub name: String,
    /// CPU usage in percent, >= 0.
    pub cpu_percent: f64,
    /// Memory usage in percent, >= 0.
    pub memory_percent: f64,
    /// Collection timestamp (seconds, collector clock).
    pub timestamp: f64,
}

impl ProcessSample {
    pub fn new(name: impl Into<String>, cpu_percent: f64, memory_percent: f64, timestamp: f64) -> Self {
        Self {
            name: name.into(),
            cpu_percent,
            memory_percent,
            timestamp,
        }
    }

    /// True iff both usage fields are finite and non-negative.
    ///
    /// The collector is contractually responsible for validation; this
    /// check only guards the phase dynamics against NaN propagation.
    pub fn is_valid(&self) -> bool {
        self.cpu_percent.is_finite()
            && self.cpu_percent >= 0.0
            && self.memory_percent.is_finite()
            && self.memory_percent >= 0.0
    }
}

/// Full per-cycle snapshot: pid → sample.
pub type MetricsSnapshot = HashMap<Pid, ProcessSample>;
