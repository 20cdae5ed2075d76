// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Anomaly Events & Cycle Report
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::sample::Pid;

/// Clamp a value to [0, 1], mapping NaN to 0 and Inf to the nearest bound.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_unit: NaN detected, clamping to 0.0");
        return 0.0;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { 1.0 } else { 0.0 };
        log::warn!("clamp_unit: Inf detected, clamping to {boundary:.1}");
        return boundary;
    }
    value.clamp(0.0, 1.0)
}

/// A detected anomaly, immutable once constructed.
///
/// Events are consumed by the caller; the core retains nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyEvent {
    /// Global phase coherence dropped well below its recent baseline.
    #[serde(rename = "global_desynchronization")]
    GlobalDesync {
        /// Magnitude of the drop: baseline - current.
        severity: f64,
        /// Latest coherence value.
        current: f64,
        /// Mean of the nine coherence values preceding the latest.
        baseline: f64,
    },

    /// A single process's recent CPU average spiked above its baseline.
    ResourceSpike {
        pid: Pid,
        name: String,
        /// Magnitude of the spike: recent_avg - baseline_avg.
        severity: f64,
        /// Mean of the last 5 CPU samples.
        recent_avg: f64,
        /// Mean of the 5 CPU samples before those.
        baseline_avg: f64,
    },
}

impl AnomalyEvent {
    pub fn severity(&self) -> f64 {
        match self {
            Self::GlobalDesync { severity, .. } => *severity,
            Self::ResourceSpike { severity, .. } => *severity,
        }
    }

    /// One-line human-readable description.
    pub fn message(&self) -> String {
        match self {
            Self::GlobalDesync {
                current, baseline, ..
            } => format!("Global coherence drop: {current:.3} vs {baseline:.3}"),
            Self::ResourceSpike {
                name,
                recent_avg,
                baseline_avg,
                ..
            } => format!("CPU spike in {name}: {recent_avg:.1}% vs {baseline_avg:.1}%"),
        }
    }
}

/// JSON-serializable summary of one monitoring cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Cycle timestamp (seconds).
    pub timestamp: f64,
    /// Kuramoto order parameter over live oscillators, in [0, 1].
    pub coherence: f64,
    /// Anomalies detected this cycle.
    pub anomalies: Vec<AnomalyEvent>,
    /// Number of live process oscillators.
    pub active_threads: usize,
    /// Distinct BMU cells currently occupied.
    pub clusters: usize,
    /// Sum of cpu_percent over the snapshot.
    pub total_cpu: f64,
    /// Snapshot entries with cpu_percent > 0.
    pub active_processes: usize,
}
