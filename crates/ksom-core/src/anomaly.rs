// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Baseline-Relative Anomaly Detection
// ─────────────────────────────────────────────────────────────────────
//! Two independent checks per cycle, both relative to recent baselines:
//! a drop in global coherence (mass desynchronization) and per-process
//! CPU spikes. Absent data yields no events, never an error.

use ksom_dynamics::OscillatorRegistry;
use ksom_types::stats::mean;
use ksom_types::AnomalyEvent;

/// Coherence values needed before the desync check activates.
const DESYNC_WINDOW: usize = 10;

/// CPU samples needed before the spike check activates; the window is
/// split into a 5-sample baseline followed by a 5-sample recent half.
const SPIKE_WINDOW: usize = 10;
const SPIKE_HALF: usize = 5;

/// Stateless detector; thresholds fixed at construction.
pub struct AnomalyDetector {
    threshold: f64,
    spike_margin: f64,
}

impl AnomalyDetector {
    pub fn new(threshold: f64, spike_margin: f64) -> Self {
        Self {
            threshold,
            spike_margin,
        }
    }

    /// Run both checks against the current cycle's state.
    pub fn detect(
        &self,
        coherence_history: &[f64],
        registry: &OscillatorRegistry,
    ) -> Vec<AnomalyEvent> {
        let mut anomalies = Vec::new();

        if let Some(event) = self.check_global_desync(coherence_history) {
            anomalies.push(event);
        }
        self.check_resource_spikes(registry, &mut anomalies);

        if !anomalies.is_empty() {
            log::warn!("{} anomalies detected this cycle", anomalies.len());
        }
        anomalies
    }

    /// Coherence drop: current value against the mean of the nine
    /// values preceding it.
    fn check_global_desync(&self, history: &[f64]) -> Option<AnomalyEvent> {
        if history.len() < DESYNC_WINDOW {
            return None;
        }
        let window = &history[history.len() - DESYNC_WINDOW..];
        let current = window[DESYNC_WINDOW - 1];
        let baseline = mean(&window[..DESYNC_WINDOW - 1]);

        if current < baseline - self.threshold {
            return Some(AnomalyEvent::GlobalDesync {
                severity: baseline - current,
                current,
                baseline,
            });
        }
        None
    }

    /// CPU spike: recent 5-sample average more than `spike_margin`
    /// percentage points above the preceding 5-sample baseline.
    fn check_resource_spikes(&self, registry: &OscillatorRegistry, out: &mut Vec<AnomalyEvent>) {
        for (pid, oscillator) in registry.iter() {
            if oscillator.cpu_history.len() < SPIKE_WINDOW {
                continue;
            }
            let window = oscillator.cpu_window(SPIKE_WINDOW);
            let baseline_avg = mean(&window[..SPIKE_HALF]);
            let recent_avg = mean(&window[SPIKE_HALF..]);

            if recent_avg > baseline_avg + self.spike_margin {
                out.push(AnomalyEvent::ResourceSpike {
                    pid,
                    name: oscillator.name.clone(),
                    severity: recent_avg - baseline_avg,
                    recent_avg,
                    baseline_avg,
                });
            }
        }
    }
}
