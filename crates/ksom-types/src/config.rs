// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{KsomError, KsomResult};

/// Runtime configuration for the K-SOM monitor.
///
/// All parameters are fixed at construction time; there is no dynamic
/// reconfiguration between cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// SOM grid width in cells. Default: 8.
    pub grid_width: usize,

    /// SOM grid height in cells. Default: 8.
    pub grid_height: usize,

    /// Kuramoto coupling strength K for the grid cells.
    /// Default: 0.1.
    pub coupling_strength: f64,

    /// Timestep for the grid coupling step (seconds).
    /// Default: 0.1.
    pub grid_dt: f64,

    /// Coherence drop below baseline that triggers a desync event.
    /// Default: 0.3.
    pub anomaly_threshold: f64,

    /// Per-oscillator cpu/mem history capacity (samples).
    /// Default: 50.
    pub usage_history_len: usize,

    /// Global coherence history capacity (cycles).
    /// Default: 100.
    pub coherence_history_len: usize,

    /// CPU spike margin in percentage points: recent average must exceed
    /// baseline average by more than this to emit a spike event.
    /// Default: 50.0.
    pub spike_margin: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            grid_width: 8,
            grid_height: 8,
            coupling_strength: 0.1,
            grid_dt: 0.1,
            anomaly_threshold: 0.3,
            usage_history_len: 50,
            coherence_history_len: 100,
            spike_margin: 50.0,
        }
    }
}

impl MonitorConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> KsomResult<()> {
        if self.grid_width < 1 || self.grid_height < 1 {
            return Err(KsomError::Config(format!(
                "grid dimensions must be >= 1, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.coupling_strength < 0.0 || !self.coupling_strength.is_finite() {
            return Err(KsomError::Config(format!(
                "coupling_strength must be finite and >= 0, got {}",
                self.coupling_strength
            )));
        }
        if self.grid_dt <= 0.0 || !self.grid_dt.is_finite() {
            return Err(KsomError::Config(format!(
                "grid_dt must be finite and > 0, got {}",
                self.grid_dt
            )));
        }
        if !(self.anomaly_threshold > 0.0 && self.anomaly_threshold <= 1.0) {
            return Err(KsomError::Config(format!(
                "anomaly_threshold must be in (0, 1], got {}",
                self.anomaly_threshold
            )));
        }
        if self.usage_history_len < 10 {
            return Err(KsomError::Config(format!(
                "usage_history_len must be >= 10, got {}",
                self.usage_history_len
            )));
        }
        if self.coherence_history_len < 10 {
            return Err(KsomError::Config(format!(
                "coherence_history_len must be >= 10, got {}",
                self.coherence_history_len
            )));
        }
        if self.spike_margin <= 0.0 || !self.spike_margin.is_finite() {
            return Err(KsomError::Config(format!(
                "spike_margin must be finite and > 0, got {}",
                self.spike_margin
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> KsomResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KsomError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
