// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Derived layer of the K-SOM monitor: per-oscillator feature
//! extraction, baseline-relative anomaly detection, the metrics-source
//! boundary, and the cycle orchestrator.
//!
//! One cycle is strictly sequential: registry update, feature/BMU
//! mapping, grid coupling step, coherence, anomaly detection, report
//! assembly. No component mutates shared state concurrently, and no
//! call in this path can fail; degenerate inputs produce clamped values
//! or simply no events.

pub mod anomaly;
pub mod features;
pub mod metrics;
pub mod monitor;

pub use anomaly::AnomalyDetector;
pub use features::FeatureVector;
pub use metrics::{ExternalSource, MetricsSource, ScriptedSource};
pub use monitor::KsomMonitor;
