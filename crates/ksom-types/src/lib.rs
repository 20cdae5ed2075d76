// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Shared Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! K-SOM server monitor (Kuramoto-coupled self-organizing-map
//! process monitoring).

pub mod config;
pub mod error;
pub mod report;
pub mod sample;
pub mod stats;

pub use config::MonitorConfig;
pub use error::{KsomError, KsomResult};
pub use report::{clamp_unit, AnomalyEvent, CycleReport};
pub use sample::{MetricsSnapshot, Pid, ProcessSample};
