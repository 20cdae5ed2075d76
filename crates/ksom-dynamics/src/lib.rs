// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Phase Dynamics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Dynamical state of the K-SOM monitor: per-process Kuramoto phase
//! oscillators, the coupled SOM grid, and the global coherence monitor.
//!
//! # Invariants
//!
//! 1. **Phase bound**: every oscillator and grid-cell phase is in
//!    [0, 2π) after every update (`rem_euclid(TAU)` at each write).
//!
//! 2. **Snapshot-then-commit**: the grid coupling step computes all new
//!    phases from the pre-step phases into a scratch buffer before any
//!    cell is committed. A cell never sees a neighbor's already-updated
//!    phase within the same step.
//!
//! 3. **Exclusive ownership**: the registry owns every oscillator, the
//!    grid owns every cell. Nothing else mutates either, and the grid
//!    dynamics never feed back into oscillator phases.

pub mod coherence;
pub mod oscillator;
pub mod rng;
pub mod som;

pub use coherence::{CoherenceMonitor, CoherenceSummary};
pub use oscillator::{OscillatorRegistry, ProcessOscillator};
pub use rng::SimpleRng;
pub use som::{GridCell, SomGrid};
