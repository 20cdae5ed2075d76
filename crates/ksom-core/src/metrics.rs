// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Metrics Source Boundary
// ─────────────────────────────────────────────────────────────────────
//! Seam between the monitor core and the OS-level metrics collector.
//!
//! The collector itself (process iteration, cpu_percent priming and the
//! sampling interval) lives outside this workspace; embedding
//! applications supply one behind this trait. The scripted source
//! replays fixed snapshots for tests and demos.

use ksom_types::sample::MetricsSnapshot;

/// Per-cycle metrics provider.
pub trait MetricsSource {
    /// Produce the snapshot for the current cycle.
    fn sample(&mut self) -> MetricsSnapshot;
}

/// Replays a fixed sequence of snapshots, repeating the last one when
/// the script runs out. An empty script yields empty snapshots.
pub struct ScriptedSource {
    frames: Vec<MetricsSnapshot>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(frames: Vec<MetricsSnapshot>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }
}

impl MetricsSource for ScriptedSource {
    fn sample(&mut self) -> MetricsSnapshot {
        if self.frames.is_empty() {
            return MetricsSnapshot::new();
        }
        let index = self.cursor.min(self.frames.len() - 1);
        if self.cursor < self.frames.len() {
            self.cursor += 1;
        }
        self.frames[index].clone()
    }
}

/// Wraps a closure supplied by the embedding application, the hook for
/// a real OS collector.
type SampleFn = Box<dyn FnMut() -> MetricsSnapshot + Send>;

pub struct ExternalSource {
    sample_fn: SampleFn,
}

impl ExternalSource {
    pub fn new(sample_fn: impl FnMut() -> MetricsSnapshot + Send + 'static) -> Self {
        Self {
            sample_fn: Box::new(sample_fn),
        }
    }
}

impl MetricsSource for ExternalSource {
    fn sample(&mut self) -> MetricsSnapshot {
        (self.sample_fn)()
    }
}

#[cfg(test)]
mod tests {
    use ksom_types::sample::ProcessSample;

    use super::*;

    fn frame(pid: u32, cpu: f64) -> MetricsSnapshot {
        let mut snap = MetricsSnapshot::new();
        snap.insert(pid, ProcessSample::new("p", cpu, 1.0, 0.0));
        snap
    }

    #[test]
    fn test_scripted_replays_in_order() {
        let mut source = ScriptedSource::new(vec![frame(1, 10.0), frame(1, 20.0)]);
        assert_eq!(source.sample()[&1].cpu_percent, 10.0);
        assert_eq!(source.sample()[&1].cpu_percent, 20.0);
    }

    #[test]
    fn test_scripted_repeats_last_frame() {
        let mut source = ScriptedSource::new(vec![frame(1, 10.0)]);
        source.sample();
        assert_eq!(source.sample()[&1].cpu_percent, 10.0);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_scripted_empty_yields_empty() {
        let mut source = ScriptedSource::new(Vec::new());
        assert!(source.sample().is_empty());
    }

    #[test]
    fn test_external_source_delegates() {
        let mut calls = 0u32;
        let mut source = ExternalSource::new(move || {
            calls += 1;
            frame(calls, calls as f64)
        });
        assert!(source.sample().contains_key(&1));
        assert!(source.sample().contains_key(&2));
    }
}
