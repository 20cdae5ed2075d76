// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Cycle Orchestrator
// ─────────────────────────────────────────────────────────────────────
//! Sequences one monitoring cycle: registry update, feature/BMU
//! mapping, grid coupling step, coherence computation, anomaly
//! detection, and report assembly. Owns every piece of mutable state;
//! callers hold only the returned reports.

use std::collections::{HashMap, HashSet};

use ksom_dynamics::{CoherenceMonitor, CoherenceSummary, OscillatorRegistry, SimpleRng, SomGrid};
use ksom_types::sample::{MetricsSnapshot, Pid};
use ksom_types::{CycleReport, KsomResult, MonitorConfig};

use crate::anomaly::AnomalyDetector;
use crate::features;
use crate::metrics::MetricsSource;

/// The K-SOM monitor. One instance, one strictly sequential cycle at a
/// time; no external caller mutates its state between cycles.
pub struct KsomMonitor {
    config: MonitorConfig,
    registry: OscillatorRegistry,
    grid: SomGrid,
    coherence: CoherenceMonitor,
    detector: AnomalyDetector,
    /// pid → BMU cell, fully rebuilt every cycle.
    positions: HashMap<Pid, (usize, usize)>,
}

impl KsomMonitor {
    /// Entropy-seeded monitor.
    pub fn new(config: MonitorConfig) -> KsomResult<Self> {
        Self::build(config, SimpleRng::from_entropy())
    }

    /// Deterministic monitor for reproducible runs and tests.
    pub fn with_seed(config: MonitorConfig, seed: u64) -> KsomResult<Self> {
        Self::build(config, SimpleRng::new(seed))
    }

    fn build(config: MonitorConfig, mut rng: SimpleRng) -> KsomResult<Self> {
        config.validate()?;
        let grid = SomGrid::new(
            config.grid_width,
            config.grid_height,
            config.coupling_strength,
            &mut rng,
        )?;
        let registry = OscillatorRegistry::new(config.usage_history_len, rng);
        let coherence = CoherenceMonitor::new(config.coherence_history_len);
        let detector = AnomalyDetector::new(config.anomaly_threshold, config.spike_margin);
        Ok(Self {
            config,
            registry,
            grid,
            coherence,
            detector,
            positions: HashMap::new(),
        })
    }

    /// Run one complete monitoring cycle against a metrics snapshot.
    pub fn run_cycle(&mut self, snapshot: &MetricsSnapshot, now: f64) -> CycleReport {
        self.registry.update(snapshot, now);

        // Full BMU-map rebuild: stale pids are purged here, the same
        // cycle their oscillator is destroyed.
        self.positions.clear();
        for (pid, oscillator) in self.registry.iter() {
            let feature_vector = features::extract(oscillator);
            let bmu = self.grid.find_bmu(&feature_vector.as_array());
            self.positions.insert(pid, bmu);
        }

        self.grid.apply_coupling_step(self.config.grid_dt);

        let coherence = self.coherence.compute(&self.registry.phases());
        let anomalies = self.detector.detect(self.coherence.history(), &self.registry);

        let clusters: HashSet<(usize, usize)> = self.positions.values().copied().collect();
        let total_cpu: f64 = snapshot
            .values()
            .filter(|s| s.is_valid())
            .map(|s| s.cpu_percent)
            .sum();
        let active_processes = snapshot
            .values()
            .filter(|s| s.is_valid() && s.cpu_percent > 0.0)
            .count();

        log::debug!(
            "cycle t={now:.1}: {} oscillators, coherence {coherence:.3}, {} clusters, {} anomalies",
            self.registry.len(),
            clusters.len(),
            anomalies.len()
        );

        CycleReport {
            timestamp: now,
            coherence,
            anomalies,
            active_threads: self.registry.len(),
            clusters: clusters.len(),
            total_cpu,
            active_processes,
        }
    }

    /// Sample a metrics source and run one cycle.
    pub fn poll(&mut self, source: &mut dyn MetricsSource, now: f64) -> CycleReport {
        let snapshot = source.sample();
        self.run_cycle(&snapshot, now)
    }

    /// Current BMU assignment, pid → (x, y).
    pub fn positions(&self) -> &HashMap<Pid, (usize, usize)> {
        &self.positions
    }

    /// Session coherence statistics; `None` before the first cycle with
    /// live oscillators.
    pub fn coherence_summary(&self) -> Option<CoherenceSummary> {
        self.coherence.summary()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use ksom_types::sample::ProcessSample;
    use ksom_types::AnomalyEvent;

    use crate::metrics::ScriptedSource;

    use super::*;

    fn snapshot_of(entries: &[(Pid, &str, f64, f64)], now: f64) -> MetricsSnapshot {
        entries
            .iter()
            .map(|&(pid, name, cpu, mem)| (pid, ProcessSample::new(name, cpu, mem, now)))
            .collect()
    }

    fn monitor() -> KsomMonitor {
        KsomMonitor::with_seed(MonitorConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MonitorConfig::default();
        config.grid_width = 0;
        assert!(KsomMonitor::new(config).is_err());
    }

    #[test]
    fn test_first_cycle_report() {
        let mut mon = monitor();
        let snap = snapshot_of(&[(1, "a", 10.0, 2.0), (2, "b", 0.0, 1.0)], 0.0);
        let report = mon.run_cycle(&snap, 0.0);
        assert_eq!(report.active_threads, 2);
        assert_eq!(report.active_processes, 1); // only pid 1 has cpu > 0
        assert!((report.total_cpu - 10.0).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&report.coherence));
        assert!(report.clusters >= 1);
        assert!(report.clusters <= 2);
    }

    #[test]
    fn test_positions_purged_with_oscillator() {
        let mut mon = monitor();
        mon.run_cycle(&snapshot_of(&[(1, "a", 5.0, 1.0), (2, "b", 5.0, 1.0)], 0.0), 0.0);
        assert!(mon.positions().contains_key(&2));
        mon.run_cycle(&snapshot_of(&[(1, "a", 5.0, 1.0)], 3.0), 3.0);
        assert!(!mon.positions().contains_key(&2));
        assert!(mon.positions().contains_key(&1));
    }

    #[test]
    fn test_empty_snapshot_zero_coherence() {
        let mut mon = monitor();
        let report = mon.run_cycle(&MetricsSnapshot::new(), 0.0);
        assert_eq!(report.coherence, 0.0);
        assert_eq!(report.active_threads, 0);
        assert_eq!(report.clusters, 0);
        assert!(mon.coherence_summary().is_none());
    }

    #[test]
    fn test_clusters_bounded_by_threads() {
        let mut mon = monitor();
        let entries: Vec<(Pid, &str, f64, f64)> =
            (1..=20).map(|pid| (pid, "p", pid as f64, 1.0)).collect();
        for cycle in 0..8 {
            let now = cycle as f64 * 3.0;
            let report = mon.run_cycle(&snapshot_of(&entries, now), now);
            assert!(report.clusters <= report.active_threads);
            assert!(report.clusters >= 1);
        }
    }

    #[test]
    fn test_seeded_monitors_agree() {
        let run = || {
            let mut mon = monitor();
            let mut last = 0.0;
            for cycle in 0..15 {
                let now = cycle as f64 * 3.0;
                let snap = snapshot_of(&[(1, "a", 30.0, 5.0), (2, "b", 2.0, 1.0)], now);
                last = mon.run_cycle(&snap, now).coherence;
            }
            last
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_poll_scripted_source() {
        let mut mon = monitor();
        let frames = vec![
            snapshot_of(&[(1, "a", 5.0, 1.0), (2, "b", 5.0, 1.0)], 0.0),
            snapshot_of(&[(1, "a", 5.0, 1.0)], 3.0),
        ];
        let mut source = ScriptedSource::new(frames);
        let first = mon.poll(&mut source, 0.0);
        assert_eq!(first.active_threads, 2);
        let second = mon.poll(&mut source, 3.0);
        assert_eq!(second.active_threads, 1);
        // Script exhausted, last frame repeats
        let third = mon.poll(&mut source, 6.0);
        assert_eq!(third.active_threads, 1);
    }

    #[test]
    fn test_spike_detected_through_full_cycle() {
        let mut mon = monitor();
        let script: Vec<f64> = vec![5.0, 5.0, 5.0, 5.0, 5.0, 60.0, 61.0, 59.0, 60.0, 62.0];
        let mut last = None;
        for (i, &cpu) in script.iter().enumerate() {
            let now = i as f64 * 3.0;
            last = Some(mon.run_cycle(&snapshot_of(&[(9, "hog", cpu, 1.0)], now), now));
        }
        let report = last.unwrap();
        assert_eq!(report.anomalies.len(), 1);
        match &report.anomalies[0] {
            AnomalyEvent::ResourceSpike { pid, severity, .. } => {
                assert_eq!(*pid, 9);
                assert!((severity - 55.4).abs() < 1e-9);
            }
            other => panic!("expected ResourceSpike, got {other:?}"),
        }
    }

    #[test]
    fn test_report_serializes() {
        let mut mon = monitor();
        let report = mon.run_cycle(&snapshot_of(&[(1, "a", 10.0, 2.0)], 0.0), 0.0);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""coherence""#));
        assert!(json.contains(r#""clusters""#));
    }

    #[test]
    fn test_single_oscillator_coherence_one() {
        let mut mon = monitor();
        let report = mon.run_cycle(&snapshot_of(&[(1, "solo", 10.0, 2.0)], 0.0), 0.0);
        assert!((report.coherence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_coherence_summary_after_cycles() {
        let mut mon = monitor();
        for cycle in 0..5 {
            let now = cycle as f64 * 3.0;
            mon.run_cycle(&snapshot_of(&[(1, "a", 10.0, 2.0)], now), now);
        }
        let summary = mon.coherence_summary().unwrap();
        assert!(summary.min <= summary.avg && summary.avg <= summary.max);
    }

    #[test]
    fn test_degenerate_one_by_one_grid() {
        let mut config = MonitorConfig::default();
        config.grid_width = 1;
        config.grid_height = 1;
        let mut mon = KsomMonitor::with_seed(config, 7).unwrap();
        for cycle in 0..12 {
            let now = cycle as f64 * 3.0;
            let report = mon.run_cycle(&snapshot_of(&[(1, "a", 10.0, 2.0)], now), now);
            assert_eq!(report.clusters, 1);
        }
    }
}
