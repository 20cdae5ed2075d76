// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Process Oscillators
// ─────────────────────────────────────────────────────────────────────
//! Each live OS process is modelled as a Kuramoto phase oscillator whose
//! natural frequency tracks its resource usage and usage variability.
//! Busy or erratic processes oscillate fast; quiet ones drift slowly.

use std::collections::{BTreeMap, VecDeque};
use std::f64::consts::TAU;

use ksom_types::sample::{MetricsSnapshot, Pid};
use ksom_types::stats::variance;

use crate::rng::SimpleRng;

/// Frequency model: base + usage + variability, clamped to [0.1, 5.0].
const FREQ_BASE: f64 = 0.3;
const FREQ_MIN: f64 = 0.1;
const FREQ_MAX: f64 = 5.0;

/// Phase noise: load * 0.8 + N(0, 0.1).
const NOISE_LOAD_GAIN: f64 = 0.8;
const NOISE_SD: f64 = 0.1;

/// Dynamics recomputation uses the last <= 10 samples, and needs >= 3.
const DYNAMICS_WINDOW: usize = 10;
const MIN_DYNAMICS_SAMPLES: usize = 3;

/// One process as a phase oscillator.
#[derive(Debug, Clone)]
pub struct ProcessOscillator {
    pub pid: Pid,
    pub name: String,
    /// Phase in [0, 2π).
    pub phase: f64,
    /// Natural frequency (rad/s), clamped to [0.1, 5.0].
    pub natural_freq: f64,
    /// CPU usage history, bounded FIFO (oldest evicted).
    pub cpu_history: VecDeque<f64>,
    /// Memory usage history, bounded FIFO (oldest evicted).
    pub mem_history: VecDeque<f64>,
    /// Timestamp of the last registry update that touched this oscillator.
    pub last_update: f64,
}

impl ProcessOscillator {
    fn new(pid: Pid, name: String, phase: f64, now: f64, capacity: usize) -> Self {
        Self {
            pid,
            name,
            phase,
            natural_freq: 1.0,
            cpu_history: VecDeque::with_capacity(capacity),
            mem_history: VecDeque::with_capacity(capacity),
            last_update: now,
        }
    }

    fn push_bounded(history: &mut VecDeque<f64>, value: f64, capacity: usize) {
        history.push_back(value);
        while history.len() > capacity {
            history.pop_front();
        }
    }

    /// Last `n` CPU samples, oldest-first.
    pub fn cpu_window(&self, n: usize) -> Vec<f64> {
        let skip = self.cpu_history.len().saturating_sub(n);
        self.cpu_history.iter().skip(skip).copied().collect()
    }

    /// Last `n` memory samples, oldest-first.
    pub fn mem_window(&self, n: usize) -> Vec<f64> {
        let skip = self.mem_history.len().saturating_sub(n);
        self.mem_history.iter().skip(skip).copied().collect()
    }
}

/// Exclusive owner of all process oscillators.
///
/// Consumes one metrics snapshot per cycle: absent pids are destroyed,
/// unknown pids are created with a random initial phase, and every
/// present pid has its histories and phase dynamics advanced.
pub struct OscillatorRegistry {
    // BTreeMap so update order (and thus RNG consumption) is
    // deterministic under a fixed seed
    oscillators: BTreeMap<Pid, ProcessOscillator>,
    history_capacity: usize,
    rng: SimpleRng,
}

impl OscillatorRegistry {
    pub fn new(history_capacity: usize, rng: SimpleRng) -> Self {
        Self {
            oscillators: BTreeMap::new(),
            history_capacity,
            rng,
        }
    }

    /// Consume one metrics snapshot.
    ///
    /// Removal is keyed on snapshot membership alone: a pid reporting
    /// zero usage but still present is kept. Entries failing the input
    /// contract (NaN/Inf/negative usage) are dropped for this cycle
    /// without destroying an already-tracked oscillator.
    pub fn update(&mut self, snapshot: &MetricsSnapshot, now: f64) {
        self.oscillators.retain(|pid, _| snapshot.contains_key(pid));

        // Sorted pid order keeps RNG consumption deterministic under a
        // fixed seed
        let mut pids: Vec<Pid> = snapshot.keys().copied().collect();
        pids.sort_unstable();

        for pid in pids {
            let sample = &snapshot[&pid];
            if !sample.is_valid() {
                log::warn!(
                    "dropping malformed sample for pid {pid} ({}): cpu={} mem={}",
                    sample.name,
                    sample.cpu_percent,
                    sample.memory_percent
                );
                continue;
            }

            let capacity = self.history_capacity;
            let oscillator = self.oscillators.entry(pid).or_insert_with(|| {
                ProcessOscillator::new(
                    pid,
                    sample.name.clone(),
                    self.rng.next_uniform(0.0, TAU),
                    now,
                    capacity,
                )
            });

            ProcessOscillator::push_bounded(
                &mut oscillator.cpu_history,
                sample.cpu_percent,
                capacity,
            );
            ProcessOscillator::push_bounded(
                &mut oscillator.mem_history,
                sample.memory_percent,
                capacity,
            );

            if oscillator.cpu_history.len() >= MIN_DYNAMICS_SAMPLES {
                let cpu_w = oscillator.cpu_window(DYNAMICS_WINDOW);
                let mem_w = oscillator.mem_window(DYNAMICS_WINDOW);

                // Higher usage OR higher variability = higher frequency
                let usage_factor = (sample.cpu_percent + sample.memory_percent) / 100.0;
                let variability_factor = (variance(&cpu_w) + variance(&mem_w)) / 50.0;
                oscillator.natural_freq =
                    (FREQ_BASE + usage_factor + variability_factor).clamp(FREQ_MIN, FREQ_MAX);

                let dt = now - oscillator.last_update;
                let phase_noise =
                    usage_factor * NOISE_LOAD_GAIN + NOISE_SD * self.rng.next_normal();
                oscillator.phase = (oscillator.phase + oscillator.natural_freq * dt
                    + phase_noise)
                    .rem_euclid(TAU);
            }

            oscillator.last_update = now;
        }
    }

    pub fn len(&self) -> usize {
        self.oscillators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oscillators.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.oscillators.contains_key(&pid)
    }

    pub fn get(&self, pid: Pid) -> Option<&ProcessOscillator> {
        self.oscillators.get(&pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pid, &ProcessOscillator)> {
        self.oscillators.iter().map(|(&pid, osc)| (pid, osc))
    }

    /// Current phases of all live oscillators, in pid order.
    pub fn phases(&self) -> Vec<f64> {
        self.oscillators.values().map(|o| o.phase).collect()
    }
}

#[cfg(test)]
mod tests {
    use ksom_types::sample::ProcessSample;

    use super::*;

    fn snapshot_of(entries: &[(Pid, &str, f64, f64)], now: f64) -> MetricsSnapshot {
        entries
            .iter()
            .map(|&(pid, name, cpu, mem)| (pid, ProcessSample::new(name, cpu, mem, now)))
            .collect()
    }

    fn registry() -> OscillatorRegistry {
        OscillatorRegistry::new(50, SimpleRng::new(42))
    }

    #[test]
    fn test_creation_random_phase_in_range() {
        let mut reg = registry();
        let snap = snapshot_of(&[(1, "a", 5.0, 1.0), (2, "b", 0.0, 0.0)], 0.0);
        reg.update(&snap, 0.0);
        assert_eq!(reg.len(), 2);
        for (_, osc) in reg.iter() {
            assert!((0.0..TAU).contains(&osc.phase));
        }
    }

    #[test]
    fn test_removal_on_absence() {
        let mut reg = registry();
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0), (2, "b", 3.0, 1.0)], 0.0), 0.0);
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], 1.0), 1.0);
        assert!(reg.contains(1));
        assert!(!reg.contains(2));
    }

    #[test]
    fn test_zero_usage_not_destroyed() {
        let mut reg = registry();
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], 0.0), 0.0);
        reg.update(&snapshot_of(&[(1, "a", 0.0, 0.0)], 1.0), 1.0);
        assert!(reg.contains(1));
        assert_eq!(reg.get(1).unwrap().cpu_history.len(), 2);
    }

    #[test]
    fn test_history_bound_after_1000_samples() {
        let mut reg = registry();
        for i in 0..1000 {
            let now = i as f64;
            reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], now), now);
        }
        let osc = reg.get(1).unwrap();
        assert_eq!(osc.cpu_history.len(), 50);
        assert_eq!(osc.mem_history.len(), 50);
    }

    #[test]
    fn test_phase_invariant_over_many_cycles() {
        let mut reg = registry();
        for i in 0..200 {
            let now = i as f64 * 3.0;
            let cpu = (i % 17) as f64 * 6.0;
            reg.update(&snapshot_of(&[(1, "a", cpu, 2.0)], now), now);
            let phase = reg.get(1).unwrap().phase;
            assert!((0.0..TAU).contains(&phase), "phase {phase} out of range");
        }
    }

    #[test]
    fn test_last_update_set_with_short_history() {
        let mut reg = registry();
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], 7.5), 7.5);
        // Only one sample: dynamics skipped, last_update still set
        let osc = reg.get(1).unwrap();
        assert_eq!(osc.cpu_history.len(), 1);
        assert!((osc.last_update - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_phase_unchanged_with_short_history() {
        let mut reg = registry();
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], 0.0), 0.0);
        let phase_after_create = reg.get(1).unwrap().phase;
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], 1.0), 1.0);
        // Two samples < MIN_DYNAMICS_SAMPLES, phase must not advance
        assert_eq!(reg.get(1).unwrap().phase, phase_after_create);
    }

    #[test]
    fn test_natural_freq_clamped_high() {
        let mut reg = registry();
        for i in 0..5 {
            let now = i as f64;
            // Wild swings: huge usage and huge variance
            let cpu = if i % 2 == 0 { 400.0 } else { 0.0 };
            reg.update(&snapshot_of(&[(1, "a", cpu, 100.0)], now), now);
        }
        let osc = reg.get(1).unwrap();
        assert!(osc.natural_freq <= FREQ_MAX);
        assert!(osc.natural_freq >= FREQ_MIN);
    }

    #[test]
    fn test_malformed_sample_dropped_not_destroyed() {
        let mut reg = registry();
        reg.update(&snapshot_of(&[(1, "a", 5.0, 1.0)], 0.0), 0.0);
        let mut snap = MetricsSnapshot::new();
        snap.insert(1, ProcessSample::new("a", f64::NAN, 1.0, 1.0));
        reg.update(&snap, 1.0);
        // Still tracked, but nothing was pushed this cycle
        assert!(reg.contains(1));
        assert_eq!(reg.get(1).unwrap().cpu_history.len(), 1);
    }

    #[test]
    fn test_malformed_sample_never_creates() {
        let mut reg = registry();
        let mut snap = MetricsSnapshot::new();
        snap.insert(9, ProcessSample::new("bad", -1.0, 1.0, 0.0));
        reg.update(&snap, 0.0);
        assert!(!reg.contains(9));
    }

    #[test]
    fn test_seeded_registry_deterministic() {
        let run = || {
            let mut reg = OscillatorRegistry::new(50, SimpleRng::new(1234));
            for i in 0..20 {
                let now = i as f64;
                reg.update(&snapshot_of(&[(1, "a", 30.0, 10.0), (2, "b", 1.0, 0.5)], now), now);
            }
            (reg.get(1).unwrap().phase, reg.get(2).unwrap().phase)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_window_oldest_first() {
        let mut reg = registry();
        for i in 0..12 {
            let now = i as f64;
            reg.update(&snapshot_of(&[(1, "a", i as f64, 0.0)], now), now);
        }
        let window = reg.get(1).unwrap().cpu_window(10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0], 2.0);
        assert_eq!(window[9], 11.0);
    }
}
