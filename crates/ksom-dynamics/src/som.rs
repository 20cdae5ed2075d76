// ─────────────────────────────────────────────────────────────────────
// K-SOM Server Monitor — Kuramoto-Coupled SOM Grid
// ─────────────────────────────────────────────────────────────────────
//! Fixed-size lattice of coupled phase cells. The grid serves two
//! purposes: a best-matching-unit lookup that clusters process feature
//! vectors, and an internal Kuramoto coupling step over each cell's
//! Moore neighborhood.
//!
//! The grid's own dynamics are never fed back into the process
//! oscillators; BMU assignment is descriptive only.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use ksom_types::{KsomError, KsomResult};

use crate::rng::SimpleRng;

/// Reference-vector normalization for BMU distance: frequency / 3.
const FREQ_NORM: f64 = 3.0;

/// Fixed placeholder for the grid's third reference component; the
/// grid carries no PLV state of its own.
const PLV_PLACEHOLDER: f64 = 0.5;

/// One lattice cell. Exists for the lifetime of the grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridCell {
    /// Phase in [0, 2π).
    pub phase: f64,
    /// Intrinsic frequency; constant after construction, only the phase
    /// is mutated by coupling.
    pub frequency: f64,
}

/// W×H lattice of coupled phase cells, row-major storage.
pub struct SomGrid {
    width: usize,
    height: usize,
    coupling_strength: f64,
    cells: Vec<GridCell>,
    // Pre-allocated scratch for the snapshot-then-commit phase update
    scratch: Vec<f64>,
}

impl SomGrid {
    /// Build a grid with random cell phases and uniform frequency 1.0.
    pub fn new(
        width: usize,
        height: usize,
        coupling_strength: f64,
        rng: &mut SimpleRng,
    ) -> KsomResult<Self> {
        if width < 1 || height < 1 {
            return Err(KsomError::Config(format!(
                "grid dimensions must be >= 1, got {width}x{height}"
            )));
        }
        let cells = (0..width * height)
            .map(|_| GridCell {
                phase: rng.next_uniform(0.0, TAU),
                frequency: 1.0,
            })
            .collect();
        Ok(Self {
            width,
            height,
            coupling_strength,
            cells,
            scratch: vec![0.0; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn cell(&self, x: usize, y: usize) -> &GridCell {
        &self.cells[self.idx(x, y)]
    }

    /// Best matching unit for a 3-component feature vector.
    ///
    /// Scans all cells in row-major order against the reference vector
    /// `(phase/2π, frequency/3, 0.5)`; ties keep the first-encountered
    /// cell, so the result is deterministic for an unmodified grid.
    pub fn find_bmu(&self, features: &[f64; 3]) -> (usize, usize) {
        let mut min_distance = f64::INFINITY;
        let mut bmu = (0, 0);

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[self.idx(x, y)];
                let reference = [cell.phase / TAU, cell.frequency / FREQ_NORM, PLV_PLACEHOLDER];
                let distance = features
                    .iter()
                    .zip(reference.iter())
                    .map(|(&f, &r)| (f - r).powi(2))
                    .sum::<f64>()
                    .sqrt();
                if distance < min_distance {
                    min_distance = distance;
                    bmu = (x, y);
                }
            }
        }
        bmu
    }

    /// One synchronous Kuramoto step over all cells.
    ///
    /// All new phases are computed from the pre-step phases into the
    /// scratch buffer before any cell is committed; a cell never sees a
    /// neighbor's already-updated phase within the same step. Edges are
    /// clipped, not wrapped. An isolated cell (1×1 grid) skips the
    /// coupling term and advances by its frequency alone.
    pub fn apply_coupling_step(&mut self, dt: f64) {
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.idx(x, y);
                let current = self.cells[i];

                let mut coupling_sum = 0.0;
                let mut neighbor_count = 0u32;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                            continue;
                        }
                        let neighbor = self.cells[self.idx(nx as usize, ny as usize)];
                        coupling_sum += (neighbor.phase - current.phase).sin();
                        neighbor_count += 1;
                    }
                }

                let coupling = if neighbor_count > 0 {
                    self.coupling_strength * coupling_sum / neighbor_count as f64
                } else {
                    0.0
                };
                let phase_dot = current.frequency + coupling;
                self.scratch[i] = (current.phase + phase_dot * dt).rem_euclid(TAU);
            }
        }

        for (cell, &new_phase) in self.cells.iter_mut().zip(self.scratch.iter()) {
            cell.phase = new_phase;
        }
    }

    /// Kuramoto order parameter over the grid cells themselves.
    pub fn grid_coherence(&self) -> f64 {
        let n = self.cells.len() as f64;
        let (sum_sin, sum_cos) = self
            .cells
            .iter()
            .fold((0.0, 0.0), |(s, c), cell| (s + cell.phase.sin(), c + cell.phase.cos()));
        ((sum_sin / n).powi(2) + (sum_cos / n).powi(2)).sqrt().clamp(0.0, 1.0)
    }
}
