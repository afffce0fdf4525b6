//! Shape spawner: a random bar or block every interval, sometimes carrying a power block.

use crate::grid::{BlockType, GridDims, CELL};
use crate::shape::FallingShape;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Spawnable footprints `(width, height)` in cells.
pub const SHAPES: [(i32, i32); 5] = [(1, 1), (2, 1), (4, 1), (1, 2), (1, 4)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTuning {
    /// Seconds between spawns.
    pub interval: f32,
    /// Percent chance that a spawn carries a power block.
    pub powerup_chance: u32,
    /// A power block is forced once this many seconds pass without one.
    pub powerup_max_gap: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            interval: 0.75,
            powerup_chance: 7,
            powerup_max_gap: 15.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
    seed: Option<u64>,
    tuning: SpawnTuning,
    timer: f32,
    since_powerup: f32,
}

impl Spawner {
    pub fn new(seed: Option<u64>, tuning: SpawnTuning) -> Self {
        Self {
            rng: Self::make_rng(seed),
            seed,
            tuning,
            timer: 0.0,
            since_powerup: 0.0,
        }
    }

    fn make_rng(seed: Option<u64>) -> StdRng {
        seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }

    /// Zero the timers. A seeded spawner replays the same sequence after a reset.
    pub fn reset(&mut self) {
        self.rng = Self::make_rng(self.seed);
        self.timer = 0.0;
        self.since_powerup = 0.0;
    }

    /// Advance the timers; returns a new shape when the interval elapses.
    pub fn tick(&mut self, dt: f32, fall_speed: f32, dims: GridDims) -> Option<FallingShape> {
        self.since_powerup += dt;
        self.timer += dt;
        if self.timer < self.tuning.interval {
            return None;
        }
        self.timer = 0.0;
        Some(self.spawn(fall_speed, dims))
    }

    fn spawn(&mut self, fall_speed: f32, dims: GridDims) -> FallingShape {
        let (w, h) = SHAPES[self.rng.gen_range(0..SHAPES.len())];
        let w = w.min(dims.cols);
        let max_col = dims.cols - w;
        let col = if max_col > 0 {
            self.rng.gen_range(0..=max_col)
        } else {
            0
        };
        let mut shape = FallingShape::rect(col as f32 * CELL, -(h as f32) * CELL, fall_speed, w, h);

        let forced = self.since_powerup >= self.tuning.powerup_max_gap;
        if forced || self.rng.gen_range(0..100) < self.tuning.powerup_chance {
            let i = self.rng.gen_range(0..shape.cells.len());
            let kind = *BlockType::POWERS
                .choose(&mut self.rng)
                .unwrap_or(&BlockType::Bomb);
            shape.cells[i].kind = kind;
            self.since_powerup = 0.0;
            log::debug!("spawned {} in a {}x{} shape at column {}", kind, w, h, col);
        }
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner(chance: u32) -> Spawner {
        Spawner::new(
            Some(7),
            SpawnTuning {
                powerup_chance: chance,
                ..SpawnTuning::default()
            },
        )
    }

    #[test]
    fn spawns_once_per_interval() {
        let dims = GridDims::default();
        let mut s = spawner(7);
        assert!(s.tick(0.5, 220.0, dims).is_none());
        let shape = s.tick(0.3, 220.0, dims).expect("interval elapsed");
        assert_eq!(shape.speed, 220.0);
        assert!(s.tick(0.05, 220.0, dims).is_none());
    }

    #[test]
    fn shapes_start_above_grid_and_inside_columns() {
        let dims = GridDims::default();
        let mut s = spawner(7);
        for _ in 0..300 {
            let shape = s.tick(1.0, 220.0, dims).expect("spawn");
            let height = shape.cells.iter().map(|c| c.dr).max().unwrap_or(0) + 1;
            assert_eq!(shape.y, -(height as f32) * CELL);
            assert!(shape.grid_cells().all(|(c, r, _)| (0..16).contains(&c) && r < 0));
            assert!(SHAPES.contains(&(
                shape.cells.iter().map(|c| c.dc).max().unwrap_or(0) + 1,
                height
            )));
        }
    }

    #[test]
    fn power_block_forced_after_gap() {
        let dims = GridDims::default();
        let mut s = spawner(0);
        // Chance 0: only the gap rule can produce a power block.
        let mut powered = 0;
        for _ in 0..40 {
            let shape = s.tick(1.0, 220.0, dims).expect("spawn");
            let powers = shape.cells.iter().filter(|c| c.kind.is_power()).count();
            assert!(powers <= 1);
            powered += powers;
        }
        // 40 seconds with a 15 second gap: forced at t=15 and t=30.
        assert_eq!(powered, 2);
    }

    #[test]
    fn seeded_reset_replays() {
        let dims = GridDims::default();
        let mut s = spawner(50);
        let first: Vec<FallingShape> = (0..10).filter_map(|_| s.tick(1.0, 220.0, dims)).collect();
        s.reset();
        let again: Vec<FallingShape> = (0..10).filter_map(|_| s.tick(1.0, 220.0, dims)).collect();
        assert_eq!(first, again);
    }
}
