//! Simulation orchestrator: one fixed-order tick over the grid, the shapes and the timers.

use crate::breaker::{break_at, BreakIntents, Cooldowns, Direction};
use crate::cluster::resolve_floating_clusters;
use crate::falling::step_shapes;
use crate::grid::{Block, GridDims};
use crate::player::Footprint;
use crate::power::{apply_power, PowerTuning};
use crate::rows::clear_full_rows;
use crate::shape::FallingShape;
use crate::spawn::Spawner;
use crate::GameConfig;

/// Read-only view of the simulation after a tick.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub blocks: &'a [Block],
    pub shapes: &'a [FallingShape],
    pub game_over: bool,
    pub freeze_active: bool,
    pub freeze_remaining: f32,
    /// Survival time in seconds; this is the score.
    pub elapsed: f32,
    /// Rows removed by the last tick, pre-removal indices.
    pub cleared_rows: &'a [i32],
    pub cooldowns: Cooldowns,
}

#[derive(Debug)]
pub struct Simulation {
    dims: GridDims,
    break_cooldown: f32,
    power: PowerTuning,
    base_fall: f32,
    max_extra_fall: f32,
    fall_accel: f32,
    max_dt: f32,

    blocks: Vec<Block>,
    shapes: Vec<FallingShape>,
    cooldowns: Cooldowns,
    freeze_timer: f32,
    elapsed: f32,
    spawner: Spawner,
    cleared_rows: Vec<i32>,
    game_over: bool,
}

impl Simulation {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            dims: config.dims(),
            break_cooldown: config.break_cooldown,
            power: config.power_tuning(),
            base_fall: config.base_fall,
            max_extra_fall: config.max_extra_fall,
            fall_accel: config.fall_accel,
            max_dt: config.max_dt,
            blocks: Vec::new(),
            shapes: Vec::new(),
            cooldowns: Cooldowns::default(),
            freeze_timer: 0.0,
            elapsed: 0.0,
            spawner: Spawner::new(config.seed, config.spawn_tuning()),
            cleared_rows: Vec::new(),
            game_over: false,
        }
    }

    /// Back to an empty grid with all timers at zero.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.shapes.clear();
        self.cooldowns = Cooldowns::default();
        self.freeze_timer = 0.0;
        self.elapsed = 0.0;
        self.spawner.reset();
        self.cleared_rows.clear();
        self.game_over = false;
        log::info!("simulation reset");
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_timer > 0.0
    }

    /// Current fall speed in px/s; ramps gently with survival time.
    pub fn fall_speed(&self) -> f32 {
        self.base_fall + (self.elapsed * self.fall_accel).min(self.max_extra_fall)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            blocks: &self.blocks,
            shapes: &self.shapes,
            game_over: self.game_over,
            freeze_active: self.is_frozen(),
            freeze_remaining: self.freeze_timer,
            elapsed: self.elapsed,
            cleared_rows: &self.cleared_rows,
            cooldowns: self.cooldowns,
        }
    }

    /// Run one tick.
    ///
    /// Order: timers, spawn, falling, breaks and powers, row clear, floating clusters,
    /// game-over check. Falling and cluster resolution are skipped while frozen. Once the
    /// game is over nothing changes until [`Simulation::reset`].
    pub fn advance(&mut self, dt: f32, intents: BreakIntents, player: Footprint) -> Snapshot<'_> {
        if self.game_over {
            return self.snapshot();
        }
        let dt = dt.clamp(0.0, self.max_dt);
        self.cleared_rows.clear();

        self.elapsed += dt;
        self.freeze_timer = (self.freeze_timer - dt).max(0.0);
        self.cooldowns.decay(dt);
        let fall_speed = self.fall_speed();

        if let Some(shape) = self.spawner.tick(dt, fall_speed, self.dims) {
            self.shapes.push(shape);
        }

        if !self.is_frozen() {
            step_shapes(&mut self.shapes, &mut self.blocks, dt, self.dims);
        }

        self.apply_breaks(intents, player);

        self.cleared_rows = clear_full_rows(&mut self.blocks, self.dims);

        if !self.is_frozen() {
            let res = resolve_floating_clusters(&self.blocks, fall_speed, player.span(), self.dims);
            self.blocks = res.supported;
            self.shapes.extend(res.floating);
        }

        if self.blocks.iter().any(|b| b.row <= 0) {
            self.game_over = true;
            log::info!("game over: stack reached the top after {:.2}s", self.elapsed);
        }

        self.snapshot()
    }

    fn apply_breaks(&mut self, intents: BreakIntents, player: Footprint) {
        let (pc, pr) = player.anchor_cell();
        for dir in Direction::ALL {
            if !intents.wants(dir) {
                continue;
            }
            let (dc, dr) = dir.offset();
            let (col, row) = (pc + dc, pr + dr);
            let broken = break_at(
                &mut self.blocks,
                col,
                row,
                self.cooldowns.get_mut(dir),
                self.break_cooldown,
                self.dims,
            );
            if let Some(kind) = broken {
                apply_power(
                    kind,
                    col,
                    row,
                    &mut self.blocks,
                    &mut self.shapes,
                    &mut self.freeze_timer,
                    self.power,
                );
            }
        }
    }
}

#[cfg(test)]
impl Simulation {
    pub(crate) fn world_mut(&mut self) -> (&mut Vec<Block>, &mut Vec<FallingShape>) {
        (&mut self.blocks, &mut self.shapes)
    }
}
