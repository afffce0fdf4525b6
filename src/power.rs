//! Power block effects, fired when a power block is broken by the player.

use crate::grid::{Block, BlockType};
use crate::shape::FallingShape;

/// Tuning for the area effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerTuning {
    /// Chebyshev radius of a bomb, inclusive.
    pub bomb_radius: i32,
    /// Seconds of freeze.
    pub freeze_duration: f32,
}

impl Default for PowerTuning {
    fn default() -> Self {
        Self {
            bomb_radius: 5,
            freeze_duration: 10.0,
        }
    }
}

/// Cells an effect wipes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blast {
    Square { col: i32, row: i32, radius: i32 },
    Row(i32),
    Column(i32),
}

impl Blast {
    pub fn hits(&self, col: i32, row: i32) -> bool {
        match *self {
            Self::Square { col: c, row: r, radius } => {
                (col - c).abs() <= radius && (row - r).abs() <= radius
            }
            Self::Row(r) => row == r,
            Self::Column(c) => col == c,
        }
    }
}

/// What a triggered power did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerOutcome {
    pub blocks_removed: usize,
    pub shape_cells_removed: usize,
    pub froze: bool,
}

/// Remove every block and falling shape cell the blast covers. Emptied shapes are dropped.
pub fn detonate(blast: Blast, blocks: &mut Vec<Block>, shapes: &mut Vec<FallingShape>) -> PowerOutcome {
    let before = blocks.len();
    blocks.retain(|b| !blast.hits(b.col, b.row));
    let mut cells = 0;
    for shape in shapes.iter_mut() {
        cells += shape.remove_cells_where(|c, r| blast.hits(c, r));
    }
    shapes.retain(|s| !s.is_empty());
    PowerOutcome {
        blocks_removed: before - blocks.len(),
        shape_cells_removed: cells,
        froze: false,
    }
}

/// Fire the effect of a broken block at `(col, row)`. Normal blocks do nothing.
pub fn apply_power(
    kind: BlockType,
    col: i32,
    row: i32,
    blocks: &mut Vec<Block>,
    shapes: &mut Vec<FallingShape>,
    freeze_timer: &mut f32,
    tuning: PowerTuning,
) -> PowerOutcome {
    let blast = match kind {
        BlockType::Normal => return PowerOutcome::default(),
        BlockType::Freeze => {
            *freeze_timer = tuning.freeze_duration;
            log::info!("freeze for {:.1}s", tuning.freeze_duration);
            return PowerOutcome {
                froze: true,
                ..PowerOutcome::default()
            };
        }
        BlockType::Bomb => Blast::Square {
            col,
            row,
            radius: tuning.bomb_radius,
        },
        BlockType::LaserH => Blast::Row(row),
        BlockType::LaserV => Blast::Column(col),
    };
    let out = detonate(blast, blocks, shapes);
    log::info!(
        "{} at ({}, {}): {} blocks, {} falling cells",
        kind,
        col,
        row,
        out.blocks_removed,
        out.shape_cells_removed
    );
    out
}
