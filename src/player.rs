//! Player avatar: walk, jump and collide with static blocks.
//!
//! The simulation core only ever sees the avatar as a read-only [`Footprint`].

use crate::grid::{px_to_cell, Block, GridDims, CELL};

const WALK_SPEED: f32 = 220.0;
const GRAVITY: f32 = 900.0;
const JUMP_VELOCITY: f32 = -430.0;
/// Gap between the avatar and the floor at spawn.
const SPAWN_LIFT: f32 = 10.0;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Footprint {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// A footprint exactly covering one cell.
    pub fn at_cell(col: i32, row: i32) -> Self {
        Self::new(col as f32 * CELL, row as f32 * CELL, CELL, CELL)
    }

    /// Inclusive cell span covered by the rectangle.
    pub fn span(&self) -> CellSpan {
        CellSpan {
            left_col: px_to_cell(self.x),
            right_col: px_to_cell(self.x + self.w - 1.0),
            top_row: px_to_cell(self.y),
            bottom_row: px_to_cell(self.y + self.h - 1.0),
        }
    }

    /// Cell holding the top-left corner; break targets are measured from here.
    pub fn anchor_cell(&self) -> (i32, i32) {
        (px_to_cell(self.x), px_to_cell(self.y))
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Inclusive cell ranges of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub left_col: i32,
    pub right_col: i32,
    pub top_row: i32,
    pub bottom_row: i32,
}

impl CellSpan {
    /// A span that covers no cell at all.
    #[cfg(test)]
    pub const NONE: Self = Self {
        left_col: 0,
        right_col: -1,
        top_row: 0,
        bottom_row: -1,
    };

    #[inline]
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= self.left_col && col <= self.right_col && row >= self.top_row && row <= self.bottom_row
    }
}

/// Movement intents for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveIntents {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Footprint,
    pub vy: f32,
    pub on_ground: bool,
    prev_jump: bool,
    dims: GridDims,
}

impl Player {
    /// One-cell avatar centred on the floor.
    pub fn new(dims: GridDims) -> Self {
        let body = Footprint::new(
            ((dims.width_px() - CELL) / 2.0).floor(),
            dims.floor_px() - CELL - SPAWN_LIFT,
            CELL,
            CELL,
        );
        Self {
            body,
            vy: 0.0,
            on_ground: false,
            prev_jump: false,
            dims,
        }
    }

    pub fn footprint(&self) -> Footprint {
        self.body
    }

    fn block_rect(b: &Block) -> Footprint {
        Footprint::at_cell(b.col, b.row)
    }

    /// Advance the avatar by `dt` seconds against the current static blocks.
    pub fn step(&mut self, dt: f32, intents: MoveIntents, blocks: &[Block]) {
        let old_y = self.body.y;
        let w = self.body.w;
        let h = self.body.h;
        let screen_w = self.dims.width_px();
        let floor = self.dims.floor_px();

        let mut vx = 0.0;
        if intents.left {
            vx -= WALK_SPEED;
        }
        if intents.right {
            vx += WALK_SPEED;
        }

        // Horizontal
        let mut new_x = (self.body.x + vx * dt).clamp(0.0, screen_w - w);
        let mut moved = Footprint { x: new_x, ..self.body };
        for b in blocks {
            let br = Self::block_rect(b);
            if moved.overlaps(&br) {
                if vx > 0.0 {
                    new_x = br.x - w;
                } else if vx < 0.0 {
                    new_x = br.x + br.w;
                }
                moved.x = new_x;
            }
        }
        self.body.x = new_x;

        if intents.jump && !self.prev_jump && self.on_ground {
            self.vy = JUMP_VELOCITY;
            self.on_ground = false;
        }
        self.prev_jump = intents.jump;

        // Vertical
        self.vy += GRAVITY * dt;
        let mut new_y = self.body.y + self.vy * dt;
        if new_y + h >= floor {
            new_y = floor - h;
            self.vy = 0.0;
        }
        let mut moved = Footprint { y: new_y, ..self.body };
        for b in blocks {
            let br = Self::block_rect(b);
            if !moved.overlaps(&br) {
                continue;
            }
            if self.vy > 0.0 && old_y + h <= br.y {
                new_y = br.y - h;
                self.vy = 0.0;
                moved.y = new_y;
            } else if self.vy < 0.0 && old_y >= br.y + br.h {
                new_y = br.y + br.h;
                self.vy = 0.0;
                moved.y = new_y;
            }
        }
        self.body.y = new_y;
        self.on_ground = self.feet_supported(blocks);
    }

    /// Standing on the floor, or on the top of a block under the feet.
    fn feet_supported(&self, blocks: &[Block]) -> bool {
        let feet = self.body.y + self.body.h;
        if feet >= self.dims.floor_px() - 1.0 {
            return true;
        }
        blocks.iter().any(|b| {
            let br = Self::block_rect(b);
            (br.y - feet).abs() < f32::EPSILON * CELL
                && self.body.x + self.body.w > br.x
                && self.body.x < br.x + br.w
        })
    }
}
