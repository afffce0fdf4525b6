//! Directional block breaking, one cooldown per direction.

use crate::grid::{Block, BlockType, GridDims};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Cell offset `(dc, dr)` from the player's anchor cell.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }
}

/// Break requests for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BreakIntents {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl BreakIntents {
    pub fn wants(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    #[cfg(test)]
    pub fn only(dir: Direction) -> Self {
        let mut out = Self::default();
        match dir {
            Direction::Left => out.left = true,
            Direction::Right => out.right = true,
            Direction::Up => out.up = true,
            Direction::Down => out.down = true,
        }
        out
    }
}

/// Seconds left before each direction may break again.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cooldowns {
    left: f32,
    right: f32,
    up: f32,
    down: f32,
}

impl Cooldowns {
    pub fn get(&self, dir: Direction) -> f32 {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn get_mut(&mut self, dir: Direction) -> &mut f32 {
        match dir {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    pub fn decay(&mut self, dt: f32) {
        for dir in Direction::ALL {
            let cd = self.get_mut(dir);
            *cd = (*cd - dt).max(0.0);
        }
    }
}

/// Remove the block at `(col, row)` if the cooldown allows it.
///
/// Returns the removed block's type so the caller can dispatch its power. Fails without
/// touching anything when the cooldown is running, the target is off-grid, or the cell is empty.
pub fn break_at(
    blocks: &mut Vec<Block>,
    col: i32,
    row: i32,
    cooldown: &mut f32,
    reset_to: f32,
    dims: GridDims,
) -> Option<BlockType> {
    if *cooldown > 0.0 || !dims.contains(col, row) {
        return None;
    }
    let i = blocks.iter().position(|b| b.col == col && b.row == row)?;
    let removed = blocks.remove(i);
    *cooldown = reset_to;
    Some(removed.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CD: f32 = 0.5;

    #[test]
    fn breaks_and_starts_cooldown() {
        let mut blocks = vec![Block::normal(4, 10), Block::new(5, 10, BlockType::Bomb)];
        let mut cd = 0.0;
        let got = break_at(&mut blocks, 5, 10, &mut cd, CD, GridDims::default());
        assert_eq!(got, Some(BlockType::Bomb));
        assert_eq!(blocks, vec![Block::normal(4, 10)]);
        assert_eq!(cd, CD);
    }

    #[test]
    fn cooldown_blocks_second_break() {
        let mut blocks = vec![Block::normal(4, 10), Block::normal(5, 10)];
        let mut cd = 0.0;
        assert!(break_at(&mut blocks, 4, 10, &mut cd, CD, GridDims::default()).is_some());
        assert!(break_at(&mut blocks, 5, 10, &mut cd, CD, GridDims::default()).is_none());
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn empty_or_out_of_range_target_is_noop() {
        let mut blocks = vec![Block::normal(0, 0)];
        let mut cd = 0.0;
        assert!(break_at(&mut blocks, 3, 3, &mut cd, CD, GridDims::default()).is_none());
        assert!(break_at(&mut blocks, -1, 0, &mut cd, CD, GridDims::default()).is_none());
        assert!(break_at(&mut blocks, 0, 20, &mut cd, CD, GridDims::default()).is_none());
        assert_eq!(cd, 0.0);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn cooldowns_decay_independently_to_zero() {
        let mut cds = Cooldowns::default();
        *cds.get_mut(Direction::Left) = 0.5;
        *cds.get_mut(Direction::Down) = 0.1;
        cds.decay(0.2);
        assert!((cds.get(Direction::Left) - 0.3).abs() < 1e-6);
        assert_eq!(cds.get(Direction::Down), 0.0);
        assert_eq!(cds.get(Direction::Up), 0.0);
    }

    #[test]
    fn intents_select_direction() {
        let i = BreakIntents::only(Direction::Up);
        assert!(i.wants(Direction::Up));
        assert!(!i.wants(Direction::Down));
        assert_eq!(Direction::Up.offset(), (0, -1));
    }
}
