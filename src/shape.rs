//! Rigid falling shapes.

use crate::grid::{px_to_cell, BlockType, CELL};

/// One cell of a shape: lattice offset from the shape origin, plus its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeCell {
    pub dc: i32,
    pub dr: i32,
    pub kind: BlockType,
}

impl ShapeCell {
    pub fn new(dc: i32, dr: i32, kind: BlockType) -> Self {
        Self { dc, dr, kind }
    }

    /// Offset of this cell's bottom edge below the shape origin, in pixels.
    #[inline]
    pub fn bottom_offset_px(&self) -> f32 {
        (self.dr + 1) as f32 * CELL
    }
}

/// A group of cells that falls and lands as one unit. Origin is the top-left, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingShape {
    pub x: f32,
    pub y: f32,
    /// Pixels per second.
    pub speed: f32,
    pub cells: Vec<ShapeCell>,
}

impl FallingShape {
    pub fn new(x: f32, y: f32, speed: f32, cells: Vec<ShapeCell>) -> Self {
        Self { x, y, speed, cells }
    }

    /// Solid `w x h` rectangle of normal cells.
    pub fn rect(x: f32, y: f32, speed: f32, w: i32, h: i32) -> Self {
        let cells = (0..h)
            .flat_map(|dr| (0..w).map(move |dc| ShapeCell::new(dc, dr, BlockType::Normal)))
            .collect();
        Self::new(x, y, speed, cells)
    }

    #[inline]
    pub fn origin_col(&self) -> i32 {
        px_to_cell(self.x)
    }

    #[inline]
    pub fn origin_row(&self) -> i32 {
        px_to_cell(self.y)
    }

    /// Absolute `(col, row, kind)` of every cell at the current position.
    pub fn grid_cells(&self) -> impl Iterator<Item = (i32, i32, BlockType)> + '_ {
        let (c0, r0) = (self.origin_col(), self.origin_row());
        self.cells.iter().map(move |c| (c0 + c.dc, r0 + c.dr, c.kind))
    }

    /// Drop every cell whose absolute position matches `hit`. Returns how many were removed.
    pub fn remove_cells_where(&mut self, mut hit: impl FnMut(i32, i32) -> bool) -> usize {
        let (c0, r0) = (self.origin_col(), self.origin_row());
        let before = self.cells.len();
        self.cells.retain(|c| !hit(c0 + c.dc, r0 + c.dr));
        before - self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
