//! Grid model: block types, static blocks and the derived occupancy view.

use std::fmt;

/// Side of one grid cell in pixel units. Falling shapes and the player live in pixel space.
pub const CELL: f32 = 30.0;

/// What a static block (or a falling shape cell) is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    #[default]
    Normal,
    Bomb,
    Freeze,
    LaserH,
    LaserV,
}

impl BlockType {
    /// Power types, in the order the spawner draws them.
    pub const POWERS: [Self; 4] = [Self::Bomb, Self::Freeze, Self::LaserH, Self::LaserV];

    #[inline]
    pub fn is_power(self) -> bool {
        self != Self::Normal
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Bomb => write!(f, "Bomb"),
            Self::Freeze => write!(f, "Freeze"),
            Self::LaserH => write!(f, "LaserH"),
            Self::LaserV => write!(f, "LaserV"),
        }
    }
}

/// A static cell occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub col: i32,
    pub row: i32,
    pub kind: BlockType,
}

impl Block {
    pub fn new(col: i32, row: i32, kind: BlockType) -> Self {
        Self { col, row, kind }
    }

    pub fn normal(col: i32, row: i32) -> Self {
        Self::new(col, row, BlockType::Normal)
    }
}

/// Grid size in cells. Row 0 is the top, `rows - 1` is the floor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub cols: i32,
    pub rows: i32,
}

impl Default for GridDims {
    fn default() -> Self {
        Self { cols: 16, rows: 20 }
    }
}

impl GridDims {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: i32::from(cols.max(1)),
            rows: i32::from(rows.max(1)),
        }
    }

    #[inline]
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && col < self.cols && row >= 0 && row < self.rows
    }

    #[inline]
    pub fn index(&self, col: i32, row: i32) -> Option<usize> {
        self.contains(col, row)
            .then(|| (row * self.cols + col) as usize)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Pixel width of the playfield.
    pub fn width_px(&self) -> f32 {
        self.cols as f32 * CELL
    }

    /// Pixel y of the floor (bottom edge of the last row).
    pub fn floor_px(&self) -> f32 {
        self.rows as f32 * CELL
    }
}

/// Cell index of a pixel coordinate (floor division, so negative pixels map to negative cells).
#[inline]
pub fn px_to_cell(px: f32) -> i32 {
    (px / CELL).floor() as i32
}

/// Dense occupancy/type view, rebuilt from the block list whenever a query needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    dims: GridDims,
    cells: Vec<Option<BlockType>>,
}

impl Occupancy {
    /// Derive the view. Blocks outside the grid are ignored.
    pub fn build(blocks: &[Block], dims: GridDims) -> Self {
        let mut cells = vec![None; dims.cell_count()];
        for b in blocks {
            if let Some(i) = dims.index(b.col, b.row) {
                cells[i] = Some(b.kind);
            }
        }
        Self { dims, cells }
    }

    #[inline]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Type at a cell; `None` for empty or out-of-range cells.
    #[inline]
    pub fn kind_at(&self, col: i32, row: i32) -> Option<BlockType> {
        self.dims.index(col, row).and_then(|i| self.cells[i])
    }

    #[inline]
    pub fn is_occupied(&self, col: i32, row: i32) -> bool {
        self.kind_at(col, row).is_some()
    }

    /// Mark a cell as taken. Out-of-range cells are ignored.
    pub fn insert(&mut self, block: Block) {
        if let Some(i) = self.dims.index(block.col, block.row) {
            self.cells[i] = Some(block.kind);
        }
    }

    pub fn is_row_full(&self, row: i32) -> bool {
        (0..self.dims.cols).all(|c| self.is_occupied(c, row))
    }

    #[cfg(test)]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
