//! Falling shapes: swept landing against the floor and static blocks.

use crate::grid::{Block, GridDims, Occupancy, CELL};
use crate::shape::FallingShape;

/// Y the shape must stop at if moving to `new_y` would reach the floor or a block top.
///
/// Every cell contributes candidates; the smallest (highest) wins so no cell of the rigid
/// body passes through anything. A landed block the cell already overlaps counts too: a
/// shape that hovered through a freeze can sit inside a tile that landed around it, and it
/// is pushed back up onto that tile's top.
pub fn landing_y(shape: &FallingShape, new_y: f32, occ: &Occupancy) -> Option<f32> {
    let dims = occ.dims();
    let floor = dims.floor_px();
    let origin_col = shape.origin_col();
    let mut best: Option<f32> = None;
    let mut offer = |cand: f32| {
        best = Some(best.map_or(cand, |b: f32| b.min(cand)));
    };

    for cell in &shape.cells {
        let bottom = cell.bottom_offset_px();
        let old_bottom = shape.y + bottom;
        let old_top = old_bottom - CELL;
        let new_bottom = new_y + bottom;

        if new_bottom >= floor {
            offer(floor - bottom);
        }

        let col = origin_col + cell.dc;
        if col < 0 || col >= dims.cols {
            continue;
        }
        for row in 0..dims.rows {
            if !occ.is_occupied(col, row) {
                continue;
            }
            let tile_top = row as f32 * CELL;
            let crosses = old_bottom <= tile_top && new_bottom >= tile_top;
            let overlaps = tile_top < old_bottom && tile_top + CELL > old_top;
            if crosses || overlaps {
                offer(tile_top - bottom);
            }
        }
    }
    best
}

/// Convert a landed shape into blocks. Cells outside the grid are dropped.
///
/// The shape lands whole: if any in-grid cell is already taken it is lifted a row at a time
/// until every cell is free. Rows above the grid are always free, so this stops.
fn materialize(shape: &FallingShape, occ: &mut Occupancy, blocks: &mut Vec<Block>) {
    let col0 = shape.origin_col();
    let landed_row = (shape.y / CELL).round() as i32;
    let mut row0 = landed_row;
    let taken = |occ: &Occupancy, row0: i32| {
        shape.cells.iter().any(|c| {
            let (col, row) = (col0 + c.dc, row0 + c.dr);
            occ.dims().contains(col, row) && occ.is_occupied(col, row)
        })
    };
    while taken(&*occ, row0) {
        row0 -= 1;
    }
    if row0 != landed_row {
        log::debug!("landing shape at column {} lifted to row {}", col0, row0);
    }
    for cell in &shape.cells {
        let b = Block::new(col0 + cell.dc, row0 + cell.dr, cell.kind);
        if !occ.dims().contains(b.col, b.row) {
            continue;
        }
        occ.insert(b);
        blocks.push(b);
    }
}

/// Move every shape by `speed * dt`, landing the ones that hit something.
/// Returns how many shapes landed.
pub fn step_shapes(
    shapes: &mut Vec<FallingShape>,
    blocks: &mut Vec<Block>,
    dt: f32,
    dims: GridDims,
) -> usize {
    let mut occ = Occupancy::build(blocks, dims);
    let mut landed = 0;
    let mut still_falling = Vec::with_capacity(shapes.len());

    for mut shape in shapes.drain(..) {
        let new_y = shape.y + shape.speed * dt;
        match landing_y(&shape, new_y, &occ) {
            Some(y) => {
                shape.y = y;
                materialize(&shape, &mut occ, blocks);
                landed += 1;
            }
            None => {
                shape.y = new_y;
                still_falling.push(shape);
            }
        }
    }

    *shapes = still_falling;
    landed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BlockType;
    use crate::shape::ShapeCell;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn dims() -> GridDims {
        GridDims::default()
    }

    #[test]
    fn free_fall_moves_unclamped() {
        let mut shapes = vec![FallingShape::rect(60.0, -30.0, 200.0, 1, 1)];
        let mut blocks = Vec::new();
        let landed = step_shapes(&mut shapes, &mut blocks, 0.05, dims());
        assert_eq!(landed, 0);
        assert!((shapes[0].y - -20.0).abs() < 1e-4);
        assert!(blocks.is_empty());
    }

    #[test]
    fn lands_on_floor() {
        // Bottom at 590, moving 20px: crosses the 600 floor.
        let mut shapes = vec![FallingShape::rect(90.0, 560.0, 400.0, 1, 1)];
        let mut blocks = Vec::new();
        assert_eq!(step_shapes(&mut shapes, &mut blocks, 0.05, dims()), 1);
        assert!(shapes.is_empty());
        assert_eq!(blocks, vec![Block::normal(3, 19)]);
    }

    #[test]
    fn lands_on_block_top() {
        let mut shapes = vec![FallingShape::rect(90.0, 255.0, 400.0, 1, 2)];
        let mut blocks = vec![Block::normal(3, 11)];
        // Bottom 315 -> 335 crosses the tile top at 330.
        assert_eq!(step_shapes(&mut shapes, &mut blocks, 0.05, dims()), 1);
        let mut rows: Vec<i32> = blocks.iter().filter(|b| b.col == 3).map(|b| b.row).collect();
        rows.sort_unstable();
        assert_eq!(rows, vec![9, 10, 11]);
    }

    #[test]
    fn earliest_contact_wins_across_columns() {
        // An L: column 0 is two tall, column 1 one tall. Obstacle under column 1 is higher.
        let cells = vec![
            ShapeCell::new(0, 0, BlockType::Normal),
            ShapeCell::new(1, 0, BlockType::Bomb),
            ShapeCell::new(0, 1, BlockType::Normal),
        ];
        let shape = FallingShape::new(0.0, 235.0, 600.0, cells);
        let occ = Occupancy::build(&[Block::normal(1, 9), Block::normal(0, 11)], dims());
        // Col 1 bottom 265 -> 295 crosses 270 (row 9): y = 240.
        // Col 0 bottom 295 -> 325 never reaches 330.
        assert_eq!(landing_y(&shape, 265.0, &occ), Some(240.0));

        let mut shapes = vec![shape];
        let mut blocks = vec![Block::normal(1, 9), Block::normal(0, 11)];
        step_shapes(&mut shapes, &mut blocks, 0.05, dims());
        assert!(blocks.contains(&Block::new(1, 8, BlockType::Bomb)));
        assert!(blocks.contains(&Block::normal(0, 8)));
        assert!(blocks.contains(&Block::normal(0, 9)));
    }

    #[test]
    fn resting_shape_lands_immediately() {
        let mut shapes = vec![FallingShape::rect(0.0, 540.0, 220.0, 1, 1)];
        let mut blocks = vec![Block::normal(0, 19)];
        assert_eq!(step_shapes(&mut shapes, &mut blocks, 0.016, dims()), 1);
        assert!(blocks.contains(&Block::normal(0, 18)));
    }

    #[test]
    fn cells_above_grid_are_dropped_on_landing() {
        // A 1x4 column landing with its top two cells still above row 0.
        let mut shapes = vec![FallingShape::rect(30.0, -65.0, 400.0, 1, 4)];
        let mut blocks = vec![Block::normal(1, 2)];
        assert_eq!(step_shapes(&mut shapes, &mut blocks, 0.05, dims()), 1);
        let mut rows: Vec<i32> = blocks.iter().map(|b| b.row).collect();
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn two_shapes_in_one_tick_do_not_share_cells() {
        let mut shapes = vec![
            FallingShape::rect(0.0, 560.0, 400.0, 1, 1),
            FallingShape::rect(0.0, 535.0, 400.0, 1, 1),
        ];
        let mut blocks = Vec::new();
        step_shapes(&mut shapes, &mut blocks, 0.05, dims());
        let cells: HashSet<(i32, i32)> = blocks.iter().map(|b| (b.col, b.row)).collect();
        assert_eq!(cells.len(), blocks.len());
    }

    #[test]
    fn overlapped_tile_stops_the_shape_on_top() {
        // Bottom already at 580, 10px into the tile that landed at row 19.
        let shape = FallingShape::rect(0.0, 550.0, 220.0, 1, 1);
        let occ = Occupancy::build(&[Block::normal(0, 19)], dims());
        assert_eq!(landing_y(&shape, 555.0, &occ), Some(540.0));
        // A tile the cell has fully passed is not an obstacle.
        let occ = Occupancy::build(&[Block::normal(0, 17)], dims());
        assert_eq!(landing_y(&shape, 555.0, &occ), None);
    }

    #[test]
    fn hovering_shapes_overtaken_in_flight_both_land_whole() {
        // Same column and start; the faster one lands first while the slower is
        // still inside the floor tile.
        let mut shapes = vec![
            FallingShape::rect(0.0, -30.0, 220.0, 1, 1),
            FallingShape::rect(0.0, -30.0, 223.75, 1, 1),
        ];
        let mut blocks = Vec::new();
        for _ in 0..200 {
            step_shapes(&mut shapes, &mut blocks, 0.016, dims());
        }
        assert!(shapes.is_empty());
        let mut cells: Vec<(i32, i32)> = blocks.iter().map(|b| (b.col, b.row)).collect();
        cells.sort_unstable();
        assert_eq!(cells, vec![(0, 18), (0, 19)]);
    }

    #[test]
    fn lifted_shape_keeps_all_cells() {
        // A 1x2 whose rounded landing rows are both taken is lifted above them.
        let shape = FallingShape::rect(0.0, 540.0, 220.0, 1, 2);
        let mut blocks = vec![Block::normal(0, 18), Block::normal(0, 19)];
        let mut occ = Occupancy::build(&blocks, dims());
        materialize(&shape, &mut occ, &mut blocks);
        let mut rows: Vec<i32> = blocks.iter().map(|b| b.row).collect();
        rows.sort_unstable();
        assert_eq!(rows, vec![16, 17, 18, 19]);
    }

    proptest! {
        #[test]
        fn prop_overtaking_shapes_conserve_cells(
            starts in proptest::collection::vec((-120.0f32..0.0, 200.0f32..260.0, 1i32..4), 1..4),
            dt in 0.005f32..0.05,
        ) {
            let dims = dims();
            let mut shapes: Vec<FallingShape> = starts
                .iter()
                .map(|&(y, speed, h)| FallingShape::rect(60.0, y, speed, 1, h))
                .collect();
            let expected: usize = shapes.iter().map(|s| s.cells.len()).sum();
            let mut blocks = Vec::new();
            for _ in 0..2000 {
                if shapes.is_empty() {
                    break;
                }
                step_shapes(&mut shapes, &mut blocks, dt, dims);
            }
            prop_assert!(shapes.is_empty());
            prop_assert_eq!(blocks.len(), expected);
            let cells: HashSet<(i32, i32)> = blocks.iter().map(|b| (b.col, b.row)).collect();
            prop_assert_eq!(cells.len(), expected);
        }

        #[test]
        fn prop_landing_never_overlaps_or_sinks(
            floor_cells in proptest::collection::hash_set((0i32..16, 8i32..20), 0..60),
            col in 0i32..13,
            w in 1i32..4,
            h in 1i32..4,
            dt in 0.005f32..0.05,
        ) {
            let dims = dims();
            let mut blocks: Vec<Block> =
                floor_cells.iter().map(|&(c, r)| Block::normal(c, r)).collect();
            let before: HashSet<(i32, i32)> = floor_cells.clone();
            let mut shapes = vec![FallingShape::rect(col as f32 * CELL, -(h as f32) * CELL, 260.0, w, h)];

            for _ in 0..2000 {
                if shapes.is_empty() {
                    break;
                }
                step_shapes(&mut shapes, &mut blocks, dt, dims);
                for s in &shapes {
                    let lowest = s.cells.iter().map(|c| c.bottom_offset_px()).fold(0.0, f32::max);
                    prop_assert!(s.y + lowest <= dims.floor_px());
                }
            }
            prop_assert!(shapes.is_empty());
            let mut seen = HashSet::new();
            for b in &blocks {
                prop_assert!(seen.insert((b.col, b.row)), "two blocks at {:?}", (b.col, b.row));
            }
            for b in &blocks[before.len()..] {
                prop_assert!(!before.contains(&(b.col, b.row)));
                prop_assert!(dims.contains(b.col, b.row));
            }
        }
    }
}
