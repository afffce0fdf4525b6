//! Floating-cluster resolution: which groups of static blocks are held up, and which must fall.
//!
//! Occupied cells are split into 4-connected components. A component stays static if any
//! member sits on the floor row, rests on an occupied cell outside the component, or rests on
//! the player. Every other component is lifted out of the grid as one rigid [`FallingShape`].

use crate::grid::{Block, GridDims, Occupancy, CELL};
use crate::player::CellSpan;
use crate::shape::{FallingShape, ShapeCell};
use std::collections::VecDeque;

const NEIGHBOURS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Connected components of the occupancy view, plus a per-cell label arena.
#[derive(Debug, Clone)]
pub struct Components {
    /// Member cells `(col, row)` of each component, in discovery order.
    pub groups: Vec<Vec<(i32, i32)>>,
    labels: Vec<Option<usize>>,
    dims: GridDims,
}

impl Components {
    /// Component id of an occupied cell.
    pub fn label(&self, col: i32, row: i32) -> Option<usize> {
        self.dims.index(col, row).and_then(|i| self.labels[i])
    }
}

/// Breadth-first flood fill over 4-neighbours, scanning start cells row-major.
pub fn components(occ: &Occupancy) -> Components {
    let dims = occ.dims();
    let mut labels: Vec<Option<usize>> = vec![None; dims.cell_count()];
    let mut groups = Vec::new();
    let mut queue = VecDeque::new();

    for r0 in 0..dims.rows {
        for c0 in 0..dims.cols {
            let Some(start) = dims.index(c0, r0) else { continue };
            if !occ.is_occupied(c0, r0) || labels[start].is_some() {
                continue;
            }
            let id = groups.len();
            let mut cells = Vec::new();
            labels[start] = Some(id);
            queue.push_back((c0, r0));

            while let Some((c, r)) = queue.pop_front() {
                cells.push((c, r));
                for (dc, dr) in NEIGHBOURS_4 {
                    let (nc, nr) = (c + dc, r + dr);
                    let Some(i) = dims.index(nc, nr) else { continue };
                    if labels[i].is_some() || !occ.is_occupied(nc, nr) {
                        continue;
                    }
                    labels[i] = Some(id);
                    queue.push_back((nc, nr));
                }
            }
            groups.push(cells);
        }
    }

    Components { groups, labels, dims }
}

/// Why a component stays put, in the order the rules are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Ground,
    Block,
    Player,
}

/// First support rule satisfied by any member cell, or `None` if the component floats.
pub fn support_of(
    id: usize,
    comps: &Components,
    occ: &Occupancy,
    player: CellSpan,
) -> Option<Support> {
    let floor_row = occ.dims().rows - 1;
    for &(col, row) in &comps.groups[id] {
        if row == floor_row {
            return Some(Support::Ground);
        }
        let below = row + 1;
        if occ.is_occupied(col, below) && comps.label(col, below) != Some(id) {
            return Some(Support::Block);
        }
        if player.contains(col, below) {
            return Some(Support::Player);
        }
    }
    None
}

/// Outcome of one resolver pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub supported: Vec<Block>,
    pub floating: Vec<FallingShape>,
}

/// Split the static blocks into supported blocks and newly falling shapes.
pub fn resolve_floating_clusters(
    blocks: &[Block],
    fall_speed: f32,
    player: CellSpan,
    dims: GridDims,
) -> Resolution {
    if blocks.is_empty() {
        return Resolution::default();
    }
    let occ = Occupancy::build(blocks, dims);
    let comps = components(&occ);

    let mut out = Resolution {
        supported: Vec::with_capacity(blocks.len()),
        floating: Vec::new(),
    };

    for (id, cells) in comps.groups.iter().enumerate() {
        let members = cells.iter().filter_map(|&(c, r)| {
            occ.kind_at(c, r).map(|kind| Block::new(c, r, kind))
        });
        if support_of(id, &comps, &occ, player).is_some() {
            out.supported.extend(members);
        } else {
            out.floating.push(rigid_shape(members, fall_speed));
        }
    }
    out
}

/// Normalize a floating component to its bounding-box top-left.
fn rigid_shape(members: impl Iterator<Item = Block>, fall_speed: f32) -> FallingShape {
    let members: Vec<Block> = members.collect();
    let min_c = members.iter().map(|b| b.col).min().unwrap_or(0);
    let min_r = members.iter().map(|b| b.row).min().unwrap_or(0);
    let cells = members
        .iter()
        .map(|b| ShapeCell::new(b.col - min_c, b.row - min_r, b.kind))
        .collect();
    FallingShape::new(min_c as f32 * CELL, min_r as f32 * CELL, fall_speed, cells)
}
