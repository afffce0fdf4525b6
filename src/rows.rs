//! Full-row clearing and compaction.

use crate::grid::{Block, GridDims, Occupancy};

/// Remove every full row and drop the blocks above each cleared row to close the gap.
///
/// Shifts are counted against the pre-removal row indices in one pass. Returns the cleared
/// rows in ascending order.
pub fn clear_full_rows(blocks: &mut Vec<Block>, dims: GridDims) -> Vec<i32> {
    if blocks.is_empty() {
        return Vec::new();
    }
    let occ = Occupancy::build(blocks, dims);
    let full: Vec<i32> = (0..dims.rows).filter(|&r| occ.is_row_full(r)).collect();
    if full.is_empty() {
        return full;
    }

    blocks.retain(|b| full.binary_search(&b.row).is_err());
    for b in blocks.iter_mut() {
        let shift = full.iter().filter(|&&r| r > b.row).count() as i32;
        b.row += shift;
    }
    log::debug!("cleared rows {:?}", full);
    full
}
