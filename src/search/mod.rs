//! A* graph search over an occupancy costmap.
//!
//! - [`engine::GridSearch`]: the search loop and open set
//! - [`node`]: pooled per-cell nodes reused across episodes
//! - [`neighborhood`]: 4-/8-connected offset tables

mod engine;
mod neighborhood;
mod node;

pub use engine::GridSearch;
pub use neighborhood::Neighborhood;

use crate::core::CellPoint;

/// Lift a discrete cell-index path into continuous points in cell units.
///
/// The result seeds the smoother as its original-path anchor.
pub fn lift_path(cells: &[u32], width: u32) -> Vec<CellPoint> {
    cells
        .iter()
        .map(|&index| CellPoint::from_index(index, width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lift_path() {
        let points = lift_path(&[0, 6, 12], 5);
        assert_eq!(
            points,
            vec![
                CellPoint::new(0.0, 0.0),
                CellPoint::new(1.0, 1.0),
                CellPoint::new(2.0, 2.0),
            ]
        );
    }
}
