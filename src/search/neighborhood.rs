//! Neighborhood offset tables for 4- and 8-connected expansion.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Expansion connectivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// 4-connected (cardinal directions only)
    VonNeumann,
    /// 8-connected (cardinals plus diagonals)
    Moore,
}

impl FromStr for Neighborhood {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "von_neumann" | "4" => Ok(Neighborhood::VonNeumann),
            "moore" | "8" => Ok(Neighborhood::Moore),
            other => Err(PlannerError::InvalidNeighborhood(other.to_string())),
        }
    }
}

/// One signed flat-index offset and the column delta it implies.
#[derive(Clone, Copy, Debug)]
struct GridOffset {
    di: i64,
    #[cfg_attr(not(feature = "wrap-check"), allow(dead_code))]
    dx: i32,
}

/// Episode-owned table of neighbor offsets for one grid width.
///
/// Cardinal offsets come first. In open space a newcomer cell is reachable
/// from several neighbors at the same tentative cost and enumeration order
/// decides which parent sticks; cardinal-first keeps the parent field
/// stable across large free regions, which keeps smoother inputs closer to
/// straight lines.
#[derive(Debug)]
pub(crate) struct OffsetTable {
    offsets: Vec<GridOffset>,
    #[cfg_attr(not(feature = "wrap-check"), allow(dead_code))]
    width: u32,
    size: usize,
}

impl OffsetTable {
    pub fn new(width: u32, height: u32, kind: Neighborhood) -> Self {
        let w = width as i64;
        let offsets = match kind {
            Neighborhood::VonNeumann => vec![
                GridOffset { di: -1, dx: -1 },
                GridOffset { di: 1, dx: 1 },
                GridOffset { di: -w, dx: 0 },
                GridOffset { di: w, dx: 0 },
            ],
            Neighborhood::Moore => vec![
                GridOffset { di: -1, dx: -1 },
                GridOffset { di: 1, dx: 1 },
                GridOffset { di: -w, dx: 0 },
                GridOffset { di: w, dx: 0 },
                GridOffset { di: -w - 1, dx: -1 },
                GridOffset { di: -w + 1, dx: 1 },
                GridOffset { di: w - 1, dx: -1 },
                GridOffset { di: w + 1, dx: 1 },
            ],
        };
        Self {
            offsets,
            width,
            size: (width as usize) * (height as usize),
        }
    }

    /// Candidate neighbor indices of `index`, in table order.
    ///
    /// Emits `j = index + d` when `j > 0` and `j` is in bounds. Under the
    /// `wrap-check` feature, candidates whose column delta does not match
    /// the offset are dropped as row wraparounds; without it the caller
    /// relies on border lethality and the heuristic to starve them.
    pub fn neighbors<'s>(&'s self, index: u32) -> impl Iterator<Item = u32> + 's {
        let size = self.size;
        #[cfg(feature = "wrap-check")]
        let from_col = (index % self.width) as i32;
        self.offsets.iter().filter_map(move |offset| {
            let j = index as i64 + offset.di;
            if j <= 0 || j as usize >= size {
                return None;
            }
            #[cfg(feature = "wrap-check")]
            {
                let to_col = ((j as u32) % self.width) as i32;
                if to_col - from_col != offset.dx {
                    return None;
                }
            }
            Some(j as u32)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "von_neumann".parse::<Neighborhood>().unwrap(),
            Neighborhood::VonNeumann
        );
        assert_eq!("moore".parse::<Neighborhood>().unwrap(), Neighborhood::Moore);
        assert!(matches!(
            "hexagonal".parse::<Neighborhood>(),
            Err(PlannerError::InvalidNeighborhood(_))
        ));
    }

    #[test]
    fn test_von_neumann_interior() {
        let table = OffsetTable::new(5, 5, Neighborhood::VonNeumann);
        let neighbors: Vec<u32> = table.neighbors(12).collect();
        assert_eq!(neighbors, vec![11, 13, 7, 17]);
    }

    #[test]
    fn test_moore_interior_cardinals_first() {
        let table = OffsetTable::new(5, 5, Neighborhood::Moore);
        let neighbors: Vec<u32> = table.neighbors(12).collect();
        assert_eq!(neighbors, vec![11, 13, 7, 17, 6, 8, 16, 18]);
    }

    #[test]
    fn test_bounds_clip_low_and_high() {
        let table = OffsetTable::new(5, 5, Neighborhood::VonNeumann);
        // Index 1: -W lands negative, -1 lands on 0 which is excluded by j > 0.
        let low: Vec<u32> = table.neighbors(1).collect();
        assert_eq!(low, vec![2, 6]);
        // Index 23: +W lands past the end.
        let high: Vec<u32> = table.neighbors(23).collect();
        assert_eq!(high, vec![22, 24, 18]);
    }

    #[cfg(feature = "wrap-check")]
    #[test]
    fn test_wrap_check_drops_row_crossings() {
        let table = OffsetTable::new(5, 5, Neighborhood::Moore);
        // (4, 0): +1 and the +1-column diagonals would wrap to column 0.
        let neighbors: Vec<u32> = table.neighbors(4).collect();
        assert_eq!(neighbors, vec![3, 9, 8]);
        // (0, 2): -1 and the -1-column diagonals would wrap to column 4.
        let neighbors: Vec<u32> = table.neighbors(10).collect();
        assert_eq!(neighbors, vec![11, 5, 15, 6, 16]);
    }
}
