//! A* search over the pooled node graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::config::SearchConfig;
use crate::core::{CancelToken, GridCell};
use crate::costmap::{is_traversable, CostmapView};
use crate::error::{PlannerError, Result};

use super::neighborhood::OffsetTable;
use super::node::NodePool;

/// Open-set entry. Stale entries are left behind on relaxation and
/// skipped on pop via the node's `was_visited` flag.
#[derive(Debug)]
struct OpenEntry {
    f: f32,
    sequence: u64,
    index: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; equal f resolves to the
        // earlier insertion so pop order is deterministic.
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search engine over a costmap view.
///
/// The node pool and neighborhood table are owned by the engine and live
/// for as long as the costmap borrow; repeated [`GridSearch::search`] calls
/// reuse the pool, resetting only the cells the previous episode touched.
/// State is episode-local; run parallel searches on separate engines.
pub struct GridSearch<'a, C: CostmapView> {
    costmap: &'a C,
    config: SearchConfig,
    offsets: OffsetTable,
    pool: NodePool,
    expansions: usize,
}

impl<'a, C: CostmapView> GridSearch<'a, C> {
    /// Create an engine sized to the costmap.
    pub fn new(costmap: &'a C, config: SearchConfig) -> Self {
        let width = costmap.size_x();
        let height = costmap.size_y();
        let offsets = OffsetTable::new(width, height, config.neighborhood);
        let pool = NodePool::new((width as usize) * (height as usize));
        Self {
            costmap,
            config,
            offsets,
            pool,
            expansions: 0,
        }
    }

    /// Nodes expanded by the most recent search.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Find a minimum-cost path from `start` to `goal`.
    ///
    /// Returns the path as flat cell indices, start first. The costmap must
    /// not change between construction and the end of the search.
    pub fn search(
        &mut self,
        start: GridCell,
        goal: GridCell,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<u32>> {
        let width = self.costmap.size_x();
        let height = self.costmap.size_y();

        trace!(
            "[search] start=({},{}) goal=({},{})",
            start.x,
            start.y,
            goal.x,
            goal.y
        );

        if start.x >= width || start.y >= height || goal.x >= width || goal.y >= height {
            debug!("[search] FAILED: start or goal outside the grid");
            return Err(PlannerError::StartOrGoalInvalid);
        }

        let start_cost = self.costmap.get_cost(start.x, start.y);
        let goal_cost = self.costmap.get_cost(goal.x, goal.y);
        let traverse_unknown = self.config.traverse_unknown;
        if !is_traversable(start_cost, traverse_unknown)
            || !is_traversable(goal_cost, traverse_unknown)
        {
            debug!("[search] FAILED: start or goal not traversable");
            return Err(PlannerError::StartOrGoalInvalid);
        }

        self.pool.begin_episode();
        self.expansions = 0;

        let start_index = start.to_index(width);
        let goal_index = goal.to_index(width);
        if start_index == goal_index {
            return Ok(vec![start_index]);
        }

        let neutral_cost = self.config.neutral_cost;
        let max_iterations = self.config.max_iterations;
        let costmap = self.costmap;
        let pool = &mut self.pool;
        let offsets = &self.offsets;

        {
            let node = pool.activate(start_index, start_cost);
            node.accumulated = 0.0;
            node.is_queued = true;
        }

        let mut open = BinaryHeap::new();
        let mut sequence: u64 = 0;
        open.push(OpenEntry {
            f: heuristic(start_index, goal, width, neutral_cost),
            sequence,
            index: start_index,
        });

        let mut expansions = 0usize;

        while let Some(entry) = open.pop() {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    debug!("[search] cancelled after {} expansions", expansions);
                    self.expansions = expansions;
                    return Err(PlannerError::Cancelled);
                }
            }

            expansions += 1;
            if expansions > max_iterations {
                debug!("[search] FAILED: iteration limit {} exceeded", max_iterations);
                self.expansions = expansions;
                return Err(PlannerError::IterationLimitExceeded(max_iterations));
            }

            let u = entry.index;

            if u == goal_index {
                let path = backtrack(pool, goal_index);
                trace!(
                    "[search] SUCCESS: {} cells, {} expansions",
                    path.len(),
                    expansions
                );
                self.expansions = expansions;
                return Ok(path);
            }

            // Stale queue entry for an already-closed node.
            if pool.get(u).map_or(false, |n| n.was_visited) {
                continue;
            }
            pool.visit(u);

            let g_u = pool.get(u).map_or(f32::MAX, |n| n.accumulated);

            for j in offsets.neighbors(u) {
                let cell = GridCell::from_index(j, width);
                let cost = costmap.get_cost(cell.x, cell.y);

                let node = pool.activate(j, cost);
                if node.was_visited {
                    continue;
                }
                if !is_traversable(node.cell_cost, traverse_unknown) {
                    continue;
                }

                let tentative = g_u + neutral_cost + node.cell_cost as f32;
                if tentative < node.accumulated {
                    node.accumulated = tentative;
                    node.parent = Some(u);
                    node.is_queued = true;
                    sequence += 1;
                    open.push(OpenEntry {
                        f: tentative + heuristic(j, goal, width, neutral_cost),
                        sequence,
                        index: j,
                    });
                }
            }
        }

        debug!("[search] FAILED: open set empty after {} expansions", expansions);
        self.expansions = expansions;
        Err(PlannerError::NoPathFound)
    }
}

/// Euclidean distance to the goal scaled by the neutral cost. Matches the
/// additive transition cost's flat scaling; diagonals carry no √2 factor.
#[inline]
fn heuristic(index: u32, goal: GridCell, width: u32, neutral_cost: f32) -> f32 {
    GridCell::from_index(index, width).distance(goal) * neutral_cost
}

/// Reconstruct the start→goal index sequence by chasing parents.
fn backtrack(pool: &NodePool, goal_index: u32) -> Vec<u32> {
    let mut path = Vec::new();
    let mut current = goal_index;
    loop {
        path.push(current);
        match pool.get(current).and_then(|n| n.parent) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costmap::{cost_codes, Costmap};

    fn free_map(size: u32) -> Costmap {
        Costmap::new(size, size, 1.0, 0.0, 0.0)
    }

    #[test]
    fn test_start_equals_goal() {
        let map = free_map(5);
        let mut search = GridSearch::new(&map, SearchConfig::default());
        let path = search
            .search(GridCell::new(2, 2), GridCell::new(2, 2), None)
            .unwrap();
        assert_eq!(path, vec![12]);
    }

    #[test]
    fn test_invalid_start_rejected() {
        let mut map = free_map(5);
        map.set_cost(1, 1, cost_codes::OCCUPIED);
        let mut search = GridSearch::new(&map, SearchConfig::default());
        let err = search
            .search(GridCell::new(1, 1), GridCell::new(4, 4), None)
            .unwrap_err();
        assert_eq!(err, PlannerError::StartOrGoalInvalid);
    }

    #[test]
    fn test_out_of_bounds_goal_rejected() {
        let map = free_map(5);
        let mut search = GridSearch::new(&map, SearchConfig::default());
        let err = search
            .search(GridCell::new(0, 0), GridCell::new(5, 0), None)
            .unwrap_err();
        assert_eq!(err, PlannerError::StartOrGoalInvalid);
    }

    #[test]
    fn test_unknown_goal_requires_flag() {
        let mut map = free_map(5);
        map.set_cost(4, 4, cost_codes::UNKNOWN);

        let mut search = GridSearch::new(&map, SearchConfig::default());
        assert_eq!(
            search
                .search(GridCell::new(0, 0), GridCell::new(4, 4), None)
                .unwrap_err(),
            PlannerError::StartOrGoalInvalid
        );

        let config = SearchConfig {
            traverse_unknown: true,
            ..Default::default()
        };
        let mut search = GridSearch::new(&map, config);
        assert!(search
            .search(GridCell::new(0, 0), GridCell::new(4, 4), None)
            .is_ok());
    }

    #[test]
    fn test_iteration_limit() {
        let map = free_map(10);
        let config = SearchConfig {
            max_iterations: 3,
            ..Default::default()
        };
        let mut search = GridSearch::new(&map, config);
        let err = search
            .search(GridCell::new(0, 0), GridCell::new(9, 9), None)
            .unwrap_err();
        assert_eq!(err, PlannerError::IterationLimitExceeded(3));
    }

    #[test]
    fn test_cancellation() {
        let map = free_map(10);
        let token = CancelToken::new();
        token.cancel();
        let mut search = GridSearch::new(&map, SearchConfig::default());
        let err = search
            .search(GridCell::new(0, 0), GridCell::new(9, 9), Some(&token))
            .unwrap_err();
        assert_eq!(err, PlannerError::Cancelled);
    }

    #[test]
    fn test_no_path_out_of_enclosure() {
        let mut map = free_map(7);
        // Ring of obstacles around the start.
        for d in 0..=2u32 {
            map.set_cost(1 + d, 1, cost_codes::OCCUPIED);
            map.set_cost(1 + d, 3, cost_codes::OCCUPIED);
            map.set_cost(1, 1 + d, cost_codes::OCCUPIED);
            map.set_cost(3, 1 + d, cost_codes::OCCUPIED);
        }
        let mut search = GridSearch::new(&map, SearchConfig::default());
        let err = search
            .search(GridCell::new(2, 2), GridCell::new(6, 6), None)
            .unwrap_err();
        assert_eq!(err, PlannerError::NoPathFound);
    }

    #[test]
    fn test_repeat_search_is_identical() {
        let mut map = free_map(8);
        map.set_cost(4, 3, cost_codes::OCCUPIED);
        map.set_cost(4, 4, cost_codes::OCCUPIED);
        let mut search = GridSearch::new(&map, SearchConfig::default());

        let first = search
            .search(GridCell::new(0, 4), GridCell::new(7, 4), None)
            .unwrap();
        let second = search
            .search(GridCell::new(0, 4), GridCell::new(7, 4), None)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_von_neumann_path_is_cardinal() {
        let map = free_map(5);
        let config = SearchConfig {
            neighborhood: crate::search::Neighborhood::VonNeumann,
            ..Default::default()
        };
        let mut search = GridSearch::new(&map, config);
        let path = search
            .search(GridCell::new(0, 0), GridCell::new(2, 2), None)
            .unwrap();
        // Each step changes exactly one coordinate by one.
        for pair in path.windows(2) {
            let a = GridCell::from_index(pair[0], 5);
            let b = GridCell::from_index(pair[1], 5);
            let dx = (a.x as i32 - b.x as i32).abs();
            let dy = (a.y as i32 - b.y as i32).abs();
            assert_eq!(dx + dy, 1);
        }
        assert_eq!(path.len(), 5);
    }
}
