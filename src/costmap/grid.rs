//! Owned costmap backed by a flat `u8` grid, with obstacle inflation.

use std::collections::VecDeque;

use super::{cost_codes, CostmapView};

/// Owned costmap with a world↔map coordinate mapping.
///
/// Cell `(mx, my)` covers the square from `origin + m·resolution` to
/// `origin + (m+1)·resolution`; `map_to_world` returns cell centers.
/// With `resolution = 1.0` and a zero origin, world and cell units coincide.
#[derive(Clone, Debug)]
pub struct Costmap {
    width: u32,
    height: u32,
    resolution: f64,
    origin_x: f64,
    origin_y: f64,
    cells: Vec<u8>,
}

impl Costmap {
    /// Create a costmap with every cell `FREE`.
    pub fn new(width: u32, height: u32, resolution: f64, origin_x: f64, origin_y: f64) -> Self {
        Self {
            width,
            height,
            resolution,
            origin_x,
            origin_y,
            cells: vec![cost_codes::FREE; (width as usize) * (height as usize)],
        }
    }

    /// Create a costmap from existing row-major cell data.
    ///
    /// # Panics
    /// Panics if `cells.len() != width * height`.
    pub fn from_cells(
        width: u32,
        height: u32,
        resolution: f64,
        origin_x: f64,
        origin_y: f64,
        cells: Vec<u8>,
    ) -> Self {
        assert_eq!(cells.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            resolution,
            origin_x,
            origin_y,
            cells,
        }
    }

    /// Resolution in world units per cell.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Write a cell cost.
    #[inline]
    pub fn set_cost(&mut self, mx: u32, my: u32, cost: u8) {
        let idx = (my as usize) * (self.width as usize) + mx as usize;
        self.cells[idx] = cost;
    }

    /// World coordinates of a cell center.
    #[inline]
    pub fn map_to_world(&self, mx: u32, my: u32) -> (f64, f64) {
        (
            self.origin_x + (mx as f64 + 0.5) * self.resolution,
            self.origin_y + (my as f64 + 0.5) * self.resolution,
        )
    }

    /// Inflate obstacles into the surrounding cells.
    ///
    /// Runs a Brushfire pass from every `OCCUPIED` cell, then rewrites
    /// traversable cells by distance (in cells): within `inscribed_radius`
    /// the cell becomes `INSCRIBED`; within `inflation_radius` it gets a
    /// traversal cost decaying linearly from `MAX_NON_OBSTACLE` down to 1.
    /// `OCCUPIED` and `UNKNOWN` cells are left untouched.
    pub fn inflate(&mut self, inscribed_radius: f64, inflation_radius: f64) {
        let distances = self.obstacle_distances();

        for (idx, cell) in self.cells.iter_mut().enumerate() {
            if *cell == cost_codes::OCCUPIED || *cell == cost_codes::UNKNOWN {
                continue;
            }
            let d = distances[idx] as f64;
            if d <= inscribed_radius {
                *cell = cost_codes::INSCRIBED;
            } else if d <= inflation_radius {
                let ratio = 1.0 - (d - inscribed_radius) / (inflation_radius - inscribed_radius);
                let cost = (cost_codes::MAX_NON_OBSTACLE as f64 * ratio.max(0.0)) as u8;
                *cell = cost.max(1);
            }
        }
    }

    /// Distance in cells from every cell to the nearest `OCCUPIED` cell,
    /// via Brushfire (BFS wavefront) over the 8-connected grid.
    fn obstacle_distances(&self) -> Vec<f32> {
        let width = self.width as i64;
        let height = self.height as i64;
        let mut distances = vec![f32::MAX; self.cells.len()];
        let mut queue = VecDeque::new();

        for (idx, &cell) in self.cells.iter().enumerate() {
            if cell == cost_codes::OCCUPIED {
                distances[idx] = 0.0;
                queue.push_back(((idx as i64) % width, (idx as i64) / width));
            }
        }

        let sqrt2 = std::f32::consts::SQRT_2;
        let neighbors = [
            (-1, 0, 1.0),
            (1, 0, 1.0),
            (0, -1, 1.0),
            (0, 1, 1.0),
            (-1, -1, sqrt2),
            (1, -1, sqrt2),
            (-1, 1, sqrt2),
            (1, 1, sqrt2),
        ];

        while let Some((x, y)) = queue.pop_front() {
            let current = distances[(y * width + x) as usize];

            for &(dx, dy, step) in &neighbors {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= width || ny >= height {
                    continue;
                }
                let idx = (ny * width + nx) as usize;
                let candidate = current + step;
                if candidate < distances[idx] {
                    distances[idx] = candidate;
                    queue.push_back((nx, ny));
                }
            }
        }

        distances
    }
}

impl CostmapView for Costmap {
    #[inline]
    fn size_x(&self) -> u32 {
        self.width
    }

    #[inline]
    fn size_y(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get_cost(&self, mx: u32, my: u32) -> u8 {
        self.cells[(my as usize) * (self.width as usize) + mx as usize]
    }

    #[inline]
    fn world_to_map(&self, wx: f64, wy: f64) -> Option<(u32, u32)> {
        let mx = ((wx - self.origin_x) / self.resolution).floor();
        let my = ((wy - self.origin_y) / self.resolution).floor();
        if mx < 0.0 || my < 0.0 || mx >= self.width as f64 || my >= self.height as f64 {
            return None;
        }
        Some((mx as u32, my as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled_map() -> Costmap {
        let mut map = Costmap::new(20, 20, 1.0, 0.0, 0.0);
        for x in 5..15 {
            map.set_cost(x, 10, cost_codes::OCCUPIED);
        }
        map
    }

    #[test]
    fn test_world_to_map_bounds() {
        let map = Costmap::new(10, 10, 0.5, -1.0, -1.0);
        assert_eq!(map.world_to_map(-1.0, -1.0), Some((0, 0)));
        assert_eq!(map.world_to_map(3.9, 3.9), Some((9, 9)));
        assert_eq!(map.world_to_map(4.1, 0.0), None);
        assert_eq!(map.world_to_map(-1.1, 0.0), None);
    }

    #[test]
    fn test_map_to_world_is_cell_center() {
        let map = Costmap::new(10, 10, 0.5, -1.0, -1.0);
        let (wx, wy) = map.map_to_world(0, 0);
        assert_eq!((wx, wy), (-0.75, -0.75));
        assert_eq!(map.world_to_map(wx, wy), Some((0, 0)));
    }

    #[test]
    fn test_inflate_bands() {
        let mut map = walled_map();
        map.inflate(1.5, 4.0);

        // Wall itself stays lethal.
        assert_eq!(map.get_cost(10, 10), cost_codes::OCCUPIED);
        // Adjacent cell is inside the inscribed radius.
        assert_eq!(map.get_cost(10, 9), cost_codes::INSCRIBED);
        // A cell in the decay band carries an ordinary traversal cost.
        let band = map.get_cost(10, 7);
        assert!(band >= 1 && band <= cost_codes::MAX_NON_OBSTACLE);
        // Far away stays free.
        assert_eq!(map.get_cost(10, 0), cost_codes::FREE);
    }

    #[test]
    fn test_inflate_leaves_unknown() {
        let mut map = walled_map();
        map.set_cost(10, 9, cost_codes::UNKNOWN);
        map.inflate(1.5, 4.0);
        assert_eq!(map.get_cost(10, 9), cost_codes::UNKNOWN);
    }

    #[test]
    fn test_inflation_cost_decays_with_distance() {
        let mut map = walled_map();
        map.inflate(1.0, 6.0);
        let near = map.get_cost(10, 8);
        let far = map.get_cost(10, 5);
        assert!(near > far, "near={} far={}", near, far);
    }
}
