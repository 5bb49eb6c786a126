//! Finite-difference costmap gradient for the avoidance term.

use crate::core::CellPoint;
use crate::costmap::CostmapView;

/// Unit direction of steepest costmap ascent at `(mx, my)`.
///
/// Samples up to three cells along each axis and applies the seven-point
/// symmetric stencil `(45·s1 − 9·s2 + s3 − 45·s1' + 9·s2' − s3') / 60`;
/// out-of-bounds samples default to 0. The x component comes from the
/// right/left samples and the y component from the up/down samples, with
/// `+y` toward increasing row index. The result is normalized: it carries
/// direction only, the magnitude lives in the residual's common prefix.
/// Degenerate (flat) neighborhoods return the zero vector.
pub fn costmap_gradient<C: CostmapView>(costmap: &C, mx: u32, my: u32) -> CellPoint {
    let size_x = costmap.size_x() as i64;
    let size_y = costmap.size_y() as i64;
    let sample = |x: i64, y: i64| -> f64 {
        if x >= 0 && y >= 0 && x < size_x && y < size_y {
            costmap.get_cost(x as u32, y as u32) as f64
        } else {
            0.0
        }
    };

    let mx = mx as i64;
    let my = my as i64;

    let right = [sample(mx + 1, my), sample(mx + 2, my), sample(mx + 3, my)];
    let left = [sample(mx - 1, my), sample(mx - 2, my), sample(mx - 3, my)];
    let up = [sample(mx, my + 1), sample(mx, my + 2), sample(mx, my + 3)];
    let down = [sample(mx, my - 1), sample(mx, my - 2), sample(mx, my - 3)];

    let dx = (45.0 * right[0] - 9.0 * right[1] + right[2] - 45.0 * left[0] + 9.0 * left[1]
        - left[2])
        / 60.0;
    let dy = (45.0 * up[0] - 9.0 * up[1] + up[2] - 45.0 * down[0] + 9.0 * down[1] - down[2]) / 60.0;

    let gradient = CellPoint::new(dx, dy);
    let norm = gradient.norm();
    if norm < 1e-12 {
        return CellPoint::ZERO;
    }
    gradient * (1.0 / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costmap::Costmap;
    use approx::assert_relative_eq;

    /// c(x, y) = x, so the true gradient is (1, 0) everywhere.
    fn x_ramp(size: u32) -> Costmap {
        let mut map = Costmap::new(size, size, 1.0, 0.0, 0.0);
        for y in 0..size {
            for x in 0..size {
                map.set_cost(x, y, x as u8);
            }
        }
        map
    }

    #[test]
    fn test_ramp_gradient_away_from_border() {
        let map = x_ramp(9);
        let gradient = costmap_gradient(&map, 4, 4);
        assert_relative_eq!(gradient.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(gradient.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unnormalized_stencil_on_ramp_is_one() {
        // Check the raw stencil before normalization: on c(x) = x the x
        // stencil sums to exactly 60/60.
        let map = x_ramp(9);
        let s = |x: u32| map.get_cost(x, 4) as f64;
        let dx =
            (45.0 * s(5) - 9.0 * s(6) + s(7) - 45.0 * s(3) + 9.0 * s(2) - s(1)) / 60.0;
        assert_relative_eq!(dx, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_border_samples_default_to_zero() {
        let map = x_ramp(9);
        let gradient = costmap_gradient(&map, 0, 0);
        assert!(gradient.is_finite());
        // Missing left samples read 0, the right samples still see the ramp.
        assert!(gradient.x > 0.0);
    }

    #[test]
    fn test_flat_map_has_zero_gradient() {
        let map = Costmap::new(9, 9, 1.0, 0.0, 0.0);
        assert_eq!(costmap_gradient(&map, 4, 4), CellPoint::ZERO);
    }
}
