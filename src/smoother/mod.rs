//! Gradient path smoothing.
//!
//! The smoother refines a discrete search path into a continuous
//! trajectory by minimizing a weighted objective over the flattened point
//! chain; see [`cost_function::SmootherCostFunction`] for the terms. The
//! cost function only defines the objective; any first-order minimizer
//! honoring [`FirstOrderProblem`] can drive it, [`descent::minimize`]
//! being the one shipped here.

mod cost_function;
mod costmap_gradient;
pub mod descent;

pub use cost_function::SmootherCostFunction;
pub use costmap_gradient::costmap_gradient;
pub use descent::{minimize, DescentResult};

use log::debug;

use crate::config::{DescentConfig, SmootherParams};
use crate::core::{CancelToken, CellPoint};
use crate::costmap::CostmapView;
use crate::error::Result;

/// Objective with analytic first derivatives, as consumed by a
/// first-order unconstrained minimizer.
pub trait FirstOrderProblem {
    /// Length of the parameter vector.
    fn num_parameters(&self) -> usize;

    /// Evaluate cost and gradient at `parameters`. Both output slices are
    /// fully overwritten.
    fn evaluate(&self, parameters: &[f64], cost: &mut f64, gradient: &mut [f64]) -> Result<()>;
}

/// Interleave a point chain into a parameter vector `[x0, y0, x1, y1, …]`.
pub fn flatten_path(points: &[CellPoint]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

/// Rebuild a point chain from an interleaved parameter vector.
pub fn unflatten_path(parameters: &[f64]) -> Vec<CellPoint> {
    parameters
        .chunks_exact(2)
        .map(|xy| CellPoint::new(xy[0], xy[1]))
        .collect()
}

/// Smooth a lifted path against a costmap.
///
/// Builds the cost function, runs the descent driver, and returns the
/// refined chain. Endpoints come back exactly equal to the input: their
/// gradient entries are pinned to zero, so no step ever moves them. Paths
/// with fewer than three points have no interior and are returned as-is.
pub fn smooth_path<C: CostmapView>(
    costmap: &C,
    path: &[CellPoint],
    params: &SmootherParams,
    descent: &DescentConfig,
    cancel: Option<&CancelToken>,
) -> Result<Vec<CellPoint>> {
    if path.len() < 3 {
        return Ok(path.to_vec());
    }

    let function = SmootherCostFunction::new(path, costmap, params.clone(), cancel);
    let initial = flatten_path(path);
    let result = minimize(&function, &initial, descent)?;

    debug!(
        "[smoother] {} points, cost={:.6}, iterations={}, converged={}",
        path.len(),
        result.cost,
        result.iterations,
        result.converged
    );

    Ok(unflatten_path(&result.parameters))
}
