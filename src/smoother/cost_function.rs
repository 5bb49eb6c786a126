//! Multi-term smoother objective and its analytic gradient.
//!
//! The parameter vector interleaves the path points as
//! `[x0, y0, x1, y1, …]`. Endpoints are held fixed: they contribute no
//! residual and their gradient entries stay zero. Each interior point adds
//! four weighted terms: second-difference smoothness, a one-sided quadratic
//! curvature penalty above `max_curvature`, costmap avoidance, and
//! deviation from the original path.

use log::debug;

use crate::config::SmootherParams;
use crate::core::{CancelToken, CellPoint};
use crate::costmap::{cost_codes, CostmapView};
use crate::error::{PlannerError, Result};

use super::costmap_gradient;
use super::FirstOrderProblem;

const EPSILON: f64 = 1e-4;

/// Cached intermediates shared by the curvature residual and Jacobian.
///
/// Both passes must agree on whether the triplet contributes; the `valid`
/// flag carries that decision from the residual to the Jacobian. Degenerate
/// segments and in-bound curvatures set it false, which is the expected
/// shape of a one-sided penalty, not an error.
#[derive(Debug, Default)]
struct CurvatureTerms {
    valid: bool,
    delta_norm: f64,
    delta_p_norm: f64,
    phi: f64,
    slack: f64,
}

/// Smoother cost function over a flattened point chain.
///
/// Borrows the original path read-only as the deviation anchor. Any
/// first-order minimizer honoring [`FirstOrderProblem`] may drive it; the
/// function owns no iteration limits or line search.
pub struct SmootherCostFunction<'a, C: CostmapView> {
    original_path: &'a [CellPoint],
    costmap: &'a C,
    params: SmootherParams,
    cancel: Option<&'a CancelToken>,
}

impl<'a, C: CostmapView> SmootherCostFunction<'a, C> {
    /// Create a cost function anchored to `original_path`.
    pub fn new(
        original_path: &'a [CellPoint],
        costmap: &'a C,
        params: SmootherParams,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        Self {
            original_path,
            costmap,
            params,
            cancel,
        }
    }
}

impl<C: CostmapView> FirstOrderProblem for SmootherCostFunction<'_, C> {
    fn num_parameters(&self) -> usize {
        2 * self.original_path.len()
    }

    fn evaluate(&self, parameters: &[f64], cost: &mut f64, gradient: &mut [f64]) -> Result<()> {
        debug_assert_eq!(parameters.len(), self.num_parameters());
        debug_assert_eq!(gradient.len(), self.num_parameters());

        if let Some(token) = self.cancel {
            if token.is_cancelled() {
                return Err(PlannerError::Cancelled);
            }
        }

        let n = self.original_path.len();
        let mut total = 0.0;

        for i in 0..n {
            let x_index = 2 * i;
            let y_index = 2 * i + 1;
            gradient[x_index] = 0.0;
            gradient[y_index] = 0.0;
            if i < 1 || i >= n - 1 {
                continue;
            }

            let xi = CellPoint::new(parameters[x_index], parameters[y_index]);
            let xi_p = CellPoint::new(parameters[x_index + 2], parameters[y_index + 2]);
            let xi_m = CellPoint::new(parameters[x_index - 2], parameters[y_index - 2]);
            let original = self.original_path[i];

            let mut curvature = CurvatureTerms::default();

            add_smoothing_residual(self.params.smooth_weight, xi, xi_p, xi_m, &mut total);
            add_curvature_residual(
                self.params.curvature_weight,
                self.params.max_curvature,
                xi,
                xi_p,
                xi_m,
                &mut curvature,
                &mut total,
            );
            add_distance_residual(self.params.distance_weight, xi, original, &mut total);

            let cell = self.costmap.world_to_map(xi.x, xi.y);
            let cell_cost = cell.map(|(mx, my)| self.costmap.get_cost(mx, my) as f64);
            if let Some(value) = cell_cost {
                add_cost_residual(self.params.costmap_weight, value, &mut total);
            }

            let mut grad = CellPoint::ZERO;
            add_smoothing_jacobian(self.params.smooth_weight, xi, xi_p, xi_m, &mut grad);
            add_curvature_jacobian(self.params.curvature_weight, xi, xi_p, &curvature, &mut grad);
            add_distance_jacobian(self.params.distance_weight, xi, original, &mut grad);
            if let (Some((mx, my)), Some(value)) = (cell, cell_cost) {
                add_cost_jacobian(
                    self.params.costmap_weight,
                    self.costmap,
                    mx,
                    my,
                    value,
                    &mut grad,
                );
            }

            gradient[x_index] = grad.x;
            gradient[y_index] = grad.y;
        }

        if !total.is_finite() || gradient.iter().any(|g| !g.is_finite()) {
            debug!("[smoother] cost or gradient went non-finite");
            return Err(PlannerError::SmootherDiverged);
        }

        *cost = total;
        Ok(())
    }
}

/// Second-difference smoothness residual, in expanded dot-product form.
fn add_smoothing_residual(
    weight: f64,
    pt: CellPoint,
    pt_p: CellPoint,
    pt_m: CellPoint,
    r: &mut f64,
) {
    *r += weight
        * (pt_p.dot(pt_p) - 4.0 * pt_p.dot(pt) + 2.0 * pt_p.dot(pt_m) + 4.0 * pt.dot(pt)
            - 4.0 * pt.dot(pt_m)
            + pt_m.dot(pt_m));
}

fn add_smoothing_jacobian(
    weight: f64,
    pt: CellPoint,
    pt_p: CellPoint,
    pt_m: CellPoint,
    j: &mut CellPoint,
) {
    *j += (pt_m * -4.0 + pt * 8.0 + pt_p * -4.0) * weight;
}

/// One-sided quadratic curvature penalty. Fills the shared cache; the
/// residual only applies when the local curvature exceeds the bound.
fn add_curvature_residual(
    weight: f64,
    max_curvature: f64,
    pt: CellPoint,
    pt_p: CellPoint,
    pt_m: CellPoint,
    terms: &mut CurvatureTerms,
    r: &mut f64,
) {
    terms.valid = true;
    let delta = pt - pt_m;
    let delta_p = pt_p - pt;
    terms.delta_norm = delta.norm();
    terms.delta_p_norm = delta_p.norm();

    if terms.delta_norm < EPSILON
        || terms.delta_p_norm < EPSILON
        || !terms.delta_norm.is_finite()
        || !terms.delta_p_norm.is_finite()
    {
        terms.valid = false;
        return;
    }

    let mut projection = delta.dot(delta_p) / (terms.delta_norm * terms.delta_p_norm);
    // acos blows up at ±1; clamp the near-collinear cases.
    if (1.0 - projection).abs() < EPSILON || (projection + 1.0).abs() < EPSILON {
        projection = 1.0;
    }

    terms.phi = projection.acos();
    let kappa = terms.phi / terms.delta_norm;
    terms.slack = kappa - max_curvature;

    if terms.slack <= EPSILON {
        terms.valid = false;
        return;
    }

    *r += weight * terms.slack * terms.slack;
}

/// Analytic curvature Jacobian from the cached residual intermediates.
fn add_curvature_jacobian(
    weight: f64,
    pt: CellPoint,
    pt_p: CellPoint,
    terms: &CurvatureTerms,
    j: &mut CellPoint,
) {
    if !terms.valid {
        return;
    }

    let cos_phi = terms.phi.cos();
    let d_phi = -1.0 / (1.0 - cos_phi * cos_phi).sqrt();
    let ones = CellPoint::new(1.0, 1.0);
    let neg_pt_p = -pt_p;
    let p1 =
        normalized_orthogonal_complement(pt, neg_pt_p, terms.delta_norm, terms.delta_p_norm);
    let p2 =
        normalized_orthogonal_complement(neg_pt_p, pt, terms.delta_p_norm, terms.delta_norm);

    let u = 2.0 * terms.slack;
    let prefix = (-1.0 / terms.delta_norm) * d_phi;
    let suffix = terms.phi / (terms.delta_norm * terms.delta_norm);

    let jacobian = ((-p1 - p2) * prefix - ones * suffix) * u;
    let jacobian_m1 = (p2 * prefix - ones * suffix) * u;
    let jacobian_p1 = p1 * prefix * u;

    *j += (jacobian_m1 - jacobian * 2.0 + jacobian_p1) * weight;
}

/// Deviation from the original path.
fn add_distance_residual(weight: f64, xi: CellPoint, original: CellPoint, r: &mut f64) {
    *r += weight * (xi - original).squared_norm();
}

fn add_distance_jacobian(weight: f64, xi: CellPoint, original: CellPoint, j: &mut CellPoint) {
    *j += (xi - original) * (2.0 * weight);
}

/// Costmap-avoidance residual. Free and unknown cells exert no force.
///
/// Keeps the upstream negative-coefficient form: `(c − MAX_NON_OBSTACLE)²`
/// grows as the cell cost falls, so the negated term rewards moving into
/// lower-cost cells while its gradient pushes down the costmap field.
fn add_cost_residual(weight: f64, value: f64, r: &mut f64) {
    if value == cost_codes::FREE as f64 || value == cost_codes::UNKNOWN as f64 {
        return;
    }
    *r += -1.0 * weight * (value - cost_codes::MAX_NON_OBSTACLE as f64).powi(2);
}

fn add_cost_jacobian<C: CostmapView>(
    weight: f64,
    costmap: &C,
    mx: u32,
    my: u32,
    value: f64,
    j: &mut CellPoint,
) {
    if value == cost_codes::FREE as f64 || value == cost_codes::UNKNOWN as f64 {
        return;
    }
    let grad = costmap_gradient(costmap, mx, my);
    let prefix = -2.0 * weight * (value - cost_codes::MAX_NON_OBSTACLE as f64);
    j.x += prefix * grad.x;
    j.y += prefix * grad.y;
}

/// Projection of `a` onto the plane normal to `b`, divided by both norms:
/// `(a − b·(a·b)/(b·b)) / (|a|·|b|)`.
fn normalized_orthogonal_complement(
    a: CellPoint,
    b: CellPoint,
    a_norm: f64,
    b_norm: f64,
) -> CellPoint {
    (a - b * (a.dot(b) / b.squared_norm())) * (1.0 / (a_norm * b_norm))
}
