//! Configuration types for search, smoothing, and the descent driver.

use serde::{Deserialize, Serialize};

use crate::search::Neighborhood;

mod defaults {
    use crate::search::Neighborhood;

    pub fn neighborhood() -> Neighborhood {
        Neighborhood::Moore
    }
    pub fn max_iterations() -> usize {
        100_000
    }
    pub fn neutral_cost() -> f32 {
        50.0
    }
    pub fn smooth_weight() -> f64 {
        1.0
    }
    pub fn curvature_weight() -> f64 {
        1.5
    }
    pub fn costmap_weight() -> f64 {
        0.025
    }
    pub fn distance_weight() -> f64 {
        0.2
    }
    pub fn max_curvature() -> f64 {
        1.0
    }
    pub fn descent_iterations() -> usize {
        500
    }
    pub fn initial_step() -> f64 {
        0.1
    }
    pub fn step_grow() -> f64 {
        1.5
    }
    pub fn step_shrink() -> f64 {
        0.5
    }
    pub fn min_step() -> f64 {
        1e-10
    }
    pub fn max_step() -> f64 {
        1.0
    }
    pub fn gradient_tolerance() -> f64 {
        1e-6
    }
}

/// A* search settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Connectivity of the expansion neighborhood
    #[serde(default = "defaults::neighborhood")]
    pub neighborhood: Neighborhood,

    /// Allow expansion through UNKNOWN cells
    #[serde(default)]
    pub traverse_unknown: bool,

    /// Maximum node expansions before giving up
    #[serde(default = "defaults::max_iterations")]
    pub max_iterations: usize,

    /// Baseline per-step cost; also scales the heuristic
    #[serde(default = "defaults::neutral_cost")]
    pub neutral_cost: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            neighborhood: defaults::neighborhood(),
            traverse_unknown: false,
            max_iterations: defaults::max_iterations(),
            neutral_cost: defaults::neutral_cost(),
        }
    }
}

/// Weights and curvature bound for the smoother cost function.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SmootherParams {
    /// Weight of the second-difference smoothness term
    #[serde(default = "defaults::smooth_weight")]
    pub smooth_weight: f64,

    /// Weight of the one-sided curvature penalty
    #[serde(default = "defaults::curvature_weight")]
    pub curvature_weight: f64,

    /// Weight of the costmap-avoidance term
    #[serde(default = "defaults::costmap_weight")]
    pub costmap_weight: f64,

    /// Weight of the deviation-from-original term
    #[serde(default = "defaults::distance_weight")]
    pub distance_weight: f64,

    /// Curvature threshold above which the penalty activates (1/cells)
    #[serde(default = "defaults::max_curvature")]
    pub max_curvature: f64,
}

impl Default for SmootherParams {
    fn default() -> Self {
        Self {
            smooth_weight: defaults::smooth_weight(),
            curvature_weight: defaults::curvature_weight(),
            costmap_weight: defaults::costmap_weight(),
            distance_weight: defaults::distance_weight(),
            max_curvature: defaults::max_curvature(),
        }
    }
}

impl SmootherParams {
    /// Params with every weight zeroed. Useful as a base for tests and
    /// for enabling terms one at a time.
    pub fn zeroed() -> Self {
        Self {
            smooth_weight: 0.0,
            curvature_weight: 0.0,
            costmap_weight: 0.0,
            distance_weight: 0.0,
            max_curvature: 0.0,
        }
    }
}

/// Step control for the gradient-descent smoother driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DescentConfig {
    /// Maximum accepted-or-rejected step attempts
    #[serde(default = "defaults::descent_iterations")]
    pub max_iterations: usize,

    /// Initial step length along the negative gradient
    #[serde(default = "defaults::initial_step")]
    pub initial_step: f64,

    /// Step growth factor after an accepted step
    #[serde(default = "defaults::step_grow")]
    pub step_grow: f64,

    /// Step shrink factor after a rejected step
    #[serde(default = "defaults::step_shrink")]
    pub step_shrink: f64,

    /// Give up shrinking below this step length
    #[serde(default = "defaults::min_step")]
    pub min_step: f64,

    /// Cap on the step length
    #[serde(default = "defaults::max_step")]
    pub max_step: f64,

    /// Converged when the gradient norm falls below this
    #[serde(default = "defaults::gradient_tolerance")]
    pub gradient_tolerance: f64,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            max_iterations: defaults::descent_iterations(),
            initial_step: defaults::initial_step(),
            step_grow: defaults::step_grow(),
            step_shrink: defaults::step_shrink(),
            min_step: defaults::min_step(),
            max_step: defaults::max_step(),
            gradient_tolerance: defaults::gradient_tolerance(),
        }
    }
}

/// Aggregate planner configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// A* search section
    #[serde(default)]
    pub search: SearchConfig,

    /// Smoother weight section
    #[serde(default)]
    pub smoother: SmootherParams,

    /// Descent driver section
    #[serde(default)]
    pub descent: DescentConfig,
}
