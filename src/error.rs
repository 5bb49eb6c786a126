//! Error types for the planner core.

use thiserror::Error;

/// Planner error type.
///
/// All failures surface upward; nothing is recovered inside the hot loops.
/// Numerical degeneracies in the curvature term are clamped, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("unknown neighborhood kind: {0}")]
    InvalidNeighborhood(String),

    #[error("start or goal cell is not traversable")]
    StartOrGoalInvalid,

    #[error("no path found between start and goal")]
    NoPathFound,

    #[error("search exceeded the iteration limit of {0}")]
    IterationLimitExceeded(usize),

    #[error("planning was cancelled")]
    Cancelled,

    #[error("smoother cost or gradient became non-finite")]
    SmootherDiverged,
}

pub type Result<T> = std::result::Result<T, PlannerError>;
