//! # Marga-Plan: 2D Grid Motion Planning Core
//!
//! A grid-based motion planner for indoor robot navigation, built from two
//! tightly coupled pieces: an A* search engine over a pooled node graph,
//! and a gradient path smoother that refines the discrete result into a
//! continuous trajectory.
//!
//! ## Features
//!
//! - **Pooled node graph**: one pre-allocated node per costmap cell,
//!   reused across planning episodes with lazy generation-stamped resets
//! - **Deterministic expansion**: cardinal-first neighborhoods and
//!   insertion-order tie-breaking keep paths stable in open space
//! - **Analytic smoother gradients**: smoothness, curvature-bound,
//!   costmap-avoidance, and path-deviation terms with hand-derived
//!   Jacobians, driven through a plain first-order interface
//! - **Episode-local state**: no globals, no locks; parallel planning
//!   means separate engines
//!
//! ## Quick Start
//!
//! ```rust
//! use marga_plan::{
//!     cost_codes, lift_path, smooth_path, Costmap, CostmapView, DescentConfig, GridCell,
//!     GridSearch, SearchConfig, SmootherParams,
//! };
//!
//! # fn main() -> marga_plan::Result<()> {
//! // A 20x20 map with a wall, inflated for clearance.
//! let mut costmap = Costmap::new(20, 20, 1.0, 0.0, 0.0);
//! for y in 5..15 {
//!     costmap.set_cost(10, y, cost_codes::OCCUPIED);
//! }
//! costmap.inflate(1.0, 3.0);
//!
//! // Search, lift, smooth.
//! let mut search = GridSearch::new(&costmap, SearchConfig::default());
//! let cells = search.search(GridCell::new(2, 10), GridCell::new(17, 10), None)?;
//! let path = lift_path(&cells, costmap.size_x());
//! let smoothed = smooth_path(
//!     &costmap,
//!     &path,
//!     &SmootherParams::default(),
//!     &DescentConfig::default(),
//!     None,
//! )?;
//! assert_eq!(smoothed.len(), path.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//!  ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//!  │ CostmapView │───►│  GridSearch  │───►│  lift_path  │
//!  │ (u8 cells)  │    │ (A*, pooled  │    │ (indices →  │
//!  └─────┬───────┘    │  node graph) │    │  points)    │
//!        │            └──────────────┘    └──────┬──────┘
//!        │                                       │
//!        │            ┌─────────────────────┐    │
//!        └───────────►│ SmootherCostFunction│◄───┘
//!                     │ (4-term objective)  │
//!                     └──────────┬──────────┘
//!                                ▼
//!                     ┌─────────────────────┐
//!                     │  descent::minimize  │──► smoothed path
//!                     └─────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`core`]: cell/point types and the cancellation token
//! - [`costmap`]: cost-code semantics, the read-only view trait, and an
//!   owned costmap with obstacle inflation
//! - [`search`]: the A* engine, node pool, and neighborhood tables
//! - [`smoother`]: the cost function, costmap gradient, and descent driver
//! - [`config`]: serde-backed configuration sections
//!
//! ## Coordinates
//!
//! Planner-facing points are in floating-point cell units; conversion to
//! and from world frames is the costmap's responsibility through
//! [`CostmapView::world_to_map`].

pub mod config;
pub mod core;
pub mod costmap;
pub mod error;
pub mod search;
pub mod smoother;

pub use config::{DescentConfig, PlannerConfig, SearchConfig, SmootherParams};
pub use crate::core::{CancelToken, CellPoint, GridCell};
pub use costmap::{cost_codes, is_traversable, Costmap, CostmapView};
pub use error::{PlannerError, Result};
pub use search::{lift_path, GridSearch, Neighborhood};
pub use smoother::{smooth_path, FirstOrderProblem, SmootherCostFunction};
