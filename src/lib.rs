//! planar_rrt - sampling-based motion planning in the plane
//!
//! This crate grows Rapidly-exploring Random Trees over continuous 2D scenes,
//! backed by an incremental kd-tree for nearest-neighbor queries and an
//! occupancy grid that turns point observations into scene obstacles.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod scene;
pub mod mapping;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Orientation2D, AreaBounds, Trajectory};
pub use common::{PlanarPoint, PathPlanner};
pub use common::{PlanningError, PlanningResult};
pub use mapping::{GridIndex, InsertSummary, OccupancyGrid2D};
pub use path_planning::{RrtConfig, RrtPlanner, RrtTree};
pub use scene::{CircularObstacle, GaussianObstacle, Obstacle, Scene2D};
pub use utils::KdTree2D;
