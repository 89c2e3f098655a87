//! Common traits defining interfaces for planning components

use crate::common::error::PlanningError;
use crate::common::types::*;

/// Capabilities shared by every planar point kind
pub trait PlanarPoint: Sized {
    /// Position in the plane
    fn position(&self) -> Point2D;

    /// Euclidean distance to a point
    fn distance_to(&self, point: &Point2D) -> f64;

    /// Move at most `step` toward `point`
    fn step_toward(&self, point: &Point2D, step: f64) -> Self;
}

impl PlanarPoint for Point2D {
    fn position(&self) -> Point2D {
        *self
    }

    fn distance_to(&self, point: &Point2D) -> f64 {
        self.distance(point)
    }

    fn step_toward(&self, point: &Point2D, step: f64) -> Self {
        Point2D::step_toward(self, point, step)
    }
}

impl PlanarPoint for Orientation2D {
    fn position(&self) -> Point2D {
        self.position
    }

    fn distance_to(&self, point: &Point2D) -> f64 {
        Orientation2D::distance_to(self, point)
    }

    fn step_toward(&self, point: &Point2D, step: f64) -> Self {
        Orientation2D::step_toward(self, point, step)
    }
}

/// Trait for path planning algorithms
pub trait PathPlanner {
    /// Plan a path from start to goal
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<Trajectory, PlanningError>;
}
