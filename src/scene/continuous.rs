//! Continuous 2D scene: a bounded rectangle populated with obstacles

use itertools::iproduct;
use nalgebra::DMatrix;
use rand::Rng;

use crate::common::{AreaBounds, PlanningError, PlanningResult, Point2D};
use crate::scene::obstacles::Obstacle;

/// Bounded 2D scene answering feasibility, cost and visibility queries
#[derive(Debug)]
pub struct Scene2D {
    bounds: AreaBounds,
    obstacles: Vec<Box<dyn Obstacle>>,
}

impl Scene2D {
    /// Create an empty scene
    pub fn new(bounds: AreaBounds) -> PlanningResult<Self> {
        Self::with_obstacles(bounds, Vec::new())
    }

    pub fn with_obstacles(
        bounds: AreaBounds,
        obstacles: Vec<Box<dyn Obstacle>>,
    ) -> PlanningResult<Self> {
        bounds.validate()?;
        Ok(Scene2D { bounds, obstacles })
    }

    pub fn add_obstacle(&mut self, obstacle: Box<dyn Obstacle>) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Box<dyn Obstacle>] {
        &self.obstacles
    }

    pub fn num_obstacles(&self) -> usize {
        self.obstacles.len()
    }

    pub fn bounds(&self) -> &AreaBounds {
        &self.bounds
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        self.bounds.contains(point)
    }

    /// True iff no obstacle claims the point
    pub fn is_feasible(&self, point: &Point2D) -> bool {
        self.obstacles.iter().all(|obstacle| obstacle.is_feasible(point))
    }

    /// Sum of every obstacle's cost at the point
    pub fn cost(&self, point: &Point2D) -> f64 {
        self.obstacles.iter().map(|obstacle| obstacle.cost(point)).sum()
    }

    /// Uniform sample from the scene bounds
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        self.bounds.sample(rng)
    }

    /// True iff the segment between the two points touches no obstacle
    pub fn line_of_sight(&self, from: &Point2D, to: &Point2D) -> bool {
        !self.obstacles
            .iter()
            .any(|obstacle| obstacle.intersects_segment(from, to))
    }

    /// Sample the cost on a regular lattice covering the bounds.
    ///
    /// Entry `(ix, iy)` holds the cost at `(xmin + ix * resolution, ymin + iy * resolution)`.
    pub fn cost_map(&self, resolution: f64) -> PlanningResult<DMatrix<f64>> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(PlanningError::InvalidArgument(format!(
                "cost map resolution must be positive, got {}",
                resolution
            )));
        }

        let x_width = (self.bounds.width() / resolution).floor() as usize + 1;
        let y_width = (self.bounds.height() / resolution).floor() as usize + 1;

        let mut data = DMatrix::from_element(x_width, y_width, 0.0);
        for (ix, iy) in iproduct!(0..x_width, 0..y_width) {
            let x = self.bounds.xmin + ix as f64 * resolution;
            let y = self.bounds.ymin + iy as f64 * resolution;
            data[(ix, iy)] = self.cost(&Point2D::new(x, y));
        }
        Ok(data)
    }
}
