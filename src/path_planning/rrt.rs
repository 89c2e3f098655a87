//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Sampling-based path planning algorithm that grows an [`RrtTree`] from the
//! start by repeatedly sampling the scene and extending the nearest node
//! toward the sample.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{PathPlanner, PlanningError, PlanningResult, Point2D, Trajectory};
use crate::path_planning::rrt_tree::RrtTree;
use crate::scene::Scene2D;

/// Configuration for RRT planner
#[derive(Debug, Clone)]
pub struct RrtConfig {
    /// Maximum distance a single extension may cover
    pub expand_dis: f64,
    /// Goal sampling rate (0-100)
    pub goal_sample_rate: u32,
    /// Maximum iterations
    pub max_iter: usize,
    /// Distance from which a node may connect directly to the goal
    pub goal_tolerance: f64,
    /// Reject extensions whose edge crosses an obstacle
    pub check_line_of_sight: bool,
    /// Seed for the sampler; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            expand_dis: 3.0,
            goal_sample_rate: 5,
            max_iter: 500,
            goal_tolerance: 3.0,
            check_line_of_sight: true,
            seed: None,
        }
    }
}

/// RRT path planner over a continuous scene
pub struct RrtPlanner<'a> {
    scene: &'a Scene2D,
    config: RrtConfig,
}

impl<'a> RrtPlanner<'a> {
    /// Create a new RRT planner
    pub fn new(scene: &'a Scene2D, config: RrtConfig) -> Self {
        RrtPlanner { scene, config }
    }

    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene2D {
        self.scene
    }

    /// Grow a tree from `start` until it reaches `goal` or the iteration
    /// budget runs out. The returned tree contains `goal` only on success.
    pub fn grow<R: Rng + ?Sized>(
        &self,
        start: Point2D,
        goal: Point2D,
        rng: &mut R,
    ) -> PlanningResult<RrtTree> {
        self.check_endpoint(&start)?;
        self.check_endpoint(&goal)?;
        if !(self.config.expand_dis.is_finite() && self.config.expand_dis > 0.0) {
            return Err(PlanningError::InvalidArgument(format!(
                "expand_dis must be positive, got {}",
                self.config.expand_dis
            )));
        }

        let mut tree = RrtTree::with_root(start)?;
        if start == goal {
            return Ok(tree);
        }
        if self.try_connect(&mut tree, &start, &goal)? {
            return Ok(tree);
        }

        for iteration in 0..self.config.max_iter {
            let sample = self.sample(&goal, rng);
            let nearest = match tree.nearest(&sample) {
                Some(nearest) => nearest,
                None => break,
            };

            let new_point = nearest.step_toward(&sample, self.config.expand_dis);
            if !self.scene.contains(&new_point) || !self.scene.is_feasible(&new_point) {
                continue;
            }
            if self.config.check_line_of_sight && !self.scene.line_of_sight(&nearest, &new_point) {
                continue;
            }
            if !tree.insert_with_parent(new_point, &nearest)? {
                continue;
            }

            if self.try_connect(&mut tree, &new_point, &goal)? {
                info!(
                    "Reached goal after {} iterations with {} nodes",
                    iteration + 1,
                    tree.len()
                );
                return Ok(tree);
            }

            if (iteration + 1) % 100 == 0 {
                debug!("Iteration: {}, tree size: {}", iteration + 1, tree.len());
            }
        }

        warn!("Goal not reached within {} iterations", self.config.max_iter);
        Ok(tree)
    }

    fn check_endpoint(&self, point: &Point2D) -> PlanningResult<()> {
        point.validate()?;
        if !self.scene.contains(point) {
            return Err(PlanningError::OutOfBounds { x: point.x, y: point.y });
        }
        if !self.scene.is_feasible(point) {
            return Err(PlanningError::Infeasible { x: point.x, y: point.y });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, goal: &Point2D, rng: &mut R) -> Point2D {
        if rng.gen_range(0..100) < self.config.goal_sample_rate {
            *goal
        } else {
            self.scene.random_point(rng)
        }
    }

    /// Attach the goal under `from` when it is close enough and visible
    fn try_connect(&self, tree: &mut RrtTree, from: &Point2D, goal: &Point2D) -> PlanningResult<bool> {
        if from.distance(goal) > self.config.goal_tolerance {
            return Ok(false);
        }
        if self.config.check_line_of_sight && !self.scene.line_of_sight(from, goal) {
            return Ok(false);
        }
        if tree.contains(goal) {
            return Ok(true);
        }
        tree.insert_with_parent(*goal, from)
    }

    fn make_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl PathPlanner for RrtPlanner<'_> {
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<Trajectory, PlanningError> {
        let mut rng = self.make_rng();
        let tree = self.grow(start, goal, &mut rng)?;
        tree.trajectory(&goal).ok_or_else(|| {
            PlanningError::PlanningFailed("RRT: Cannot find path within max iterations".to_string())
        })
    }
}
