//! Obstacle primitives for continuous 2D scenes

use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Matrix2, Vector2};

use crate::common::{PlanningError, PlanningResult, Point2D};

/// Capabilities every obstacle provides to a scene
pub trait Obstacle: fmt::Debug {
    /// Whether a point is outside the obstacle
    fn is_feasible(&self, point: &Point2D) -> bool;

    /// Non-negative cost of occupying a point
    fn cost(&self, point: &Point2D) -> f64;

    /// Whether the segment `a`-`b` passes through an infeasible point
    fn intersects_segment(&self, a: &Point2D, b: &Point2D) -> bool;

    /// Representative location, used for plotting
    fn center(&self) -> Point2D;
}

/// Hard disc obstacle (x, y, radius)
#[derive(Debug, Clone, PartialEq)]
pub struct CircularObstacle {
    pub center: Point2D,
    pub radius: f64,
}

impl CircularObstacle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: Point2D::new(x, y),
            radius,
        }
    }

    pub fn from_center(center: Point2D, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Obstacle for CircularObstacle {
    fn is_feasible(&self, point: &Point2D) -> bool {
        self.center.distance(point) > self.radius
    }

    /// Penetration depth normalized to [0, 1]
    fn cost(&self, point: &Point2D) -> f64 {
        let d = self.center.distance(point);
        if d >= self.radius || self.radius <= 0.0 {
            0.0
        } else {
            (self.radius - d) / self.radius
        }
    }

    fn intersects_segment(&self, a: &Point2D, b: &Point2D) -> bool {
        self.center.distance_to_segment(a, b) <= self.radius
    }

    fn center(&self) -> Point2D {
        self.center
    }
}

/// Soft obstacle shaped as a bivariate normal density.
///
/// Cost is the density at the query point. Points where the density exceeds
/// `threshold` are infeasible.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianObstacle {
    mean: Point2D,
    covariance: Matrix2<f64>,
    information: Matrix2<f64>,
    normalizer: f64,
    threshold: f64,
}

impl GaussianObstacle {
    pub fn new(
        x: f64,
        y: f64,
        sigma_xx: f64,
        sigma_yy: f64,
        sigma_xy: f64,
        threshold: f64,
    ) -> PlanningResult<Self> {
        let covariance = Matrix2::new(sigma_xx, sigma_xy, sigma_xy, sigma_yy);
        Self::from_covariance(Point2D::new(x, y), covariance, threshold)
    }

    pub fn from_covariance(
        mean: Point2D,
        covariance: Matrix2<f64>,
        threshold: f64,
    ) -> PlanningResult<Self> {
        mean.validate()?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(PlanningError::InvalidArgument(format!(
                "threshold must be finite and non-negative, got {}",
                threshold
            )));
        }
        let cholesky = covariance.cholesky().ok_or_else(|| {
            PlanningError::InvalidArgument(format!(
                "covariance is not positive definite: {:?}",
                covariance
            ))
        })?;
        let information = cholesky.inverse();
        let normalizer = 1.0 / (2.0 * PI * covariance.determinant().sqrt());

        Ok(Self {
            mean,
            covariance,
            information,
            normalizer,
            threshold,
        })
    }

    pub fn mean(&self) -> Point2D {
        self.mean
    }

    pub fn covariance(&self) -> &Matrix2<f64> {
        &self.covariance
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Density at the mean
    pub fn peak(&self) -> f64 {
        self.normalizer
    }

    fn mahalanobis_sq(&self, offset: &Vector2<f64>) -> f64 {
        (offset.transpose() * self.information * offset)[(0, 0)]
    }
}

impl Obstacle for GaussianObstacle {
    fn is_feasible(&self, point: &Point2D) -> bool {
        self.cost(point) <= self.threshold
    }

    fn cost(&self, point: &Point2D) -> f64 {
        let offset = point.to_vector() - self.mean.to_vector();
        self.normalizer * (-0.5 * self.mahalanobis_sq(&offset)).exp()
    }

    /// Density falls off with Mahalanobis distance, so the segment point
    /// closest to the mean in that metric decides the answer.
    fn intersects_segment(&self, a: &Point2D, b: &Point2D) -> bool {
        let u = a.to_vector() - self.mean.to_vector();
        let v = b.to_vector() - a.to_vector();

        let vv = self.mahalanobis_sq(&v);
        let t = if vv > 0.0 {
            let uv = (u.transpose() * self.information * v)[(0, 0)];
            (-uv / vv).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let closest = a.add(&Point2D::from(v), t);
        !self.is_feasible(&closest)
    }

    fn center(&self) -> Point2D {
        self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_obstacle_feasibility() {
        let obs = CircularObstacle::new(5.0, 5.0, 1.0);
        assert!(!obs.is_feasible(&Point2D::new(5.0, 5.0)));
        // boundary is inside
        assert!(!obs.is_feasible(&Point2D::new(6.0, 5.0)));
        assert!(obs.is_feasible(&Point2D::new(6.5, 5.0)));
    }

    #[test]
    fn test_circular_obstacle_cost() {
        let obs = CircularObstacle::new(0.0, 0.0, 2.0);
        assert!((obs.cost(&Point2D::origin()) - 1.0).abs() < 1e-10);
        assert!((obs.cost(&Point2D::new(1.0, 0.0)) - 0.5).abs() < 1e-10);
        assert_eq!(obs.cost(&Point2D::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn test_circular_obstacle_segment() {
        let obs = CircularObstacle::new(5.0, 5.0, 1.0);
        assert!(obs.intersects_segment(&Point2D::new(0.0, 5.0), &Point2D::new(10.0, 5.0)));
        assert!(!obs.intersects_segment(&Point2D::new(0.0, 0.0), &Point2D::new(10.0, 0.0)));
        // segment ends before reaching the disc
        assert!(!obs.intersects_segment(&Point2D::new(0.0, 5.0), &Point2D::new(3.0, 5.0)));
    }

    #[test]
    fn test_gaussian_peak_and_falloff() {
        let obs = GaussianObstacle::new(0.5, 0.5, 0.01, 0.01, 0.0, 1.0).unwrap();
        let expected_peak = 1.0 / (2.0 * PI * 0.01);
        assert!((obs.peak() - expected_peak).abs() < 1e-9);
        assert!((obs.cost(&Point2D::new(0.5, 0.5)) - expected_peak).abs() < 1e-9);

        // one standard deviation away along x
        let one_sigma = obs.cost(&Point2D::new(0.6, 0.5));
        assert!((one_sigma - expected_peak * (-0.5_f64).exp()).abs() < 1e-9);

        assert!(!obs.is_feasible(&Point2D::new(0.5, 0.5)));
        assert!(obs.is_feasible(&Point2D::new(0.0, 0.0)));
    }

    #[test]
    fn test_gaussian_correlated_covariance() {
        let obs = GaussianObstacle::new(0.0, 0.0, 1.0, 1.0, 0.8, 0.05).unwrap();
        // density is higher along the correlated diagonal
        let along = obs.cost(&Point2D::new(1.0, 1.0));
        let across = obs.cost(&Point2D::new(1.0, -1.0));
        assert!(along > across);
    }

    #[test]
    fn test_gaussian_rejects_bad_covariance() {
        assert!(matches!(
            GaussianObstacle::new(0.0, 0.0, 1.0, 1.0, 2.0, 0.1),
            Err(PlanningError::InvalidArgument(_))
        ));
        assert!(GaussianObstacle::new(0.0, 0.0, -1.0, 1.0, 0.0, 0.1).is_err());
        assert!(GaussianObstacle::new(0.0, 0.0, 1.0, 1.0, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_gaussian_segment() {
        let obs = GaussianObstacle::new(5.0, 5.0, 0.25, 0.25, 0.0, 0.1).unwrap();
        assert!(obs.intersects_segment(&Point2D::new(0.0, 5.0), &Point2D::new(10.0, 5.0)));
        assert!(!obs.intersects_segment(&Point2D::new(0.0, 0.0), &Point2D::new(10.0, 0.0)));
        // degenerate segment falls back to a point test
        let p = Point2D::new(5.0, 5.0);
        assert!(obs.intersects_segment(&p, &p));
    }
}
