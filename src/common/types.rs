//! Common types used throughout planar_rrt

use std::cmp::Ordering;
use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use nalgebra::Vector2;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::common::error::{PlanningError, PlanningResult};

/// 2D point representation
///
/// Equality, ordering and hashing are exact (no tolerance), so two samples
/// that differ in the last bit are distinct keys.
#[derive(Debug, Clone, Copy)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn squared_distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// Distance from this point to the segment `a`-`b`
    pub fn distance_to_segment(&self, a: &Point2D, b: &Point2D) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length_sq = dx * dx + dy * dy;
        if length_sq == 0.0 {
            return self.distance(a);
        }

        // Parameter of the projection onto the infinite line through a and b
        let t = ((self.x - a.x) * dx + (self.y - a.y) * dy) / length_sq;
        if (0.0..=1.0).contains(&t) {
            self.distance(&Point2D::new(a.x + t * dx, a.y + t * dy))
        } else {
            self.distance(a).min(self.distance(b))
        }
    }

    /// Move at most `step` toward `target`, stopping on it if it is closer
    pub fn step_toward(&self, target: &Point2D, step: f64) -> Point2D {
        let d = self.distance(target);
        if d <= step || d == 0.0 {
            return *target;
        }
        let scale = step / d;
        Point2D::new(
            self.x + scale * (target.x - self.x),
            self.y + scale * (target.y - self.y),
        )
    }

    /// `self + scale * other`
    pub fn add(&self, other: &Point2D, scale: f64) -> Point2D {
        Point2D::new(self.x + scale * other.x, self.y + scale * other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Fail with `InvalidArgument` unless both coordinates are finite
    pub fn validate(&self) -> PlanningResult<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(PlanningError::InvalidArgument(format!(
                "point ({}, {}) has non-finite coordinates",
                self.x, self.y
            )))
        }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    fn key(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        (OrderedFloat(self.x), OrderedFloat(self.y))
    }
}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point2D {}

impl PartialOrd for Point2D {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point2D {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Point2D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D position with a heading angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation2D {
    pub position: Point2D,
    pub theta: f64,
}

impl Orientation2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            position: Point2D::new(x, y),
            theta: normalize_angle(theta),
        }
    }

    pub fn distance_to(&self, point: &Point2D) -> f64 {
        self.position.distance(point)
    }

    /// Bearing of `point` relative to the current heading, in [-pi, pi]
    pub fn angle_to(&self, point: &Point2D) -> f64 {
        let bearing = (point.y - self.position.y).atan2(point.x - self.position.x);
        normalize_angle(bearing - self.theta)
    }

    /// Step toward `point`, turning to face the direction of travel
    pub fn step_toward(&self, point: &Point2D, step: f64) -> Orientation2D {
        if self.position == *point {
            return *self;
        }
        let theta = (point.y - self.position.y).atan2(point.x - self.position.x);
        let next = self.position.step_toward(point, step);
        Orientation2D::new(next.x, next.y, theta)
    }

    /// Translate by `scale * point`, keeping the heading
    pub fn add(&self, point: &Point2D, scale: f64) -> Orientation2D {
        let moved = self.position.add(point, scale);
        Orientation2D::new(moved.x, moved.y, self.theta)
    }
}

/// Wrap an angle to [-pi, pi]
pub fn normalize_angle(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Axis-aligned rectangular region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl AreaBounds {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        AreaBounds { xmin, xmax, ymin, ymax }
    }

    pub fn from_array(area: [f64; 4]) -> Self {
        AreaBounds {
            xmin: area[0],
            xmax: area[1],
            ymin: area[2],
            ymax: area[3],
        }
    }

    /// Bounds must be finite with a non-empty extent on both axes
    pub fn validate(&self) -> PlanningResult<()> {
        let finite = [self.xmin, self.xmax, self.ymin, self.ymax]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.xmin >= self.xmax || self.ymin >= self.ymax {
            return Err(PlanningError::InvalidArgument(format!(
                "degenerate bounds [{}, {}] x [{}, {}]",
                self.xmin, self.xmax, self.ymin, self.ymax
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Inclusive containment test
    pub fn contains(&self, point: &Point2D) -> bool {
        point.x >= self.xmin && point.x <= self.xmax && point.y >= self.ymin && point.y <= self.ymax
    }

    /// Draw a point uniformly from the region
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        let x = Uniform::new_inclusive(self.xmin, self.xmax).sample(rng);
        let y = Uniform::new_inclusive(self.ymin, self.ymax).sample(rng);
        Point2D::new(x, y)
    }
}

/// Ordered sequence of points, consumable as a polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub points: Vec<Point2D>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point2D> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2D> {
        self.points.iter()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
        assert!((p1.squared_distance(&p2) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_point2d_equality_is_exact() {
        let a = Point2D::new(0.1, 0.2);
        let b = Point2D::new(0.1 + 1e-15, 0.2);
        assert_ne!(a, b);
        assert_eq!(a, Point2D::new(0.1, 0.2));

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(Point2D::new(0.1, 0.2));
        assert_eq!(set.len(), 2);
        assert!(a < b);
    }

    #[test]
    fn test_midpoint_and_add() {
        let m = Point2D::new(0.0, 0.0).midpoint(&Point2D::new(2.0, 4.0));
        assert_eq!(m, Point2D::new(1.0, 2.0));

        let p = Point2D::new(1.0, 1.0).add(&Point2D::new(2.0, -1.0), 0.5);
        assert_eq!(p, Point2D::new(2.0, 0.5));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(4.0, 0.0);
        // projects onto the segment
        assert!((Point2D::new(2.0, 3.0).distance_to_segment(&a, &b) - 3.0).abs() < 1e-10);
        // beyond either end
        assert!((Point2D::new(7.0, 4.0).distance_to_segment(&a, &b) - 5.0).abs() < 1e-10);
        assert!((Point2D::new(-3.0, 4.0).distance_to_segment(&a, &b) - 5.0).abs() < 1e-10);
        // zero-length segment
        assert!((Point2D::new(3.0, 4.0).distance_to_segment(&a, &a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_step_toward_never_overshoots() {
        let from = Point2D::new(0.0, 0.0);
        let to = Point2D::new(3.0, 4.0);

        let step = from.step_toward(&to, 1.0);
        assert!((step.x - 0.6).abs() < 1e-10);
        assert!((step.y - 0.8).abs() < 1e-10);

        assert_eq!(from.step_toward(&to, 10.0), to);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(Point2D::new(1.0, 2.0).validate().is_ok());
        assert!(matches!(
            Point2D::new(f64::NAN, 0.0).validate(),
            Err(PlanningError::InvalidArgument(_))
        ));
        assert!(Point2D::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_orientation_angle_to() {
        let o = Orientation2D::new(0.0, 0.0, PI / 2.0);
        // straight ahead
        assert!(o.angle_to(&Point2D::new(0.0, 5.0)).abs() < 1e-10);
        // to the right
        assert!((o.angle_to(&Point2D::new(1.0, 0.0)) + PI / 2.0).abs() < 1e-10);
        assert!((o.distance_to(&Point2D::new(3.0, 4.0)) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_orientation_step_toward_turns_heading() {
        let o = Orientation2D::new(0.0, 0.0, 0.0);
        let next = o.step_toward(&Point2D::new(0.0, 2.0), 1.0);
        assert_eq!(next.position, Point2D::new(0.0, 1.0));
        assert!((next.theta - PI / 2.0).abs() < 1e-10);

        let moved = next.add(&Point2D::new(1.0, 0.0), 2.0);
        assert_eq!(moved.position, Point2D::new(2.0, 1.0));
        assert!((moved.theta - next.theta).abs() < 1e-10);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-10);
        assert!((normalize_angle(-PI / 2.0 - 2.0 * PI) + PI / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_area_bounds() {
        let bounds = AreaBounds::new(0.0, 2.0, -1.0, 1.0);
        assert!(bounds.validate().is_ok());
        assert!(bounds.contains(&Point2D::new(2.0, 1.0)));
        assert!(!bounds.contains(&Point2D::new(2.0 + 1e-9, 0.0)));
        assert!((bounds.width() - 2.0).abs() < 1e-10);
        assert!((bounds.height() - 2.0).abs() < 1e-10);

        assert!(AreaBounds::new(1.0, 1.0, 0.0, 1.0).validate().is_err());
        assert!(AreaBounds::new(0.0, 1.0, 0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_area_bounds_sample_stays_inside() {
        let bounds = AreaBounds::from_array([-2.0, 15.0, -2.0, 15.0]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(bounds.contains(&bounds.sample(&mut rng)));
        }
    }

    #[test]
    fn test_trajectory_total_length() {
        let path = Trajectory::from_points(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
        assert_eq!(path.x_coords(), vec![0.0, 1.0, 1.0]);
        assert_eq!(path.first(), Some(&Point2D::new(0.0, 0.0)));
        assert_eq!(path.last(), Some(&Point2D::new(1.0, 1.0)));
        assert_eq!(Trajectory::new().total_length(), 0.0);
    }
}
