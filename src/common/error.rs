//! Error types for planar_rrt

use thiserror::Error;

/// Main error type for planning operations
///
/// Expected outcomes such as an empty index, a duplicate insertion or a goal
/// that has not been reached yet are not errors; they are reported through
/// `Option` or `bool` return values.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Malformed input (non-finite coordinates, non-positive sizes, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Point lies outside the bounded region of a grid or scene
    #[error("Point ({x}, {y}) is out of bounds")]
    OutOfBounds { x: f64, y: f64 },
    /// Point lies inside an obstacle
    #[error("Point ({x}, {y}) is infeasible")]
    Infeasible { x: f64, y: f64 },
    /// Path planning failed
    #[error("Planning error: {0}")]
    PlanningFailed(String),
    /// Plotting backend failed
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlanningError::PlanningFailed("No path found".to_string());
        assert_eq!(format!("{}", err), "Planning error: No path found");
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = PlanningError::OutOfBounds { x: 1.5, y: -2.0 };
        assert_eq!(format!("{}", err), "Point (1.5, -2) is out of bounds");
    }
}
