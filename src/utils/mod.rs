//! Utility modules for planar_rrt

pub mod kd_tree;
pub mod visualization;

pub use kd_tree::{KdTree2D, Neighbor};
pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
