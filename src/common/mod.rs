//! Common types, traits, and error definitions for planar_rrt
//!
//! This module provides the foundational building blocks used across
//! the spatial index, the scene model, the occupancy grid and the planners.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
