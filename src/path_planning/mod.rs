// Path Planning algorithms module

pub mod rrt;
pub mod rrt_tree;

pub use rrt::*;
pub use rrt_tree::*;
