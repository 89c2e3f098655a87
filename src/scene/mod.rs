// Scene models module

pub mod continuous;
pub mod obstacles;

pub use continuous::*;
pub use obstacles::*;
