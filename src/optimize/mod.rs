//! First and Second Optimization (§4.6, §4.7): the two-stage pipeline that
//! decides wave assignment and builds the full three-wave plan.

pub mod first;
pub mod second;

pub use first::FirstOptimizationResult;
pub use second::SecondOptimizationResult;
