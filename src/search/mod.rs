pub mod planner;
pub mod queue;

pub use planner::Planner;
pub use queue::{IndexedPriorityQueue, Key};
