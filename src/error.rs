use std::time::Duration;

use thiserror::Error;

use crate::grid::Cell;

/// Configuration-time failure. The engine cannot be constructed.
#[derive(Debug, Error)]
pub enum MapInitError {
    #[error("required parameter `{0}` was not provided")]
    MissingParameter(&'static str),

    #[error("parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("a {width}x{height} map at resolution {resolution} has no cells")]
    EmptyGrid {
        width: f64,
        height: f64,
        resolution: f64,
    },
}

/// Transition cost was queried for a pair of cells that are not 8-adjacent.
/// This is a programmer error and is propagated, not recovered from.
#[derive(Debug, Error)]
#[error("impossible transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: Cell,
    pub to: Cell,
}

/// Returned by the open set accessors when the queue holds no entries.
#[derive(Debug, Error)]
#[error("the queue is empty")]
pub struct EmptyQueue;

/// Failures surfaced by the planner and the reactive loop.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The goal potential never dropped below the infinity sentinel.
    #[error("cannot go from {from} to {to}")]
    NoPath { from: Cell, to: Cell },

    /// The wall-clock budget for one `find_path` call ran out.
    #[error("find_path exceeded its timeout of {limit:?}")]
    Timeout { limit: Duration },

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}
