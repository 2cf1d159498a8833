//! Reactive path planning over a sensed 2D occupancy grid.
//!
//! A mobile agent moves toward a fixed goal while a sensor reports the
//! obstacles currently visible; obstacles may appear and disappear between
//! scans. The engine keeps a shortest path alive with an incremental LPA*
//! search: each obstacle diff re-updates only the affected vertices instead
//! of restarting the search, and the surrounding control loop interleaves
//! sensing, replanning, and trajectory dispatch under a global timeout.
//!
//! The physical agent and sensor stay outside the crate behind the [`Agent`]
//! and [`Sensor`] traits; [`SimAgent`] and the sensors in [`sensor`] are
//! in-process stand-ins used by the simulator binary and the tests.

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod path;
pub mod search;
pub mod sensor;
pub mod sim;

pub use agent::{Agent, Pose, SimAgent};
pub use config::{Config, EngineParams};
pub use engine::{PathFinder, RunStats};
pub use error::{EmptyQueue, InvalidTransition, MapInitError, PlanError};
pub use grid::{multiset_delta, Cell, GridMap};
pub use path::simplify_path;
pub use search::{IndexedPriorityQueue, Key, Planner};
pub use sensor::{ObstacleReport, RangeSensor, ScriptedSensor, Sensor};
pub use sim::{optimal_route_cost, SimWorld};
