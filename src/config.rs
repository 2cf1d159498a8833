use std::collections::HashMap;

use clap::Parser;

use crate::error::MapInitError;

/// Command line configuration for the demo simulator.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 30.0)]
    pub width: f64,

    #[arg(long, default_value_t = 20.0)]
    pub height: f64,

    #[arg(long, default_value_t = 1.0)]
    pub resolution: f64,

    #[arg(long, default_value_t = 1.0)]
    pub free_cost: f64,

    #[arg(long, default_value_t = 1000.0)]
    pub obstacle_cost: f64,

    #[arg(long, default_value_t = 1.0)]
    pub heuristic_multiplier: f64,

    /// Control loop sleep, in milliseconds.
    #[arg(long, default_value_t = 50)]
    pub period: u64,

    /// Wall-clock budget for one find_path call, in seconds.
    #[arg(long, default_value_t = 30.0)]
    pub timeout: f64,

    #[arg(long, default_value_t = 0.5)]
    pub start_x: f64,

    #[arg(long, default_value_t = 0.5)]
    pub start_y: f64,

    #[arg(long, default_value_t = 28.5)]
    pub goal_x: f64,

    #[arg(long, default_value_t = 18.5)]
    pub goal_y: f64,

    #[arg(long, default_value_t = 12)]
    pub num_obstacles: usize,

    #[arg(long, default_value_t = 1.5)]
    pub obstacle_width: f64,

    /// Visibility radius of the simulated sensor, in world units.
    #[arg(long, default_value_t = 8.0)]
    pub sensor_range: f64,

    /// Agent speed, in world units per second.
    #[arg(long, default_value_t = 4.0)]
    pub speed: f64,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            width: self.width,
            height: self.height,
            resolution: self.resolution,
            free_cost: self.free_cost,
            obstacle_cost: self.obstacle_cost,
            heuristic_multiplier: self.heuristic_multiplier,
            period_ms: self.period,
            timeout_s: self.timeout,
        }
    }
}

/// Validated numeric parameters consumed by the engine.
///
/// For the heuristic to stay admissible (and planned paths optimal),
/// `heuristic_multiplier` must not exceed `free_cost`; this is a contract on
/// configuration, not a validated constraint.
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub width: f64,
    pub height: f64,
    pub resolution: f64,
    pub free_cost: f64,
    pub obstacle_cost: f64,
    pub heuristic_multiplier: f64,
    pub period_ms: u64,
    pub timeout_s: f64,
}

impl EngineParams {
    /// Builds parameters from the required-key table used by embedders:
    /// `width`, `height`, `resolution`, `free_case_value`,
    /// `obstacle_case_value`, `heuristics_multiplier`, `period`, `timeout`.
    /// A missing key fails with `MapInitError::MissingParameter`.
    pub fn from_map(params: &HashMap<String, f64>) -> Result<Self, MapInitError> {
        let require = |name: &'static str| {
            params
                .get(name)
                .copied()
                .ok_or(MapInitError::MissingParameter(name))
        };

        let built = EngineParams {
            width: require("width")?,
            height: require("height")?,
            resolution: require("resolution")?,
            free_cost: require("free_case_value")?,
            obstacle_cost: require("obstacle_case_value")?,
            heuristic_multiplier: require("heuristics_multiplier")?,
            period_ms: require("period")? as u64,
            timeout_s: require("timeout")?,
        };
        built.validate()?;
        Ok(built)
    }

    pub fn validate(&self) -> Result<(), MapInitError> {
        let positives = [
            ("width", self.width),
            ("height", self.height),
            ("resolution", self.resolution),
            ("free_case_value", self.free_cost),
            ("obstacle_case_value", self.obstacle_cost),
            ("heuristics_multiplier", self.heuristic_multiplier),
        ];
        for (name, value) in positives {
            if value <= 0.0 {
                return Err(MapInitError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}
