use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::config::EngineParams;
use crate::error::{MapInitError, PlanError};
use crate::grid::{multiset_delta, GridMap};
use crate::path::simplify_path;
use crate::search::Planner;
use crate::sensor::Sensor;

/// Counters for one `find_path` run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub scans: usize,
    pub replans: usize,
    pub dispatches: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scans: {}", self.scans)?;
        writeln!(f, "Replans: {}", self.replans)?;
        writeln!(f, "Trajectories dispatched: {}", self.dispatches)?;
        writeln!(f, "Elapsed: {:.2?}", self.elapsed)?;
        Ok(())
    }
}

/// The reactive planning loop. Polls the agent pose, rescans the
/// environment, feeds obstacle diffs to the incremental planner, and
/// dispatches simplified trajectories to the agent until the goal is
/// reached, the timeout fires, or the caller gives up.
pub struct PathFinder<A: Agent, S: Sensor> {
    agent: A,
    sensor: S,
    map: GridMap,
    planner: Planner,
    period: Duration,
    timeout: Duration,
    stats: RunStats,
}

impl<A: Agent, S: Sensor> PathFinder<A, S> {
    pub fn new(agent: A, sensor: S, params: &EngineParams) -> Result<Self, MapInitError> {
        let map = GridMap::new(params)?;
        let planner = Planner::new(&map);
        Ok(PathFinder {
            agent,
            sensor,
            map,
            planner,
            period: Duration::from_millis(params.period_ms),
            timeout: Duration::from_secs_f64(params.timeout_s),
            stats: RunStats::default(),
        })
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Drives the agent to `goal` (world coordinates), replanning whenever
    /// the sensed obstacle set changes. Returns the run counters on success.
    ///
    /// On `Timeout` the trajectory worker is left as-is; the caller owns
    /// stopping the agent.
    pub fn find_path(&mut self, goal: (f64, f64)) -> Result<RunStats, PlanError> {
        let (start_x, start_y, _) = self.agent.get_position();
        self.planner
            .reset(&self.map, (start_x, start_y), goal);
        self.stats = RunStats::default();

        let begin = Instant::now();
        info!(?goal, start_x, start_y, "path finding started");

        loop {
            if begin.elapsed() > self.timeout {
                return Err(PlanError::Timeout {
                    limit: self.timeout,
                });
            }

            let (x, y, _) = self.agent.get_position();
            let resolution = self.map.resolution();
            // Goal acceptance test carried over verbatim from the deployed
            // controller: the vertical term is first-degree.
            if (x - goal.0).powi(2) + (y - goal.1) <= resolution * resolution {
                info!(x, y, "goal reached");
                self.agent.stop_trajectory();
                break;
            }

            let scan = self.sensor.scan(self.agent.get_position());
            let observed = self.map.rasterize_obstacles(&scan);
            let changed = multiset_delta(self.map.get_obstacles(), &observed);
            self.stats.scans += 1;

            if !changed.is_empty() {
                debug!(
                    changed = changed.len(),
                    occupied = observed.len(),
                    "obstacle set changed"
                );
                self.map.set_obstacles(observed);
                for cell in changed {
                    self.planner.update_vertex(&self.map, cell)?;
                }
                self.stats.replans += 1;

                match self.replan() {
                    Ok(trajectory) => {
                        self.stats.dispatches += 1;
                        self.agent.follow_trajectory(trajectory);
                    }
                    Err(PlanError::NoPath { from, to }) => {
                        // Expected under flickering obstacles: hold the
                        // current trajectory and wait for the world to
                        // change again.
                        warn!(%from, %to, "no path with the current obstacle set");
                        thread::sleep(self.period);
                    }
                    Err(other) => return Err(other),
                }
            }

            thread::sleep(self.period);
        }

        self.stats.elapsed = begin.elapsed();
        info!(
            scans = self.stats.scans,
            replans = self.stats.replans,
            "path finding finished"
        );
        Ok(self.stats.clone())
    }

    /// Runs the incremental search and turns the resulting cell path into a
    /// world-frame waypoint list anchored at the agent's current cell.
    fn replan(&mut self) -> Result<Vec<(f64, f64)>, PlanError> {
        self.planner.compute_shortest_path(&self.map)?;
        let (x, y, _) = self.agent.get_position();
        let cells = self.planner.reconstruct_path(&self.map, (x, y))?;
        let waypoints = simplify_path(&cells);
        debug!(
            cells = cells.len(),
            waypoints = waypoints.len(),
            "trajectory computed"
        );
        Ok(waypoints
            .iter()
            .map(|cell| self.map.indices_to_coords(cell.i, cell.j))
            .collect())
    }
}
