use std::sync::{Arc, Mutex};

use pathfinding::prelude::astar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::EngineParams;
use crate::grid::{Cell, GridMap};
use crate::sensor::ObstacleReport;

/// A shared obstacle field for the simulator: the `RangeSensor` reads it,
/// the harness mutates it while the engine runs.
pub struct SimWorld {
    obstacles: Arc<Mutex<Vec<ObstacleReport>>>,
}

impl SimWorld {
    /// Scatters `count` square obstacles of side `width` over the map,
    /// keeping a clearance of twice the obstacle width around the start and
    /// goal so neither ends up buried.
    pub fn generate(
        params: &EngineParams,
        count: usize,
        width: f64,
        start: (f64, f64),
        goal: (f64, f64),
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let clearance = 2.0 * width;
        let mut obstacles = Vec::new();
        let mut attempts = 0;
        while obstacles.len() < count && attempts < count * 10 {
            let x = rng.gen_range(0.0..params.width);
            let y = rng.gen_range(0.0..params.height);
            if distance((x, y), start) > clearance && distance((x, y), goal) > clearance {
                obstacles.push((x, y, width));
            }
            attempts += 1;
        }

        SimWorld {
            obstacles: Arc::new(Mutex::new(obstacles)),
        }
    }

    pub fn from_reports(reports: Vec<ObstacleReport>) -> Self {
        SimWorld {
            obstacles: Arc::new(Mutex::new(reports)),
        }
    }

    /// Handle for sensors; clones share the same field.
    pub fn handle(&self) -> Arc<Mutex<Vec<ObstacleReport>>> {
        Arc::clone(&self.obstacles)
    }

    pub fn remove_obstacles_near(&self, x: f64, y: f64, radius: f64) {
        self.obstacles
            .lock()
            .unwrap()
            .retain(|&(ox, oy, _)| distance((ox, oy), (x, y)) > radius);
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.lock().unwrap().len()
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

// Transition costs are real-valued but `astar` wants an ordered integer
// cost, so edges are scaled to fixed-point micro-units.
const COST_SCALE: f64 = 1_000_000.0;

/// Independent shortest-route cost between two cells under the map's own
/// transition metric, computed with the `pathfinding` crate's A*. Used as
/// the baseline for route-efficiency reporting and as a cross-check of the
/// incremental planner.
pub fn optimal_route_cost(map: &GridMap, start: Cell, goal: Cell) -> Option<f64> {
    let result = astar(
        &start,
        |&cell| {
            map.neighbors(cell)
                .into_iter()
                .filter_map(|n| {
                    map.transition_cost(cell, n)
                        .ok()
                        .map(|cost| (n, (cost * COST_SCALE).round() as u64))
                })
                .collect::<Vec<_>>()
        },
        |&cell| (map.heuristic_cost(cell, goal) * COST_SCALE).round() as u64,
        |&cell| cell == goal,
    );
    result.map(|(_, cost)| cost as f64 / COST_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EngineParams {
        EngineParams {
            width: 30.0,
            height: 20.0,
            resolution: 1.0,
            free_cost: 1.0,
            obstacle_cost: 1000.0,
            heuristic_multiplier: 1.0,
            period_ms: 10,
            timeout_s: 5.0,
        }
    }

    #[test]
    fn generated_worlds_are_reproducible() {
        let p = params();
        let a = SimWorld::generate(&p, 10, 1.5, (0.5, 0.5), (28.5, 18.5), Some(7));
        let b = SimWorld::generate(&p, 10, 1.5, (0.5, 0.5), (28.5, 18.5), Some(7));
        assert_eq!(*a.obstacles.lock().unwrap(), *b.obstacles.lock().unwrap());
    }

    #[test]
    fn generated_worlds_respect_clearance() {
        let p = params();
        let start = (0.5, 0.5);
        let goal = (28.5, 18.5);
        let world = SimWorld::generate(&p, 20, 1.5, start, goal, Some(11));
        for &(x, y, _) in world.obstacles.lock().unwrap().iter() {
            assert!(distance((x, y), start) > 3.0);
            assert!(distance((x, y), goal) > 3.0);
        }
    }

    #[test]
    fn optimal_route_on_an_empty_map() {
        let map = GridMap::new(&params()).unwrap();
        let cost = optimal_route_cost(&map, Cell::new(0, 0), Cell::new(10, 0)).unwrap();
        assert!((cost - 10.0).abs() < 1e-3);

        let diagonal = optimal_route_cost(&map, Cell::new(0, 0), Cell::new(5, 5)).unwrap();
        assert!((diagonal - 5.0 * 2.0_f64.sqrt()).abs() < 1e-3);
    }
}
