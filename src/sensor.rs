use std::sync::{Arc, Mutex};

use crate::agent::Pose;

/// World-space obstacle report: center `(x, y)` and width `w` of the
/// axis-aligned square the obstacle covers.
pub type ObstacleReport = (f64, f64, f64);

/// Contract for the environment sensor. `scan` returns the obstacles
/// currently visible from `origin`, already transformed to world
/// coordinates; the engine rescans every loop iteration and reacts to the
/// difference against the previous scan.
pub trait Sensor {
    fn scan(&mut self, origin: Pose) -> Vec<ObstacleReport>;
}

/// Sensor over a shared obstacle field, reporting everything within `range`
/// of the scan origin. The field is behind a mutex so a simulation harness
/// can add and remove obstacles while the engine runs.
pub struct RangeSensor {
    world: Arc<Mutex<Vec<ObstacleReport>>>,
    range: f64,
}

impl RangeSensor {
    pub fn new(world: Arc<Mutex<Vec<ObstacleReport>>>, range: f64) -> Self {
        RangeSensor { world, range }
    }
}

impl Sensor for RangeSensor {
    fn scan(&mut self, origin: Pose) -> Vec<ObstacleReport> {
        let world = self.world.lock().unwrap();
        world
            .iter()
            .copied()
            .filter(|&(x, y, _)| {
                let dx = x - origin.0;
                let dy = y - origin.1;
                (dx * dx + dy * dy).sqrt() <= self.range
            })
            .collect()
    }
}

/// Replays a fixed sequence of scans, one per call; the final scan repeats
/// once the script is exhausted. Scanning an empty script reports nothing.
pub struct ScriptedSensor {
    scans: Vec<Vec<ObstacleReport>>,
    cursor: usize,
}

impl ScriptedSensor {
    pub fn new(scans: Vec<Vec<ObstacleReport>>) -> Self {
        ScriptedSensor { scans, cursor: 0 }
    }
}

impl Sensor for ScriptedSensor {
    fn scan(&mut self, _origin: Pose) -> Vec<ObstacleReport> {
        let Some(current) = self.scans.get(self.cursor) else {
            return Vec::new();
        };
        if self.cursor + 1 < self.scans.len() {
            self.cursor += 1;
        }
        current.clone()
    }
}
