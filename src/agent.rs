use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Agent pose in world coordinates: `(x, y, alpha)`. Orientation is carried
/// through for collaborators but never used by planning.
pub type Pose = (f64, f64, f64);

/// Contract for the mobile agent driven by the engine.
///
/// `follow_trajectory` must start a background worker on first use and, on
/// later calls, atomically replace the in-flight trajectory; the worker
/// follows the most recent point list from its beginning and holds position
/// after the last point. `stop_trajectory` terminates the worker and stops
/// the agent; it must be idempotent, including when no worker was started.
pub trait Agent {
    fn get_position(&self) -> Pose;

    fn move_to(&mut self, x: f64, y: f64);

    fn stop(&mut self);

    fn follow_trajectory(&mut self, points: Vec<(f64, f64)>);

    fn stop_trajectory(&mut self);
}

struct SimPose {
    x: f64,
    y: f64,
    alpha: f64,
    odometer: f64,
}

/// In-process agent for the simulator and the tests. A worker thread follows
/// the current trajectory at a fixed speed, receiving replacement
/// trajectories over a channel, the same shape a remote trajectory-following
/// service would have.
pub struct SimAgent {
    pose: Arc<Mutex<SimPose>>,
    speed: f64,
    tick: Duration,
    trajectory_tx: Option<Sender<Vec<(f64, f64)>>>,
    worker: Option<JoinHandle<()>>,
    halt: Arc<AtomicBool>,
}

impl SimAgent {
    /// Places the agent at `(x, y)` facing along the x axis. `speed` is in
    /// world units per second.
    pub fn new(x: f64, y: f64, speed: f64) -> Self {
        SimAgent {
            pose: Arc::new(Mutex::new(SimPose {
                x,
                y,
                alpha: 0.0,
                odometer: 0.0,
            })),
            speed,
            tick: Duration::from_millis(5),
            trajectory_tx: None,
            worker: None,
            halt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Total distance traveled since construction, in world units.
    pub fn odometer(&self) -> f64 {
        self.pose.lock().unwrap().odometer
    }

    fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    fn spawn_worker(&mut self, points: Vec<(f64, f64)>) {
        let (tx, rx) = mpsc::channel();
        let pose = Arc::clone(&self.pose);
        let halt = Arc::clone(&self.halt);
        let speed = self.speed;
        let tick = self.tick;
        self.halt.store(false, Ordering::Relaxed);
        self.worker = Some(thread::spawn(move || {
            follow(pose, halt, rx, points, speed, tick)
        }));
        self.trajectory_tx = Some(tx);
    }
}

/// Worker loop: advance toward the current waypoint each tick, swapping in a
/// replacement trajectory whenever one arrives on the channel.
fn follow(
    pose: Arc<Mutex<SimPose>>,
    halt: Arc<AtomicBool>,
    rx: Receiver<Vec<(f64, f64)>>,
    mut points: Vec<(f64, f64)>,
    speed: f64,
    tick: Duration,
) {
    let mut next = 0usize;
    loop {
        if halt.load(Ordering::Relaxed) {
            return;
        }
        match rx.try_recv() {
            Ok(replacement) => {
                points = replacement;
                next = 0;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return,
        }

        if next < points.len() {
            let (tx, ty) = points[next];
            let step = speed * tick.as_secs_f64();
            let mut p = pose.lock().unwrap();
            let dx = tx - p.x;
            let dy = ty - p.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= step {
                p.x = tx;
                p.y = ty;
                p.odometer += distance;
                next += 1;
            } else {
                p.x += step * dx / distance;
                p.y += step * dy / distance;
                p.alpha = dy.atan2(dx);
                p.odometer += step;
            }
        }

        thread::sleep(tick);
    }
}

impl Agent for SimAgent {
    fn get_position(&self) -> Pose {
        let p = self.pose.lock().unwrap();
        (p.x, p.y, p.alpha)
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let mut p = self.pose.lock().unwrap();
        let dx = x - p.x;
        let dy = y - p.y;
        p.odometer += (dx * dx + dy * dy).sqrt();
        p.x = x;
        p.y = y;
    }

    fn stop(&mut self) {
        debug!("agent stopped");
    }

    fn follow_trajectory(&mut self, points: Vec<(f64, f64)>) {
        if self.worker_alive() {
            if let Some(tx) = &self.trajectory_tx {
                if tx.send(points.clone()).is_ok() {
                    return;
                }
            }
        }
        self.spawn_worker(points);
    }

    fn stop_trajectory(&mut self) {
        self.halt.store(true, Ordering::Relaxed);
        self.trajectory_tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.halt.store(false, Ordering::Relaxed);
        self.stop();
    }
}

impl Drop for SimAgent {
    fn drop(&mut self) {
        self.halt.store(true, Ordering::Relaxed);
        self.trajectory_tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
