use tracing::debug;

use crate::error::PlanError;
use crate::grid::{Cell, GridMap};
use crate::search::queue::{IndexedPriorityQueue, Key};

/// Incremental shortest-path state over a [`GridMap`], after Lifelong
/// Planning A* (Koenig and Likhachev, 2004).
///
/// Each cell carries two potentials: `g`, the best known cost from the start,
/// and `rhs`, a one-step lookahead over the cell's neighbors. A cell is
/// locally consistent when the two agree; inconsistent cells sit in the open
/// set, ordered by [`Key`]. When edge costs change, only the affected
/// vertices are re-queued and the previous search effort is reused.
pub struct Planner {
    g: Vec<f64>,
    rhs: Vec<f64>,
    open: IndexedPriorityQueue,
    start: Cell,
    goal: Cell,
    infinity: f64,
    columns: usize,
    rows: usize,
}

impl Planner {
    pub fn new(map: &GridMap) -> Self {
        let cells = map.rows() * map.columns();
        // Finite stand-in for an unreachable potential. No realizable path
        // can cost this much: the longest simple path visits every cell and
        // each step costs at most obstacle_cost.
        let infinity = 2.0 * map.obstacle_cost() * (cells as f64) * (cells as f64);
        Planner {
            g: vec![infinity; cells],
            rhs: vec![infinity; cells],
            open: IndexedPriorityQueue::new(),
            start: Cell::new(0, 0),
            goal: Cell::new(0, 0),
            infinity,
            columns: map.columns(),
            rows: map.rows(),
        }
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn infinity(&self) -> f64 {
        self.infinity
    }

    pub fn g(&self, cell: Cell) -> f64 {
        self.g[self.index(cell)]
    }

    pub fn rhs(&self, cell: Cell) -> f64 {
        self.rhs[self.index(cell)]
    }

    /// Whether `cell` currently sits in the open set.
    pub fn is_queued(&self, cell: Cell) -> bool {
        self.open.contains(cell)
    }

    fn index(&self, cell: Cell) -> usize {
        debug_assert!(cell.i < self.columns && cell.j < self.rows);
        cell.j * self.columns + cell.i
    }

    fn key(&self, map: &GridMap, cell: Cell) -> Key {
        let min_potential = self.g(cell).min(self.rhs(cell));
        Key::new(
            min_potential + map.heuristic_cost(cell, self.goal),
            min_potential,
        )
    }

    /// Clears all potentials and seeds the search: `rhs[start] = 0`, start
    /// enqueued. Must be called before the first `compute_shortest_path` and
    /// whenever the start or goal moves.
    pub fn reset(&mut self, map: &GridMap, start_world: (f64, f64), goal_world: (f64, f64)) {
        self.g.fill(self.infinity);
        self.rhs.fill(self.infinity);
        self.open.clear();

        self.goal = map.coords_to_indices(goal_world.0, goal_world.1);
        self.start = map.coords_to_indices(start_world.0, start_world.1);

        let start = self.start;
        let idx = self.index(start);
        self.rhs[idx] = 0.0;
        let key = self.key(map, start);
        self.open.insert(key, start);
    }

    /// Restores local consistency bookkeeping at `v`: recomputes `rhs[v]`
    /// from its neighbors (unless `v` is the start), then re-enqueues `v`
    /// exactly when `g[v] != rhs[v]`.
    pub fn update_vertex(&mut self, map: &GridMap, v: Cell) -> Result<(), PlanError> {
        if v != self.start {
            let mut best = self.infinity;
            for n in map.neighbors(v) {
                let through = self.g(n) + map.transition_cost(n, v)?;
                if through < best {
                    best = through;
                }
            }
            let idx = self.index(v);
            self.rhs[idx] = best;
        }

        self.open.remove(v);
        if self.g(v) != self.rhs(v) {
            let key = self.key(map, v);
            self.open.insert(key, v);
        }
        Ok(())
    }

    /// Processes the open set until the goal is locally consistent and no
    /// queued cell could still improve it. An emptied queue means there is no
    /// more work; the goal potential then decides whether a path exists.
    pub fn compute_shortest_path(&mut self, map: &GridMap) -> Result<(), PlanError> {
        let mut expansions = 0usize;
        loop {
            let goal_key = self.key(map, self.goal);
            let head_below_goal = match self.open.top_key() {
                Ok(top) => top < goal_key,
                Err(_) => false,
            };
            if !head_below_goal && self.g(self.goal) == self.rhs(self.goal) {
                break;
            }

            let Ok((_, v)) = self.open.pop() else {
                break;
            };
            expansions += 1;

            if self.g(v) > self.rhs(v) {
                // Overconsistent: the lookahead found a better route through
                // a neighbor; settle it and propagate outward.
                let idx = self.index(v);
                self.g[idx] = self.rhs[idx];
                for n in map.neighbors(v) {
                    self.update_vertex(map, n)?;
                }
            } else {
                // Underconsistent: the route this cell relied on got worse.
                // Invalidate and let the neighborhood recompute.
                let idx = self.index(v);
                self.g[idx] = self.infinity;
                for n in map.neighbors(v) {
                    self.update_vertex(map, n)?;
                }
                self.update_vertex(map, v)?;
            }
        }

        debug!(expansions, open = self.open.len(), "shortest path computed");

        if self.g(self.goal) == self.infinity {
            return Err(self.no_path());
        }
        Ok(())
    }

    fn no_path(&self) -> PlanError {
        PlanError::NoPath {
            from: self.start,
            to: self.goal,
        }
    }

    /// Walks from the goal back to the agent's current cell, at each step
    /// picking the neighbor minimizing `g[n] + transition_cost(n, s)`. Ties
    /// fall to the first neighbor in iteration order. Returns the cell
    /// sequence from the current cell to the goal.
    pub fn reconstruct_path(
        &self,
        map: &GridMap,
        current_world: (f64, f64),
    ) -> Result<Vec<Cell>, PlanError> {
        let current = map.coords_to_indices(current_world.0, current_world.1);
        let mut path = vec![self.goal];
        let mut s = self.goal;

        while s != current {
            let mut predecessor: Option<(Cell, f64)> = None;
            for n in map.neighbors(s) {
                let through = self.g(n) + map.transition_cost(n, s)?;
                match predecessor {
                    Some((_, best)) if through >= best => {}
                    _ => predecessor = Some((n, through)),
                }
            }

            let (pred, through) = predecessor.ok_or_else(|| self.no_path())?;
            if through >= self.infinity {
                return Err(self.no_path());
            }

            path.push(pred);
            s = pred;
            if path.len() > self.rows * self.columns {
                return Err(self.no_path());
            }
        }

        path.reverse();
        Ok(path)
    }
}
