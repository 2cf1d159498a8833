use std::fmt;

use rustc_hash::FxHashMap;

use crate::config::EngineParams;
use crate::error::{InvalidTransition, MapInitError};
use crate::sensor::ObstacleReport;

/// A grid cell. `i` is the column index, `j` the row index, so that the
/// world-frame position of the cell's lower-left corner is
/// `(i * resolution, j * resolution)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub i: usize,
    pub j: usize,
}

impl Cell {
    pub fn new(i: usize, j: usize) -> Self {
        Cell { i, j }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Occupancy model of the world as seen by the planner.
///
/// The world is a `width x height` rectangle cut into square cells of side
/// `resolution`. Occupancy is held as a multiset so that overlapping sensor
/// reports stamping the same cell twice are preserved and diff correctly
/// against later scans.
pub struct GridMap {
    width: f64,
    height: f64,
    resolution: f64,
    rows: usize,
    columns: usize,
    free_cost: f64,
    obstacle_cost: f64,
    heuristic_multiplier: f64,
    obstacles: Vec<Cell>,
    occupancy: FxHashMap<Cell, usize>,
}

impl GridMap {
    pub fn new(params: &EngineParams) -> Result<Self, MapInitError> {
        params.validate()?;

        let rows = (params.height / params.resolution) as usize;
        let columns = (params.width / params.resolution) as usize;
        if rows == 0 || columns == 0 {
            return Err(MapInitError::EmptyGrid {
                width: params.width,
                height: params.height,
                resolution: params.resolution,
            });
        }

        Ok(GridMap {
            width: params.width,
            height: params.height,
            resolution: params.resolution,
            rows,
            columns,
            free_cost: params.free_cost,
            obstacle_cost: params.obstacle_cost,
            heuristic_multiplier: params.heuristic_multiplier,
            obstacles: Vec::new(),
            occupancy: FxHashMap::default(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn free_cost(&self) -> f64 {
        self.free_cost
    }

    pub fn obstacle_cost(&self) -> f64 {
        self.obstacle_cost
    }

    /// Converts world coordinates to the indices of the containing cell.
    /// Out-of-range coordinates are the caller's responsibility.
    pub fn coords_to_indices(&self, x: f64, y: f64) -> Cell {
        Cell::new(
            (x / self.resolution) as usize,
            (y / self.resolution) as usize,
        )
    }

    /// Converts cell indices to the world coordinates of the cell's
    /// lower-left corner, the inverse of `coords_to_indices` up to truncation.
    pub fn indices_to_coords(&self, i: usize, j: usize) -> (f64, f64) {
        (i as f64 * self.resolution, j as f64 * self.resolution)
    }

    /// Rasterizes world-space obstacle reports `(x, y, w)` into the cells
    /// covered by the axis-aligned square of side `w` centered on `(x, y)`,
    /// clipped to the map bounds. Duplicate cells from overlapping reports
    /// are kept; the result is a multiset.
    pub fn rasterize_obstacles(&self, reports: &[ObstacleReport]) -> Vec<Cell> {
        let mut cells = Vec::new();
        for &(x, y, w) in reports {
            let half = w / 2.0;
            let lo = self.coords_to_indices((x - half).max(0.0), (y - half).max(0.0));
            let hi = self.coords_to_indices((x + half).min(self.width), (y + half).min(self.height));
            // A report touching the far border would otherwise stamp index
            // `columns` (or `rows`), one past the last cell.
            let hi_i = hi.i.min(self.columns - 1);
            let hi_j = hi.j.min(self.rows - 1);
            for i in lo.i..=hi_i {
                for j in lo.j..=hi_j {
                    cells.push(Cell::new(i, j));
                }
            }
        }
        cells
    }

    /// Replaces the obstacle multiset wholesale.
    pub fn set_obstacles(&mut self, obstacles: Vec<Cell>) {
        self.occupancy.clear();
        for &cell in &obstacles {
            *self.occupancy.entry(cell).or_insert(0) += 1;
        }
        self.obstacles = obstacles;
    }

    pub fn get_obstacles(&self) -> &[Cell] {
        &self.obstacles
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupancy.contains_key(&cell)
    }

    /// The in-bounds 8-neighborhood of `cell`, excluding the cell itself.
    /// The order is fixed, which makes tie-breaking downstream deterministic.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];

        let mut neighbors = Vec::with_capacity(8);
        for (di, dj) in OFFSETS {
            let i = cell.i as i64 + di;
            let j = cell.j as i64 + dj;
            if i >= 0 && (i as usize) < self.columns && j >= 0 && (j as usize) < self.rows {
                neighbors.push(Cell::new(i as usize, j as usize));
            }
        }
        neighbors
    }

    /// Cost of the edge between two 8-adjacent cells: `obstacle_cost` when
    /// either endpoint is occupied, otherwise `free_cost` for a straight step
    /// and `free_cost * sqrt(2)` for a diagonal one.
    pub fn transition_cost(&self, from: Cell, to: Cell) -> Result<f64, InvalidTransition> {
        let di = from.i.abs_diff(to.i);
        let dj = from.j.abs_diff(to.j);
        if di > 1 || dj > 1 {
            return Err(InvalidTransition { from, to });
        }
        if self.is_occupied(from) || self.is_occupied(to) {
            Ok(self.obstacle_cost)
        } else {
            Ok(self.free_cost * ((di + dj) as f64).sqrt())
        }
    }

    /// Scaled Euclidean distance between two cells.
    pub fn heuristic_cost(&self, from: Cell, to: Cell) -> f64 {
        let di = from.i.abs_diff(to.i) as f64;
        let dj = from.j.abs_diff(to.j) as f64;
        self.heuristic_multiplier * (di * di + dj * dj).sqrt()
    }
}

/// Distinct cells whose multiplicity differs between two obstacle multisets,
/// in sorted order. Empty exactly when the multisets are equal.
pub fn multiset_delta(old: &[Cell], new: &[Cell]) -> Vec<Cell> {
    let mut counts: FxHashMap<Cell, i64> = FxHashMap::default();
    for &cell in new {
        *counts.entry(cell).or_insert(0) += 1;
    }
    for &cell in old {
        *counts.entry(cell).or_insert(0) -= 1;
    }

    let mut delta: Vec<Cell> = counts
        .into_iter()
        .filter(|&(_, n)| n != 0)
        .map(|(cell, _)| cell)
        .collect();
    delta.sort_unstable();
    delta
}
