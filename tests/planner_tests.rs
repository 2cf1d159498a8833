//! End-to-end checks of the incremental planner against known maps and an
//! independent A* oracle.

use pretty_assertions::assert_eq;

use reactive_pathfinding::{
    optimal_route_cost, simplify_path, Cell, EngineParams, GridMap, PlanError, Planner,
};

const EPS: f64 = 1e-9;
const ORACLE_EPS: f64 = 1e-3;

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

fn open_map() -> GridMap {
    GridMap::new(&params()).unwrap()
}

/// Full-height vertical wall on column 5, optionally leaving one row open.
fn wall_cells(gap: Option<usize>) -> Vec<Cell> {
    (0..20)
        .filter(|&j| Some(j) != gap)
        .map(|j| Cell::new(5, j))
        .collect()
}

fn walled_map(gap: Option<usize>) -> GridMap {
    let mut map = open_map();
    map.set_obstacles(wall_cells(gap));
    map
}

fn plan(map: &GridMap, start: (f64, f64), goal: (f64, f64)) -> Planner {
    let mut planner = Planner::new(map);
    planner.reset(map, start, goal);
    planner.compute_shortest_path(map).unwrap();
    planner
}

fn assert_adjacent_steps(path: &[Cell]) {
    for pair in path.windows(2) {
        assert!(pair[0].i.abs_diff(pair[1].i) <= 1);
        assert!(pair[0].j.abs_diff(pair[1].j) <= 1);
        assert!(pair[0] != pair[1]);
    }
}

fn path_cost(map: &GridMap, path: &[Cell]) -> f64 {
    path.windows(2)
        .map(|pair| map.transition_cost(pair[0], pair[1]).unwrap())
        .sum()
}

#[test]
fn straight_line_on_an_empty_map() {
    let map = open_map();
    let planner = plan(&map, (0.0, 0.0), (10.0, 0.0));

    assert!((planner.g(Cell::new(10, 0)) - 10.0).abs() < EPS);

    let path = planner.reconstruct_path(&map, (0.0, 0.0)).unwrap();
    assert_eq!(path.len(), 11);
    assert_eq!(path[0], Cell::new(0, 0));
    assert_eq!(path[10], Cell::new(10, 0));
    assert_adjacent_steps(&path);

    assert_eq!(
        simplify_path(&path),
        vec![Cell::new(0, 0), Cell::new(10, 0)]
    );
}

#[test]
fn diagonal_on_an_empty_map() {
    let map = open_map();
    let planner = plan(&map, (0.0, 0.0), (5.0, 5.0));

    assert!((planner.g(Cell::new(5, 5)) - 5.0 * 2.0_f64.sqrt()).abs() < EPS);

    let path = planner.reconstruct_path(&map, (0.0, 0.0)).unwrap();
    assert_eq!(simplify_path(&path), vec![Cell::new(0, 0), Cell::new(5, 5)]);
}

#[test]
fn detour_through_the_wall_gap() {
    let map = walled_map(Some(11));
    let planner = plan(&map, (0.0, 0.0), (10.0, 0.0));

    let goal = Cell::new(10, 0);
    let optimal = optimal_route_cost(&map, Cell::new(0, 0), goal).unwrap();
    assert!((planner.g(goal) - optimal).abs() < ORACLE_EPS);

    // The detour is far cheaper than brushing the wall anywhere.
    assert!(planner.g(goal) < map.obstacle_cost());

    let path = planner.reconstruct_path(&map, (0.0, 0.0)).unwrap();
    assert_adjacent_steps(&path);
    assert!(path.iter().all(|&cell| !map.is_occupied(cell)));
    assert!(path.contains(&Cell::new(5, 11)));
}

#[test]
fn closed_wall_is_crossed_at_obstacle_cost() {
    let map = walled_map(None);
    let planner = plan(&map, (0.0, 0.0), (10.0, 0.0));

    let goal = Cell::new(10, 0);
    let optimal = optimal_route_cost(&map, Cell::new(0, 0), goal).unwrap();
    assert!((planner.g(goal) - optimal).abs() < ORACLE_EPS);

    // Entering and leaving the wall column both cost obstacle_cost.
    assert!(planner.g(goal) >= 2.0 * map.obstacle_cost());
    assert!(planner.g(goal) < planner.infinity());
}

#[test]
fn opening_a_gap_incrementally_matches_a_fresh_plan() {
    // Plan against the closed wall first.
    let mut map = walled_map(None);
    let mut planner = Planner::new(&map);
    planner.reset(&map, (0.0, 0.0), (10.0, 0.0));
    planner.compute_shortest_path(&map).unwrap();
    let goal = Cell::new(10, 0);
    let crossing_cost = planner.g(goal);

    // The sensor now reports the gap cell clear. Only that cell changed.
    map.set_obstacles(wall_cells(Some(11)));
    planner.update_vertex(&map, Cell::new(5, 11)).unwrap();
    planner.compute_shortest_path(&map).unwrap();

    let fresh = plan(&map, (0.0, 0.0), (10.0, 0.0));
    assert!((planner.g(goal) - fresh.g(goal)).abs() < EPS);
    assert!(planner.g(goal) < crossing_cost);

    // Equal-cost tie-breaks may settle differently between a fresh and an
    // incremental run, so compare the routes by cost, not cell by cell.
    let incremental_path = planner.reconstruct_path(&map, (0.0, 0.0)).unwrap();
    let fresh_path = fresh.reconstruct_path(&map, (0.0, 0.0)).unwrap();
    assert_adjacent_steps(&incremental_path);
    assert!((path_cost(&map, &incremental_path) - path_cost(&map, &fresh_path)).abs() < EPS);
    assert!((path_cost(&map, &incremental_path) - planner.g(goal)).abs() < EPS);
}

#[test]
fn closing_the_gap_incrementally_matches_a_fresh_plan() {
    let mut map = walled_map(Some(11));
    let mut planner = Planner::new(&map);
    planner.reset(&map, (0.0, 0.0), (10.0, 0.0));
    planner.compute_shortest_path(&map).unwrap();

    map.set_obstacles(wall_cells(None));
    planner.update_vertex(&map, Cell::new(5, 11)).unwrap();
    planner.compute_shortest_path(&map).unwrap();

    let goal = Cell::new(10, 0);
    let fresh = plan(&map, (0.0, 0.0), (10.0, 0.0));
    assert!((planner.g(goal) - fresh.g(goal)).abs() < EPS);
}

#[test]
fn update_vertex_is_idempotent() {
    let mut map = open_map();
    map.set_obstacles(vec![Cell::new(3, 1)]);
    let mut planner = Planner::new(&map);
    planner.reset(&map, (0.0, 0.0), (8.0, 3.0));
    planner.compute_shortest_path(&map).unwrap();

    let v = Cell::new(3, 2);
    planner.update_vertex(&map, v).unwrap();
    let rhs_once = planner.rhs(v);
    let queued_once = planner.is_queued(v);

    planner.update_vertex(&map, v).unwrap();
    assert!((planner.rhs(v) - rhs_once).abs() < EPS);
    assert_eq!(planner.is_queued(v), queued_once);
}

#[test]
fn open_set_holds_exactly_the_inconsistent_cells() {
    let mut map = open_map();
    map.set_obstacles(vec![Cell::new(4, 4), Cell::new(5, 4), Cell::new(6, 4)]);
    let mut planner = Planner::new(&map);
    planner.reset(&map, (0.0, 0.0), (9.0, 9.0));

    // Right after reset only the seeded start is inconsistent.
    assert!(planner.is_queued(Cell::new(0, 0)));
    assert!((planner.rhs(Cell::new(0, 0))).abs() < EPS);

    planner.compute_shortest_path(&map).unwrap();
    for i in 0..map.columns() {
        for j in 0..map.rows() {
            let cell = Cell::new(i, j);
            let inconsistent = planner.g(cell) != planner.rhs(cell);
            assert_eq!(
                planner.is_queued(cell),
                inconsistent,
                "open-set membership diverged at {cell}"
            );
        }
    }
    assert!((planner.rhs(planner.start())).abs() < EPS);
}

#[test]
fn reconstruct_before_compute_reports_no_path() {
    let map = open_map();
    let mut planner = Planner::new(&map);
    planner.reset(&map, (0.0, 0.0), (10.0, 0.0));

    let err = planner.reconstruct_path(&map, (0.0, 0.0)).unwrap_err();
    assert!(matches!(err, PlanError::NoPath { .. }));
}

#[test]
fn scattered_obstacles_match_the_oracle() {
    let mut map = open_map();
    let blocks: Vec<Cell> = [
        (3, 3),
        (3, 4),
        (4, 3),
        (9, 1),
        (9, 2),
        (12, 7),
        (13, 7),
        (14, 7),
        (20, 10),
        (21, 11),
        (22, 12),
        (7, 15),
        (8, 15),
    ]
    .into_iter()
    .map(|(i, j)| Cell::new(i, j))
    .collect();
    map.set_obstacles(blocks);

    for &(start, goal) in &[
        ((0.0, 0.0), (29.0, 19.0)),
        ((1.0, 18.0), (25.0, 2.0)),
        ((15.0, 10.0), (0.0, 0.0)),
    ] {
        let planner = plan(&map, start, goal);
        let start_cell = map.coords_to_indices(start.0, start.1);
        let goal_cell = map.coords_to_indices(goal.0, goal.1);
        let optimal = optimal_route_cost(&map, start_cell, goal_cell).unwrap();
        assert!(
            (planner.g(goal_cell) - optimal).abs() < ORACLE_EPS,
            "g({goal_cell}) = {} but the oracle found {optimal}",
            planner.g(goal_cell)
        );
    }
}
