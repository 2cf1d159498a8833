use crate::grid::Cell;

/// Code of one 8-connected step, folding each of the possible index deltas
/// into a small integer. Consecutive steps with the same code lie on the
/// same straight run.
fn step_code(from: Cell, to: Cell) -> usize {
    from.i.abs_diff(to.i) + 2 * from.j.abs_diff(to.j)
}

/// Compresses a cell-by-cell path into its endpoints plus every cell at
/// which the step direction changes, so the agent receives a few waypoints
/// instead of one command per cell. Paths of at most two cells pass through
/// unchanged.
pub fn simplify_path(path: &[Cell]) -> Vec<Cell> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut simplified = vec![path[0]];
    let mut direction = step_code(path[0], path[1]);
    for w in 1..path.len() {
        let previous = direction;
        direction = step_code(path[w - 1], path[w]);
        if previous != direction {
            simplified.push(path[w - 1]);
        }
    }
    simplified.push(path[path.len() - 1]);
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(points: &[(usize, usize)]) -> Vec<Cell> {
        points.iter().map(|&(i, j)| Cell::new(i, j)).collect()
    }

    #[test]
    fn straight_run_collapses_to_endpoints() {
        let path = cells(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(simplify_path(&path), cells(&[(0, 0), (4, 0)]));
    }

    #[test]
    fn diagonal_run_collapses_to_endpoints() {
        let path = cells(&[(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_eq!(simplify_path(&path), cells(&[(0, 0), (3, 3)]));
    }

    #[test]
    fn turns_are_preserved() {
        let path = cells(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (3, 3)]);
        assert_eq!(
            simplify_path(&path),
            cells(&[(0, 0), (2, 0), (2, 2), (3, 3)])
        );
    }

    #[test]
    fn short_paths_pass_through() {
        let pair = cells(&[(0, 0), (1, 1)]);
        assert_eq!(simplify_path(&pair), pair);

        let single = cells(&[(4, 2)]);
        assert_eq!(simplify_path(&single), single);

        assert_eq!(simplify_path(&[]), Vec::<Cell>::new());
    }
}
