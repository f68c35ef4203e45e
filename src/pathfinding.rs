//! A* pathfinding over a grid geometry.
//!
//! Classic A* with uniform edge cost 1, a binary min-heap frontier with lazy
//! deletion, and two extras the simulation relies on:
//!
//! - a large penalty on re-entering the caller's previous cell, which stops
//!   two agents chasing each other from swapping the same pair of cells
//!   forever;
//! - a hard step budget of `grid_size²` frontier pops, the only guard against
//!   pathological searches (neighbor enumeration is not bounds-filtered).

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geometry::{Coord, GridGeometry};

/// Cost added when a step would return to the cell the agent just vacated.
pub const REVERSAL_PENALTY: f32 = 10_000.0;

/// Frontier entry. Ordered by priority, then by coordinate so that ties
/// resolve the same way on every run and platform.
#[derive(Debug, Clone, Copy)]
struct Node {
    coord: Coord,
    priority: f32,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.coord.cmp(&other.coord))
    }
}

/// Find a path from `start` to `goal` (both inclusive).
///
/// Returns an empty vec when no path exists or the step budget is exceeded;
/// a single-element vec means `start == goal`. Cells in `temp_unwalkable`
/// are never entered; a step into `previous_cell_bias` costs an extra
/// [`REVERSAL_PENALTY`].
pub fn find_path(
    start: Coord,
    goal: Coord,
    geometry: &dyn GridGeometry,
    previous_cell_bias: Option<Coord>,
    temp_unwalkable: Option<&HashSet<Coord>>,
) -> Vec<Coord> {
    let grid_size = geometry.grid_size() as i64;
    let max_steps = grid_size * grid_size;
    let mut steps_taken: i64 = 0;

    let mut frontier: BinaryHeap<Reverse<Node>> = BinaryHeap::new();
    let mut frontier_set: HashSet<Coord> = HashSet::new();
    let mut closed: HashSet<Coord> = HashSet::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut cost_so_far: HashMap<Coord, f32> = HashMap::new();

    frontier.push(Reverse(Node {
        coord: start,
        priority: 0.0,
    }));
    frontier_set.insert(start);
    came_from.insert(start, start);
    cost_so_far.insert(start, 0.0);

    while let Some(Reverse(node)) = frontier.pop() {
        steps_taken += 1;
        if steps_taken > max_steps {
            tracing::error!(?start, ?goal, max_steps, "A* exceeded step budget, aborting");
            return Vec::new();
        }

        frontier_set.remove(&node.coord);

        // Lazy deletion: stale duplicate entries are dropped here.
        if !closed.insert(node.coord) {
            continue;
        }

        if node.coord == goal {
            return reconstruct_path(&came_from, goal);
        }

        let current_cost = cost_so_far.get(&node.coord).copied().unwrap_or(0.0);

        for neighbor in geometry.neighbors(node.coord) {
            if temp_unwalkable.is_some_and(|set| set.contains(&neighbor)) {
                continue;
            }
            if closed.contains(&neighbor) {
                continue;
            }

            let mut new_cost = current_cost + 1.0;
            if previous_cell_bias == Some(neighbor) {
                new_cost += REVERSAL_PENALTY;
            }

            let improved = cost_so_far
                .get(&neighbor)
                .is_none_or(|&existing| new_cost < existing);
            if improved {
                cost_so_far.insert(neighbor, new_cost);
                came_from.insert(neighbor, node.coord);

                // A node already on the frontier keeps its old priority; the
                // closed check absorbs whichever copy pops second. With unit
                // edge costs this never loses optimality and is cheaper than
                // a decrease-key.
                if frontier_set.insert(neighbor) {
                    let priority = new_cost + geometry.heuristic(neighbor, goal);
                    frontier.push(Reverse(Node {
                        coord: neighbor,
                        priority,
                    }));
                }
            }
        }
    }

    tracing::debug!(?start, ?goal, "A* frontier exhausted without reaching goal");
    Vec::new()
}

fn reconstruct_path(came_from: &HashMap<Coord, Coord>, goal: Coord) -> Vec<Coord> {
    let mut path = Vec::new();
    let mut step = goal;

    while let Some(&prev) = came_from.get(&step) {
        if prev == step {
            break;
        }
        path.push(step);
        step = prev;
    }

    path.push(step);
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{HexGrid, SquareGrid};
    use std::collections::VecDeque;

    /// Reference shortest-path distance by breadth-first search over the
    /// same adjacency the pathfinder uses.
    fn bfs_distance(
        geometry: &dyn GridGeometry,
        start: Coord,
        goal: Coord,
        unwalkable: Option<&HashSet<Coord>>,
    ) -> Option<u32> {
        let mut visited: HashSet<Coord> = HashSet::new();
        let mut queue: VecDeque<(Coord, u32)> = VecDeque::new();
        visited.insert(start);
        queue.push_back((start, 0));

        let cap = 100_000;
        let mut expanded = 0;

        while let Some((cell, dist)) = queue.pop_front() {
            expanded += 1;
            if expanded > cap {
                return None;
            }
            if cell == goal {
                return Some(dist);
            }
            for n in geometry.neighbors(cell) {
                if unwalkable.is_some_and(|set| set.contains(&n)) {
                    continue;
                }
                if visited.insert(n) {
                    queue.push_back((n, dist + 1));
                }
            }
        }
        None
    }

    #[test]
    fn square_paths_are_bfs_optimal() {
        let grid = SquareGrid::new(8, 1.0);
        let pairs = [
            (Coord::new(0, 0), Coord::new(7, 7)),
            (Coord::new(3, 1), Coord::new(1, 6)),
            (Coord::new(5, 5), Coord::new(5, 0)),
        ];
        for (start, goal) in pairs {
            let path = find_path(start, goal, &grid, None, None);
            let expected = bfs_distance(&grid, start, goal, None).unwrap();
            assert_eq!(path.len() as u32 - 1, expected, "{start:?} -> {goal:?}");
            assert_eq!(path[0], start);
            assert_eq!(*path.last().unwrap(), goal);
        }
    }

    #[test]
    fn hex_paths_are_bfs_optimal() {
        let grid = HexGrid::new(8, 1.0);
        let pairs = [
            (Coord::new(0, 0), Coord::new(6, 6)),
            (Coord::new(2, 5), Coord::new(5, 1)),
            (Coord::new(0, 3), Coord::new(7, 3)),
        ];
        for (start, goal) in pairs {
            let path = find_path(start, goal, &grid, None, None);
            let expected = bfs_distance(&grid, start, goal, None).unwrap();
            assert_eq!(path.len() as u32 - 1, expected, "{start:?} -> {goal:?}");
        }
    }

    #[test]
    fn heuristics_never_overestimate_bfs_distance() {
        let square = SquareGrid::new(5, 1.0);
        let hex = HexGrid::new(5, 1.0);

        for geometry in [&square as &dyn GridGeometry, &hex as &dyn GridGeometry] {
            for a_col in 0..5 {
                for a_row in 0..5 {
                    for b_col in 0..5 {
                        for b_row in 0..5 {
                            let a = Coord::new(a_col, a_row);
                            let b = Coord::new(b_col, b_row);
                            let true_dist = bfs_distance(geometry, a, b, None).unwrap() as f32;
                            assert!(
                                geometry.heuristic(a, b) <= true_dist,
                                "inadmissible at {a:?} -> {b:?}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn path_respects_unwalkable_cells() {
        let grid = SquareGrid::new(8, 1.0);
        // Vertical wall at col 3 with a gap at row 6.
        let wall: HashSet<Coord> = (0..6).map(|row| Coord::new(3, row)).collect();

        let start = Coord::new(0, 0);
        let goal = Coord::new(7, 0);
        let path = find_path(start, goal, &grid, None, Some(&wall));

        assert!(!path.is_empty());
        for cell in &path[1..path.len() - 1] {
            assert!(!wall.contains(cell), "path crosses wall at {cell:?}");
        }
        let expected = bfs_distance(&grid, start, goal, Some(&wall)).unwrap();
        assert_eq!(path.len() as u32 - 1, expected);
    }

    #[test]
    fn start_equals_goal_yields_single_cell_path() {
        let grid = SquareGrid::new(4, 1.0);
        let cell = Coord::new(2, 2);
        assert_eq!(find_path(cell, cell, &grid, None, None), vec![cell]);
    }

    #[test]
    fn enclosed_start_exhausts_frontier_and_returns_empty() {
        let grid = SquareGrid::new(8, 1.0);
        let start = Coord::new(4, 4);
        let ring: HashSet<Coord> = grid.neighbors(start).into_iter().collect();
        let path = find_path(start, Coord::new(0, 0), &grid, None, Some(&ring));
        assert!(path.is_empty());
    }

    #[test]
    fn budget_aborts_search_toward_enclosed_goal() {
        // The goal is walled off, so the search can never finish; because
        // neighbor enumeration is unbounded the frontier never empties either
        // and the step budget must fire.
        let grid = SquareGrid::new(6, 1.0);
        let goal = Coord::new(3, 3);
        let ring: HashSet<Coord> = grid.neighbors(goal).into_iter().collect();
        let path = find_path(Coord::new(0, 0), goal, &grid, None, Some(&ring));
        assert!(path.is_empty());
    }

    #[test]
    fn reversal_bias_avoids_the_previous_cell() {
        let grid = SquareGrid::new(6, 1.0);
        let start = Coord::new(2, 2);
        let goal = Coord::new(0, 2);
        let previous = Coord::new(1, 2);

        let path = find_path(start, goal, &grid, Some(previous), None);

        assert!(!path.is_empty());
        assert!(
            !path.contains(&previous),
            "path stepped back into the vacated cell"
        );
        // Detour around the bias cell costs two extra steps, nothing more.
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn tie_break_is_deterministic() {
        let grid = SquareGrid::new(8, 1.0);
        let start = Coord::new(0, 0);
        let goal = Coord::new(5, 5);
        let first = find_path(start, goal, &grid, None, None);
        for _ in 0..10 {
            assert_eq!(find_path(start, goal, &grid, None, None), first);
        }
    }
}
