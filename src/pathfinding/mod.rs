use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use smallvec::SmallVec;

use crate::grid::{manhattan, GridPoint};

/// In-bounds, unobstructed 4-neighbors of `point`.
pub fn neighbors(
    point: GridPoint,
    grid_size: i64,
    obstacles: &HashSet<GridPoint>,
) -> SmallVec<[GridPoint; 4]> {
    [(1, 0), (-1, 0), (0, 1), (0, -1)]
        .iter()
        .map(|&(dx, dy)| GridPoint::new(point.x + dx, point.y + dy))
        .filter(|p| p.in_bounds(grid_size) && !obstacles.contains(p))
        .collect()
}

/// A* from `start` to `goal` over the 4-connected grid.
///
/// Unit edge cost, Manhattan heuristic. Ties between equal-cost frontier
/// entries fall back to the `GridPoint` ordering, so identical inputs always
/// yield the identical path. Returns the full path including both endpoints,
/// or an empty vector when the goal cannot be reached. Reads the obstacle
/// set, never mutates it.
pub fn find_path(
    start: GridPoint,
    goal: GridPoint,
    grid_size: i64,
    obstacles: &HashSet<GridPoint>,
) -> Vec<GridPoint> {
    let mut open = BinaryHeap::new();
    open.push(Reverse((manhattan(start, goal), start)));

    let mut came_from: HashMap<GridPoint, GridPoint> = HashMap::new();
    let mut g_score: HashMap<GridPoint, i64> = HashMap::new();
    g_score.insert(start, 0);

    while let Some(Reverse((_, current))) = open.pop() {
        if current == goal {
            return reconstruct_path(&came_from, current);
        }

        let tentative = g_score[&current] + 1;
        for neighbor in neighbors(current, grid_size, obstacles) {
            if g_score.get(&neighbor).map_or(true, |&g| tentative < g) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                open.push(Reverse((tentative + manhattan(neighbor, goal), neighbor)));
            }
        }
    }

    Vec::new()
}

fn reconstruct_path(
    came_from: &HashMap<GridPoint, GridPoint>,
    goal: GridPoint,
) -> Vec<GridPoint> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&parent) = came_from.get(&current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
#[test]
fn test_straight_line_has_manhattan_length() {
    let obstacles = HashSet::new();
    let start = GridPoint::new(0, 0);
    let goal = GridPoint::new(0, 4);
    let path = find_path(start, goal, 5, &obstacles);
    assert_eq!(
        path,
        vec![
            GridPoint::new(0, 0),
            GridPoint::new(0, 1),
            GridPoint::new(0, 2),
            GridPoint::new(0, 3),
            GridPoint::new(0, 4),
        ]
    );
    assert_eq!(path.len() as i64, manhattan(start, goal) + 1);
}

#[cfg(test)]
#[test]
fn test_path_is_connected_and_avoids_obstacles() {
    let obstacles: HashSet<_> = [GridPoint::new(1, 0), GridPoint::new(1, 1)]
        .into_iter()
        .collect();
    let path = find_path(GridPoint::new(0, 0), GridPoint::new(2, 0), 3, &obstacles);
    assert_eq!(path.first(), Some(&GridPoint::new(0, 0)));
    assert_eq!(path.last(), Some(&GridPoint::new(2, 0)));
    for pair in path.windows(2) {
        assert_eq!(manhattan(pair[0], pair[1]), 1);
    }
    for step in &path {
        assert!(!obstacles.contains(step));
    }
}

#[cfg(test)]
#[test]
fn test_identical_inputs_give_identical_paths() {
    let obstacles: HashSet<_> = [GridPoint::new(3, 3), GridPoint::new(4, 2)]
        .into_iter()
        .collect();
    let first = find_path(GridPoint::new(0, 0), GridPoint::new(7, 5), 8, &obstacles);
    let second = find_path(GridPoint::new(0, 0), GridPoint::new(7, 5), 8, &obstacles);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[cfg(test)]
#[test]
fn test_enclosed_goal_is_unreachable() {
    let obstacles: HashSet<_> = [
        GridPoint::new(1, 2),
        GridPoint::new(3, 2),
        GridPoint::new(2, 1),
        GridPoint::new(2, 3),
    ]
    .into_iter()
    .collect();
    let path = find_path(GridPoint::new(0, 0), GridPoint::new(2, 2), 5, &obstacles);
    assert!(path.is_empty());
}

#[cfg(test)]
#[test]
fn test_start_equals_goal() {
    let obstacles = HashSet::new();
    let path = find_path(GridPoint::new(2, 2), GridPoint::new(2, 2), 5, &obstacles);
    assert_eq!(path, vec![GridPoint::new(2, 2)]);
}
