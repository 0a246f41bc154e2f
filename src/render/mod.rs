use crate::Planner;

/// Which moment of a run a snapshot shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridStage {
    /// Obstacles, drop-off sites, and robot starting cells.
    Initial,
    /// Starting cells plus the dig sites that were worked.
    AfterDigs,
    /// Final robot cells, numbered drop-off sites, and worked dig sites.
    Final,
}

/// Renders one snapshot of the planner's world as a char grid.
///
/// Legend: `.` free, `#` obstacle, `O` drop-off site (`1`..`9` in the final
/// stage), `R` robot, `D` worked dig site. Later markers overwrite earlier
/// ones, so a robot parked on a worked site shows as `D`.
pub fn snapshot(planner: &Planner, stage: GridStage) -> Vec<Vec<char>> {
    let grid_size = planner.grid_size();
    let n = grid_size as usize;
    let mut grid = vec![vec!['.'; n]; n];

    for obstacle in planner.obstacles() {
        if obstacle.in_bounds(grid_size) {
            grid[obstacle.x as usize][obstacle.y as usize] = '#';
        }
    }

    for (i, site) in planner.drop_off_locations().iter().enumerate() {
        if !site.in_bounds(grid_size) {
            continue;
        }
        grid[site.x as usize][site.y as usize] = match stage {
            GridStage::Final => char::from_digit(i as u32 + 1, 10).unwrap_or('O'),
            _ => 'O',
        };
    }

    for robot in planner.robots() {
        let cell = match stage {
            GridStage::Final => robot.position,
            _ => robot.initial_position,
        };
        if cell.in_bounds(grid_size) {
            grid[cell.x as usize][cell.y as usize] = 'R';
        }
    }

    if stage != GridStage::Initial {
        for dig in planner.dig_points() {
            if dig.in_bounds(grid_size) {
                grid[dig.x as usize][dig.y as usize] = 'D';
            }
        }
    }

    grid
}

/// Joins a snapshot into printable lines, one row per line.
pub fn render_lines(grid: &[Vec<char>]) -> String {
    grid.iter()
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
use std::collections::HashSet;
#[cfg(test)]
use crate::grid::GridPoint;
#[cfg(test)]
use crate::robot::Robot;

#[cfg(test)]
#[test]
fn test_initial_snapshot_markers() {
    let robots = vec![Robot::new("Robot 1", GridPoint::new(0, 0), 1)];
    let obstacles: HashSet<_> = [GridPoint::new(1, 1)].into_iter().collect();
    let planner = Planner::new(robots, 4, vec![GridPoint::new(3, 3)], obstacles);

    let grid = snapshot(&planner, GridStage::Initial);
    assert_eq!(grid[0][0], 'R');
    assert_eq!(grid[1][1], '#');
    assert_eq!(grid[3][3], 'O');
    assert_eq!(grid[2][2], '.');

    let lines = render_lines(&grid);
    assert_eq!(lines.lines().count(), 4);
    assert!(lines.starts_with("R..."));
}

#[cfg(test)]
#[test]
fn test_stages_after_a_run() {
    let robots = vec![Robot::new("Robot 1", GridPoint::new(0, 0), 1)];
    let obstacles: HashSet<_> = [GridPoint::new(1, 1)].into_iter().collect();
    let mut planner = Planner::new(robots, 4, vec![GridPoint::new(3, 3)], obstacles);
    planner.add_dig_location(GridPoint::new(2, 0));
    planner.assign_tasks().unwrap();

    let after_digs = snapshot(&planner, GridStage::AfterDigs);
    assert_eq!(after_digs[2][0], 'D');
    assert_eq!(after_digs[0][0], 'R');

    let final_grid = snapshot(&planner, GridStage::Final);
    assert_eq!(final_grid[3][3], '1');
    assert_eq!(final_grid[2][0], 'D');
    // The robot ends parked next to the drop-off site
    assert_eq!(final_grid[2][3], 'R');
}
