//! Priority-based multi-robot dig-and-haul planning on 4-connected grids.
//!
//! A [`Planner`] owns a set of [`robot::Robot`]s, a shared obstacle set, and
//! a queue of dig locations. [`Planner::assign_tasks`] greedily hands each
//! robot the nearest queued dig site, walks it there and on to a neighbor
//! cell of a drop-off site under a time-indexed reservation scheme, and
//! resolves contested cells with a priority rule. The accumulated tick count
//! and the per-robot traces are the observable outputs.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub mod conflicts;
pub mod grid;
pub mod pathfinding;
pub mod render;
pub mod reservation_system;
pub mod robot;

use conflicts::{right_of_way, RightOfWay};
use grid::{manhattan, GridPoint};
use pathfinding::find_path;
use reservation_system::ReservationTable;
use robot::Robot;

/// Errors surfaced by the planning loop.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no robots available for {pending} queued dig locations")]
    NoRobots { pending: usize },
    #[error("no drop-off sites configured")]
    NoDropOffSites,
    #[error("no free cell adjacent to drop-off site {site}")]
    NoDropOffAccess { site: GridPoint },
}

/// A robot's starting state in a [`Scenario`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotSpec {
    pub name: String,
    pub start: GridPoint,
    pub priority: i32,
}

/// A full planning problem, loadable from a JSON document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub grid_size: i64,
    pub robots: Vec<RobotSpec>,
    #[serde(default)]
    pub obstacles: Vec<GridPoint>,
    pub drop_off_locations: Vec<GridPoint>,
    #[serde(default)]
    pub dig_locations: Vec<GridPoint>,
}

impl Scenario {
    /// Parses a scenario document from its JSON text.
    pub fn from_json(content: &str) -> Result<Scenario, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// The two-robot reference setup used by the demos.
    pub fn reference() -> Scenario {
        Scenario {
            grid_size: 10,
            robots: vec![
                RobotSpec {
                    name: "Robot 1".into(),
                    start: GridPoint::new(0, 0),
                    priority: 2,
                },
                RobotSpec {
                    name: "Robot 2".into(),
                    start: GridPoint::new(9, 9),
                    priority: 1,
                },
            ],
            obstacles: [
                (0, 2),
                (0, 6),
                (1, 1),
                (1, 3),
                (3, 2),
                (6, 1),
                (7, 3),
                (7, 9),
                (9, 1),
            ]
            .iter()
            .map(|&(x, y)| GridPoint::new(x, y))
            .collect(),
            drop_off_locations: vec![GridPoint::new(0, 9), GridPoint::new(5, 5)],
            dig_locations: vec![
                GridPoint::new(1, 7),
                GridPoint::new(7, 4),
                GridPoint::new(8, 1),
            ],
        }
    }

    /// Builds a planner and enqueues the scenario's dig locations.
    pub fn into_planner(self) -> Planner {
        let robots = self
            .robots
            .iter()
            .map(|spec| Robot::new(spec.name.clone(), spec.start, spec.priority))
            .collect();
        let mut planner = Planner::new(
            robots,
            self.grid_size,
            self.drop_off_locations,
            self.obstacles.into_iter().collect(),
        );
        for dig in self.dig_locations {
            planner.add_dig_location(dig);
        }
        planner
    }
}

/// Central planner: owns the robots, the shared obstacle set, and the work
/// queue, and drives the dig → drop-off cycles to completion.
#[derive(Debug)]
pub struct Planner {
    robots: Vec<Robot>,
    grid_size: i64,
    drop_off_locations: Vec<GridPoint>,
    obstacles: HashSet<GridPoint>,
    dig_locations: VecDeque<GridPoint>,
    dig_points: Vec<GridPoint>,
    drop_off_points: Vec<GridPoint>,
    positions: HashMap<GridPoint, usize>,
    total_time: u64,
}

impl Planner {
    /// Robots are stored sorted by ascending numeric priority; that is also
    /// the turn order of the scheduling loop.
    pub fn new(
        mut robots: Vec<Robot>,
        grid_size: i64,
        drop_off_locations: Vec<GridPoint>,
        obstacles: HashSet<GridPoint>,
    ) -> Self {
        robots.sort_by_key(|robot| robot.priority);
        let positions = robots
            .iter()
            .enumerate()
            .map(|(idx, robot)| (robot.position, idx))
            .collect();
        Self {
            robots,
            grid_size,
            drop_off_locations,
            obstacles,
            dig_locations: VecDeque::new(),
            dig_points: Vec::new(),
            drop_off_points: Vec::new(),
            positions,
            total_time: 0,
        }
    }

    /// Queues a dig location. Duplicates are legal and will be worked twice.
    pub fn add_dig_location(&mut self, location: GridPoint) {
        info!("added dig location at {}", location);
        self.dig_locations.push_back(location);
    }

    /// Runs the full scheduling loop until the work queue is empty.
    ///
    /// Robots take turns in ascending priority order; each turn claims the
    /// nearest queued dig site, walks there, digs, walks to a free neighbor
    /// of the nearest drop-off site, and offloads. Every executed move, dig,
    /// and offload adds one tick to the estimated completion time.
    pub fn assign_tasks(&mut self) -> Result<(), PlanError> {
        self.total_time = 0;
        let mut time_step: u64 = 0;
        let mut reservations = ReservationTable::new();

        if self.robots.is_empty() && !self.dig_locations.is_empty() {
            return Err(PlanError::NoRobots {
                pending: self.dig_locations.len(),
            });
        }

        while !self.dig_locations.is_empty() {
            for idx in 0..self.robots.len() {
                let Some(target) = self.claim_nearest_dig(idx) else {
                    break;
                };

                self.walk_dig_leg(idx, target, time_step, &mut reservations);

                self.dig_points.push(target);
                self.robots[idx].dig();
                self.total_time += 1;
                time_step += 1;

                let drop_off = self.nearest_drop_off(idx)?;
                let staging = self.adjacent_drop_cell(drop_off, self.robots[idx].position)?;
                self.walk_drop_leg(idx, staging, time_step, &mut reservations);

                self.drop_off_points.push(drop_off);
                self.robots[idx].offload();
                self.total_time += 1;
                time_step += 1;
            }
        }
        Ok(())
    }

    /// Total ticks accumulated by the last [`Planner::assign_tasks`] run.
    pub fn get_estimated_completion_time(&self) -> u64 {
        self.total_time
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn grid_size(&self) -> i64 {
        self.grid_size
    }

    pub fn obstacles(&self) -> &HashSet<GridPoint> {
        &self.obstacles
    }

    pub fn drop_off_locations(&self) -> &[GridPoint] {
        &self.drop_off_locations
    }

    /// Dig sites worked so far, in completion order.
    pub fn dig_points(&self) -> &[GridPoint] {
        &self.dig_points
    }

    /// Drop-off sites used so far, one entry per delivery.
    pub fn drop_off_points(&self) -> &[GridPoint] {
        &self.drop_off_points
    }

    pub fn pending_dig_locations(&self) -> usize {
        self.dig_locations.len()
    }

    /// Pops the queued dig location nearest to robot `idx` by Manhattan
    /// distance, the first match winning ties.
    fn claim_nearest_dig(&mut self, idx: usize) -> Option<GridPoint> {
        let from = self.robots[idx].position;
        let mut best: Option<(usize, i64)> = None;
        for (i, &location) in self.dig_locations.iter().enumerate() {
            let distance = manhattan(from, location);
            if best.map_or(true, |(_, shortest)| distance < shortest) {
                best = Some((i, distance));
            }
        }
        let (i, _) = best?;
        self.dig_locations.remove(i)
    }

    /// The drop-off site nearest to robot `idx`.
    fn nearest_drop_off(&self, idx: usize) -> Result<GridPoint, PlanError> {
        let from = self.robots[idx].position;
        self.drop_off_locations
            .iter()
            .copied()
            .min_by_key(|&site| manhattan(from, site))
            .ok_or(PlanError::NoDropOffSites)
    }

    /// The in-bounds, unobstructed neighbor of `site` closest to `from`.
    /// Robots stage deliveries next to a drop-off; the site cell itself is
    /// never entered.
    fn adjacent_drop_cell(&self, site: GridPoint, from: GridPoint) -> Result<GridPoint, PlanError> {
        let candidates = [
            GridPoint::new(site.x + 1, site.y),
            GridPoint::new(site.x - 1, site.y),
            GridPoint::new(site.x, site.y + 1),
            GridPoint::new(site.x, site.y - 1),
        ];
        candidates
            .into_iter()
            .filter(|cell| cell.in_bounds(self.grid_size) && !self.obstacles.contains(cell))
            .min_by_key(|&cell| manhattan(from, cell))
            .ok_or(PlanError::NoDropOffAccess { site })
    }

    /// Walks robot `idx` along an A* route toward the dig site `goal`, one
    /// reserved cell at a time.
    ///
    /// A contested cell triggers the right-of-way rule: the winner advances
    /// (displacing the occupant in the occupancy index), the loser replans.
    /// Either way the leg ends for this turn, and a won cell is additionally
    /// converted into a permanent obstacle before the replan (see DESIGN.md
    /// on both quirks).
    fn walk_dig_leg(
        &mut self,
        idx: usize,
        goal: GridPoint,
        time_step: u64,
        reservations: &mut ReservationTable,
    ) {
        let mut route = find_path(self.robots[idx].position, goal, self.grid_size, &self.obstacles);

        let mut k = 1;
        while k < route.len() {
            let step = route[k];
            if reservations.is_free(time_step + 1, step) {
                self.advance(idx, step);
                reservations.reserve(time_step + 1, step);
                k += 1;
                continue;
            }

            let occupant = self
                .positions
                .get(&step)
                .copied()
                .filter(|&other| other != idx);
            let granted = match occupant {
                Some(occ) => right_of_way(&self.robots[idx], &self.robots[occ]) == RightOfWay::Mover,
                None => true,
            };

            if granted {
                let previous = self.robots[idx].position;
                if let Some(occ) = occupant {
                    debug!(
                        robot = %self.robots[idx].name,
                        "displaces {} from {}",
                        self.robots[occ].name,
                        step
                    );
                    self.positions.insert(previous, occ);
                }
                self.advance(idx, step);
                reservations.reserve(time_step + 1, step);
                // The contested cell stays blocked for every later search.
                self.obstacles.insert(step);
                route = find_path(self.robots[idx].position, goal, self.grid_size, &self.obstacles);
            } else {
                debug!(robot = %self.robots[idx].name, "yields {} and replans", step);
                route = find_path(self.robots[idx].position, goal, self.grid_size, &self.obstacles);
            }
            // The fresh route is not walked this turn; the leg ends here.
            debug!(
                robot = %self.robots[idx].name,
                abandoned = route.len(),
                "leg cut short by contention"
            );
            break;
        }
    }

    /// Walks the delivery leg toward `goal`. Contention here carries no
    /// priority logic: the robot replans and the leg ends for this turn.
    fn walk_drop_leg(
        &mut self,
        idx: usize,
        goal: GridPoint,
        time_step: u64,
        reservations: &mut ReservationTable,
    ) {
        let mut route = find_path(self.robots[idx].position, goal, self.grid_size, &self.obstacles);

        let mut k = 1;
        while k < route.len() {
            let step = route[k];
            if reservations.is_free(time_step + 1, step) {
                self.advance(idx, step);
                reservations.reserve(time_step + 1, step);
                k += 1;
            } else {
                route = find_path(self.robots[idx].position, goal, self.grid_size, &self.obstacles);
                debug!(
                    robot = %self.robots[idx].name,
                    abandoned = route.len(),
                    "delivery leg cut short by contention"
                );
                break;
            }
        }
    }

    /// Executes one accepted move: trace, occupancy index, tick.
    fn advance(&mut self, idx: usize, step: GridPoint) {
        let previous = self.robots[idx].position;
        self.robots[idx].move_to(step);
        if self.positions.get(&previous) == Some(&idx) {
            self.positions.remove(&previous);
        }
        self.positions.insert(step, idx);
        self.total_time += 1;
    }
}

/// Parses an octile map body into a grid size and obstacle set.
///
/// The format is the MAPF benchmark one: four header lines, then rows of `.`
/// (free) and `@` (blocked) cells; other characters are skipped. The world
/// is square, so the size is the larger of the two dimensions.
pub fn parse_grid(content: &str) -> (i64, HashSet<GridPoint>) {
    let mut obstacles = HashSet::new();
    let mut lines = content.lines();

    // Skip the header lines
    lines.next(); // type octile
    lines.next(); // height
    lines.next(); // width
    lines.next(); // map

    let mut rows = 0i64;
    let mut width = 0i64;
    for line in lines {
        let mut y = 0i64;
        for ch in line.chars() {
            match ch {
                '.' => y += 1,
                '@' => {
                    obstacles.insert(GridPoint::new(rows, y));
                    y += 1;
                }
                _ => continue,
            }
        }
        if y > 0 {
            width = width.max(y);
            rows += 1;
        }
    }
    (rows.max(width), obstacles)
}

#[cfg(test)]
#[test]
fn test_adjacent_drop_cell_prefers_nearest() {
    let planner = Planner::new(Vec::new(), 10, Vec::new(), HashSet::new());
    let cell = planner
        .adjacent_drop_cell(GridPoint::new(5, 5), GridPoint::new(7, 4))
        .unwrap();
    assert_eq!(cell, GridPoint::new(6, 5));
}

#[cfg(test)]
#[test]
fn test_adjacent_drop_cell_fails_when_enclosed() {
    let site = GridPoint::new(5, 5);
    let obstacles: HashSet<_> = [
        GridPoint::new(6, 5),
        GridPoint::new(4, 5),
        GridPoint::new(5, 6),
        GridPoint::new(5, 4),
    ]
    .into_iter()
    .collect();
    let planner = Planner::new(Vec::new(), 10, vec![site], obstacles);
    assert_eq!(
        planner.adjacent_drop_cell(site, GridPoint::new(0, 0)),
        Err(PlanError::NoDropOffAccess { site })
    );
}

#[cfg(test)]
#[test]
fn test_assign_tasks_without_robots_fails() {
    let mut planner = Planner::new(Vec::new(), 10, vec![GridPoint::new(5, 5)], HashSet::new());
    planner.add_dig_location(GridPoint::new(1, 1));
    assert_eq!(
        planner.assign_tasks(),
        Err(PlanError::NoRobots { pending: 1 })
    );
}

#[cfg(test)]
#[test]
fn test_duplicate_dig_locations_are_worked_twice() {
    let robots = vec![Robot::new("Robot 1", GridPoint::new(0, 0), 1)];
    let mut planner = Planner::new(robots, 5, vec![GridPoint::new(4, 4)], HashSet::new());
    planner.add_dig_location(GridPoint::new(2, 2));
    planner.add_dig_location(GridPoint::new(2, 2));
    planner.assign_tasks().unwrap();

    assert_eq!(planner.dig_points(), &[GridPoint::new(2, 2), GridPoint::new(2, 2)]);
    assert_eq!(planner.robots()[0].drop_off_count(), 2);
}

#[cfg(test)]
#[test]
fn test_dig_leg_displacement_grants_and_blocks_the_cell() {
    let robots = vec![
        Robot::new("Blocker", GridPoint::new(1, 0), 1),
        Robot::new("Mover", GridPoint::new(0, 0), 5),
    ];
    let mut planner = Planner::new(robots, 6, Vec::new(), HashSet::new());
    let mut reservations = ReservationTable::new();
    reservations.reserve(1, GridPoint::new(1, 0));

    // Sorted by priority: Blocker is index 0, Mover is index 1
    planner.walk_dig_leg(1, GridPoint::new(3, 0), 0, &mut reservations);

    let mover = &planner.robots()[1];
    let blocker = &planner.robots()[0];
    assert_eq!(mover.position, GridPoint::new(1, 0));
    // The occupant is displaced in the bookkeeping only, never moved
    assert_eq!(blocker.position, GridPoint::new(1, 0));
    assert_eq!(planner.positions.get(&GridPoint::new(0, 0)), Some(&0));
    assert_eq!(planner.positions.get(&GridPoint::new(1, 0)), Some(&1));
    // The contested cell became a permanent obstacle and one tick elapsed
    assert!(planner.obstacles().contains(&GridPoint::new(1, 0)));
    assert_eq!(planner.get_estimated_completion_time(), 1);
}

#[cfg(test)]
#[test]
fn test_dig_leg_yields_to_higher_priority_occupant() {
    let robots = vec![
        Robot::new("Mover", GridPoint::new(0, 0), 1),
        Robot::new("Blocker", GridPoint::new(1, 0), 5),
    ];
    let mut planner = Planner::new(robots, 6, Vec::new(), HashSet::new());
    let mut reservations = ReservationTable::new();
    reservations.reserve(1, GridPoint::new(1, 0));

    planner.walk_dig_leg(0, GridPoint::new(3, 0), 0, &mut reservations);

    let mover = &planner.robots()[0];
    assert_eq!(mover.position, GridPoint::new(0, 0));
    assert_eq!(mover.history().len(), 1);
    assert!(planner.obstacles().is_empty());
    assert_eq!(planner.get_estimated_completion_time(), 0);
}

#[cfg(test)]
#[test]
fn test_scenario_from_json() {
    let content = r#"{
        "grid_size": 6,
        "robots": [
            {"name": "Robot 1", "start": {"x": 0, "y": 0}, "priority": 2},
            {"name": "Robot 2", "start": {"x": 5, "y": 5}, "priority": 1}
        ],
        "obstacles": [{"x": 2, "y": 2}],
        "drop_off_locations": [{"x": 0, "y": 5}],
        "dig_locations": [{"x": 3, "y": 1}]
    }"#;
    let scenario = Scenario::from_json(content).unwrap();
    let planner = scenario.into_planner();

    assert_eq!(planner.grid_size(), 6);
    assert_eq!(planner.pending_dig_locations(), 1);
    assert!(planner.obstacles().contains(&GridPoint::new(2, 2)));
    // Lower numeric priority is visited first
    assert_eq!(planner.robots()[0].name, "Robot 2");
}

#[cfg(test)]
#[test]
fn test_parse_grid_octile_map() {
    let content = "type octile\nheight 3\nwidth 3\nmap\n.@.\n...\n@..\n";
    let (grid_size, obstacles) = parse_grid(content);
    assert_eq!(grid_size, 3);
    assert_eq!(obstacles.len(), 2);
    assert!(obstacles.contains(&GridPoint::new(0, 1)));
    assert!(obstacles.contains(&GridPoint::new(2, 0)));
}
