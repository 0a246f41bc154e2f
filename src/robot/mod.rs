use std::fmt;

use tracing::debug;

use crate::grid::GridPoint;

/// One entry in a robot's execution trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobotEvent {
    Position(GridPoint),
    Dig,
    DropOff(u32),
}

impl fmt::Display for RobotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotEvent::Position(p) => write!(f, "{}", p),
            RobotEvent::Dig => write!(f, "dig"),
            RobotEvent::DropOff(n) => write!(f, "drop off {}", n),
        }
    }
}

/// Mutable state of a single robot.
///
/// The planner performs every validation; the methods here apply state
/// changes unconditionally and append to the trace. The trace is append-only
/// and its order is the authoritative record of what the robot did.
#[derive(Clone, Debug)]
pub struct Robot {
    pub name: String,
    pub priority: i32,
    pub position: GridPoint,
    pub initial_position: GridPoint,
    carrying: bool,
    drop_off_count: u32,
    history: Vec<RobotEvent>,
}

impl Robot {
    pub fn new(name: impl Into<String>, start: GridPoint, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            position: start,
            initial_position: start,
            carrying: false,
            drop_off_count: 0,
            history: vec![RobotEvent::Position(start)],
        }
    }

    /// Unconditionally relocates the robot. Adjacency and bounds are the
    /// caller's responsibility.
    pub fn move_to(&mut self, target: GridPoint) {
        self.position = target;
        self.history.push(RobotEvent::Position(target));
        debug!(robot = %self.name, "moved to {}", target);
    }

    /// Picks up a payload at the current cell.
    pub fn dig(&mut self) {
        self.carrying = true;
        self.history.push(RobotEvent::Dig);
        debug!(robot = %self.name, "dug at {}", self.position);
    }

    /// Delivers the payload and counts the drop-off.
    pub fn offload(&mut self) {
        self.carrying = false;
        self.drop_off_count += 1;
        self.history.push(RobotEvent::DropOff(self.drop_off_count));
        debug!(robot = %self.name, "offloaded delivery {}", self.drop_off_count);
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying
    }

    pub fn drop_off_count(&self) -> u32 {
        self.drop_off_count
    }

    pub fn history(&self) -> &[RobotEvent] {
        &self.history
    }

    /// The trace rendered as textual log lines.
    pub fn path_log(&self) -> Vec<String> {
        self.history.iter().map(|event| event.to_string()).collect()
    }
}

#[cfg(test)]
#[test]
fn test_move_dig_offload_trace() {
    let mut robot = Robot::new("Robot 1", GridPoint::new(0, 0), 1);
    assert_eq!(robot.history(), &[RobotEvent::Position(GridPoint::new(0, 0))]);

    robot.move_to(GridPoint::new(0, 1));
    robot.dig();
    assert!(robot.is_carrying());

    robot.move_to(GridPoint::new(1, 1));
    robot.offload();
    assert!(!robot.is_carrying());
    assert_eq!(robot.drop_off_count(), 1);

    robot.dig();
    robot.offload();
    assert_eq!(robot.drop_off_count(), 2);
    assert_eq!(
        robot.history().last(),
        Some(&RobotEvent::DropOff(2))
    );
}

#[cfg(test)]
#[test]
fn test_path_log_format() {
    let mut robot = Robot::new("Robot 1", GridPoint::new(0, 0), 1);
    robot.move_to(GridPoint::new(0, 1));
    robot.dig();
    robot.offload();
    assert_eq!(
        robot.path_log(),
        vec!["(0,0)", "(0,1)", "dig", "drop off 1"]
    );
}
