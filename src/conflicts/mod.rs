use crate::robot::Robot;

/// Which side keeps a contested cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RightOfWay {
    /// The moving robot takes the cell; the occupant is displaced in the
    /// planner's occupancy bookkeeping.
    Mover,
    /// The occupant keeps the cell; the mover replans.
    Occupant,
}

/// Decides a movement conflict between the robot that wants a cell and the
/// robot currently bookkept there.
///
/// The mover wins when its numeric priority is greater than or equal to the
/// occupant's, even though the turn order visits numerically *lower*
/// priorities first. Whether "higher priority" means a larger or smaller
/// number is therefore inconsistent between the two sites; the comparison is
/// kept literally rather than picking a reading.
pub fn right_of_way(mover: &Robot, occupant: &Robot) -> RightOfWay {
    if mover.priority >= occupant.priority {
        RightOfWay::Mover
    } else {
        RightOfWay::Occupant
    }
}

#[cfg(test)]
use crate::grid::GridPoint;

#[cfg(test)]
#[test]
fn test_higher_value_takes_the_cell() {
    let mover = Robot::new("mover", GridPoint::new(0, 0), 3);
    let occupant = Robot::new("occupant", GridPoint::new(0, 1), 2);
    assert_eq!(right_of_way(&mover, &occupant), RightOfWay::Mover);
    assert_eq!(right_of_way(&occupant, &mover), RightOfWay::Occupant);
}

#[cfg(test)]
#[test]
fn test_equal_priority_favors_the_mover() {
    let mover = Robot::new("mover", GridPoint::new(0, 0), 2);
    let occupant = Robot::new("occupant", GridPoint::new(0, 1), 2);
    assert_eq!(right_of_way(&mover, &occupant), RightOfWay::Mover);
}
