use std::collections::{HashMap, HashSet};

use crate::grid::GridPoint;

/// Time-indexed claims on grid cells.
///
/// Maps each discrete time step to the set of cells claimed at that step.
/// Entries are created lazily, so the table grows with the run instead of
/// capping it at a fixed horizon. The table does not itself reject a second
/// claim on an occupied slot; whether to honor, override, or reroute is the
/// conflict resolver's call.
#[derive(Debug, Default)]
pub struct ReservationTable {
    claims: HashMap<u64, HashSet<GridPoint>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has claimed `point` at `step`.
    pub fn is_free(&self, step: u64, point: GridPoint) -> bool {
        self.claims
            .get(&step)
            .map_or(true, |cells| !cells.contains(&point))
    }

    /// Claims `point` at `step`.
    pub fn reserve(&mut self, step: u64, point: GridPoint) {
        self.claims.entry(step).or_default().insert(point);
    }

    /// Cells claimed at `step`, if any entry exists for that step.
    pub fn claimed(&self, step: u64) -> Option<&HashSet<GridPoint>> {
        self.claims.get(&step)
    }
}

#[cfg(test)]
#[test]
fn test_reserve_and_query() {
    let mut table = ReservationTable::new();
    let cell = GridPoint::new(3, 4);

    assert!(table.is_free(1, cell));
    table.reserve(1, cell);
    assert!(!table.is_free(1, cell));

    // Same cell at a different step stays free
    assert!(table.is_free(2, cell));
    // Different cell at the same step stays free
    assert!(table.is_free(1, GridPoint::new(4, 4)));
}

#[cfg(test)]
#[test]
fn test_table_grows_with_the_run() {
    let mut table = ReservationTable::new();
    let cell = GridPoint::new(0, 0);

    // Far beyond any fixed 2 * grid_size horizon
    table.reserve(1_000_000, cell);
    assert!(!table.is_free(1_000_000, cell));
    assert!(table.is_free(999_999, cell));
}

#[cfg(test)]
#[test]
fn test_claimed_set_accumulates() {
    let mut table = ReservationTable::new();
    table.reserve(5, GridPoint::new(1, 1));
    table.reserve(5, GridPoint::new(2, 2));

    let cells = table.claimed(5).unwrap();
    assert_eq!(cells.len(), 2);
    assert!(cells.contains(&GridPoint::new(1, 1)));
    assert!(cells.contains(&GridPoint::new(2, 2)));
    assert!(table.claimed(6).is_none());
}
