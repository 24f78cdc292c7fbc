//! Who stands where, captured once per tick.
//!
//! The maze topology is fixed for a level; occupancy is the mutable overlay
//! on top of it. The scheduler builds one [`Occupancy`] snapshot before the
//! decision phase and every ghost decides against that same snapshot.

use std::collections::HashMap;

use crate::components::{Direction, GhostKind, GridPosition};

/// Stable handle for a unit within a snapshot. The ECS shell uses entity bits.
pub type UnitId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Player,
    Ghost(GhostKind),
}

/// A unit as seen by the decision phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub square: GridPosition,
    pub facing: Direction,
}

/// Units indexed by the square they occupy.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    by_square: HashMap<GridPosition, Vec<Unit>>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: Unit) {
        self.by_square.entry(unit.square).or_default().push(unit);
    }

    pub fn with(mut self, unit: Unit) -> Self {
        self.insert(unit);
        self
    }

    /// Units on `square`, in insertion order.
    pub fn units_at(&self, square: GridPosition) -> &[Unit] {
        self.by_square.get(&square).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kind_of(&self, unit: &Unit) -> UnitKind {
        unit.kind
    }
}
