//! Nearest-unit search over the board graph.

use pathfinding::prelude::bfs_reach;

use crate::components::GridPosition;
use crate::occupancy::{Occupancy, Unit, UnitKind};
use crate::plugins::maze::MazeMap;

/// Breadth-first search outward from `from` for the closest unit of `kind`,
/// measured in graph steps over non-wall squares. When several such units
/// share the first square reached, the earliest inserted one wins.
pub fn find_nearest(
    maze: &MazeMap,
    occupancy: &Occupancy,
    from: GridPosition,
    kind: UnitKind,
) -> Option<Unit> {
    bfs_reach(from, |pos| maze.walkable_neighbors(*pos)).find_map(|pos| {
        occupancy
            .units_at(pos)
            .iter()
            .find(|unit| occupancy.kind_of(unit) == kind)
            .copied()
    })
}
