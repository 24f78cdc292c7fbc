pub mod ghosts;
pub mod maze;
pub mod mode;
pub mod movement;
pub mod telemetry;

use bevy::prelude::*;

/// Per-frame ordering: the phase clock runs first, then every ghost decides
/// against the same positions, then all moves are applied together.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    Mode,
    Decide,
    Apply,
}
