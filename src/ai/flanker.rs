//! Flanker AI: works together with the nearest chaser. It takes a pivot a
//! couple of squares ahead of the player, then targets the point reflected
//! through that pivot from the chaser, so the two close in from both sides.
//! With no chaser on the board it aims at the pivot itself.

use micromegas_tracing::prelude::*;

use super::{Board, GhostAgent, find_nearest};
use crate::components::{GhostKind, GridPosition};
use crate::occupancy::{Unit, UnitKind};
use crate::resources::EngineConfig;

#[span_fn]
pub fn target(
    ghost: &GhostAgent,
    player: &Unit,
    board: &Board,
    config: &EngineConfig,
) -> Option<GridPosition> {
    let pivot = board
        .maze
        .walk(player.square, player.facing, config.flanker_pivot)?;

    let anchor = find_nearest(
        board.maze,
        board.occupancy,
        ghost.square,
        UnitKind::Ghost(GhostKind::Chaser),
    );

    match anchor {
        Some(chaser) => board.maze.square_at(
            2 * pivot.x - chaser.square.x,
            2 * pivot.y - chaser.square.y,
        ),
        None => Some(pivot),
    }
}
