//! Ambusher AI: targets the square a fixed number of steps ahead of the
//! player, following the board's own edges in the player's facing direction.
//!
//! The walk is the same for every facing. Whatever asymmetry the upward case
//! shows comes from the board topology alone. If the walk leaves the board
//! there is no target and the ghost falls back to a random move.

use micromegas_tracing::prelude::*;

use super::{Board, GhostAgent};
use crate::components::GridPosition;
use crate::occupancy::Unit;
use crate::resources::EngineConfig;

#[span_fn]
pub fn target(
    _ghost: &GhostAgent,
    player: &Unit,
    board: &Board,
    config: &EngineConfig,
) -> Option<GridPosition> {
    board
        .maze
        .walk(player.square, player.facing, config.squares_ahead)
}
