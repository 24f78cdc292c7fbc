//! Shy AI: chases the player from a distance but loses its nerve up close.
//! Within `shy_radius` path steps it heads back to its home corner instead.

use micromegas_tracing::prelude::*;

use super::{Board, GhostAgent, shortest_path};
use crate::components::GridPosition;
use crate::occupancy::Unit;
use crate::plugins::maze::AgentKind;
use crate::resources::EngineConfig;

#[span_fn]
pub fn target(
    ghost: &GhostAgent,
    player: &Unit,
    board: &Board,
    config: &EngineConfig,
) -> Option<GridPosition> {
    let distance = shortest_path(board.maze, ghost.square, player.square, AgentKind::Ghost)
        .map(|path| path.len());

    match distance {
        Some(steps) if steps <= config.shy_radius => Some(ghost.home),
        _ => Some(player.square),
    }
}
