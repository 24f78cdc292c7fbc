//! Chaser AI: targets the player's own square. The most direct pursuer.

use micromegas_tracing::prelude::*;

use super::{Board, GhostAgent};
use crate::components::GridPosition;
use crate::occupancy::Unit;
use crate::resources::EngineConfig;

#[span_fn]
pub fn target(
    _ghost: &GhostAgent,
    player: &Unit,
    _board: &Board,
    _config: &EngineConfig,
) -> Option<GridPosition> {
    Some(player.square)
}
