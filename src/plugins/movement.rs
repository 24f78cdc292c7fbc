//! Grid movement. Entities step one square per applied `PendingMove`; every
//! step is re-checked against the maze before it happens.

use bevy::prelude::*;
use micromegas_tracing::prelude::{debug, span_fn, span_scope};

use crate::components::*;
use crate::plugins::GameSet;
use crate::plugins::maze::{AgentKind, MazeMap};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_moves.in_set(GameSet::Apply));
    }
}

/// Move each entity with a pending direction, if the square it leads to
/// exists and the mover may stand there. Blocked movers stay put.
#[allow(clippy::type_complexity)]
#[span_fn]
fn apply_moves(
    maze: Option<Res<MazeMap>>,
    mut query: Query<(Entity, &mut GridPosition, &mut Facing, &PendingMove, Has<Player>)>,
    mut commands: Commands,
) {
    let Some(maze) = maze else { return };
    for (entity, mut pos, mut facing, pending, is_player) in &mut query {
        commands.entity(entity).remove::<PendingMove>();

        let agent = if is_player {
            AgentKind::Player
        } else {
            AgentKind::Ghost
        };
        let target = maze
            .neighbor(*pos, pending.0)
            .filter(|next| maze.is_traversable(*next, agent));

        let Some(target) = target else {
            debug!("blocked: {:?} from ({}, {})", pending.0, pos.x, pos.y);
            continue;
        };

        *pos = target;
        facing.0 = pending.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
