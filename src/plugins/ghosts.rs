//! Ghost scheduling: each ghost decides on its own cadence, all against one
//! snapshot of the board taken at the start of the decision phase.

use bevy::prelude::*;
use micromegas_tracing::prelude::span_scope;

use crate::ai::{self, Board, Decision, DecisionObserver, GhostAgent, Outcome, TracingObserver};
use crate::components::*;
use crate::occupancy::{Occupancy, Unit, UnitKind};
use crate::plugins::GameSet;
use crate::plugins::maze::MazeMap;
use crate::plugins::mode::ModeSchedule;
use crate::resources::{DecisionCounters, EngineConfig, GhostRng};

pub struct GhostPlugin;

impl Plugin for GhostPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DecisionLog>();
        app.init_resource::<DecisionCounters>();
        app.add_systems(Update, ghost_decisions.in_set(GameSet::Decide));
    }
}

/// Where decisions are reported. Debug logging unless replaced.
#[derive(Resource)]
pub struct DecisionLog(pub Box<dyn DecisionObserver + Send + Sync>);

impl Default for DecisionLog {
    fn default() -> Self {
        Self(Box::new(TracingObserver))
    }
}

/// The most recent decision a ghost made.
#[derive(Component, Debug, Clone, Copy)]
pub struct LastDecision(pub Decision);

/// Snapshot every unit's square and facing.
pub fn snapshot<'a>(
    players: impl IntoIterator<Item = (Entity, &'a GridPosition, &'a Facing)>,
    ghosts: impl IntoIterator<Item = (Entity, &'a GridPosition, &'a Facing, &'a GhostKind)>,
) -> Occupancy {
    let mut occupancy = Occupancy::new();
    for (entity, pos, facing) in players {
        occupancy.insert(Unit {
            id: entity.to_bits(),
            kind: UnitKind::Player,
            square: *pos,
            facing: facing.0,
        });
    }
    for (entity, pos, facing, kind) in ghosts {
        occupancy.insert(Unit {
            id: entity.to_bits(),
            kind: UnitKind::Ghost(*kind),
            square: *pos,
            facing: facing.0,
        });
    }
    occupancy
}

/// Tick every ghost's timer; the ones that come due pick a direction.
/// Picked directions are applied later by the movement plugin, so no ghost
/// sees another ghost's move from the same frame.
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
fn ghost_decisions(
    time: Res<Time>,
    maze: Option<Res<MazeMap>>,
    config: Res<EngineConfig>,
    schedule: Res<ModeSchedule>,
    mut rng: ResMut<GhostRng>,
    mut log: ResMut<DecisionLog>,
    mut counters: ResMut<DecisionCounters>,
    players: Query<(Entity, &GridPosition, &Facing), (With<Player>, Without<Ghost>)>,
    mut ghosts: Query<
        (Entity, &GridPosition, &Facing, &GhostKind, &HomeCorner, &mut MoveTimer),
        (With<Ghost>, Without<Player>),
    >,
    mut commands: Commands,
) {
    span_scope!("ghost_decisions");

    let Some(maze) = maze else {
        return;
    };

    let occupancy = snapshot(
        &players,
        ghosts
            .iter()
            .map(|(entity, pos, facing, kind, _, _)| (entity, pos, facing, kind)),
    );
    let board = Board::new(&maze, &occupancy);
    let mode = schedule.current();

    for (entity, pos, _, kind, home, mut timer) in &mut ghosts {
        timer.tick(time.delta());
        if !timer.just_finished() {
            continue;
        }

        let ghost = GhostAgent {
            id: entity.to_bits(),
            kind: *kind,
            square: *pos,
            home: home.0,
        };
        let decision = ai::decide(&ghost, mode, &board, &config, &mut rng.0);
        log.0.on_decision(&ghost, &decision);

        match decision.outcome {
            Outcome::FollowPath(_) => counters.followed_path += 1,
            Outcome::Fallback {
                direction: Some(_), ..
            } => counters.random_fallback += 1,
            Outcome::Fallback { direction: None, .. } => counters.stuck += 1,
        }

        let mut ghost_commands = commands.entity(entity);
        ghost_commands.insert(LastDecision(decision));
        if let Some(dir) = decision.direction() {
            ghost_commands.insert(PendingMove(dir));
        }

        // Time past the deadline stays on the clock for the next period.
        timer.set_duration(ai::move_interval(*kind, &config, &mut rng.0));
    }
}
