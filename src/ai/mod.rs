//! Ghost AI. Each ghost kind has its own pursuit targeting rule; everything
//! after the target (path search, first step, random fallback) is shared.

pub mod ambusher;
pub mod chaser;
pub mod flanker;
pub mod locator;
pub mod observer;
pub mod shy;

use std::time::Duration;

use micromegas_tracing::prelude::*;
use pathfinding::prelude::bfs;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::components::{Direction, GhostKind, GridPosition};
use crate::occupancy::{Occupancy, Unit, UnitId, UnitKind};
use crate::plugins::maze::{AgentKind, MazeMap};
use crate::resources::{EngineConfig, Mode};

pub use locator::find_nearest;
pub use observer::{DecisionObserver, NoopObserver, RecordingObserver, TracingObserver};

/// Read-only view of the world for one decision phase.
#[derive(Debug, Clone, Copy)]
pub struct Board<'a> {
    pub maze: &'a MazeMap,
    pub occupancy: &'a Occupancy,
}

impl<'a> Board<'a> {
    pub fn new(maze: &'a MazeMap, occupancy: &'a Occupancy) -> Self {
        Self { maze, occupancy }
    }
}

/// The deciding ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostAgent {
    pub id: UnitId,
    pub kind: GhostKind,
    pub square: GridPosition,
    pub home: GridPosition,
}

/// Why a ghost moved randomly instead of following a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoPlayer,
    NoTarget,
    AtTarget,
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First step of a shortest path to the target.
    FollowPath(Direction),
    /// Random legal move. None when no legal move exists.
    Fallback {
        reason: FallbackReason,
        direction: Option<Direction>,
    },
}

/// Everything one decision cycle worked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub mode: Mode,
    /// Square of the player the target was derived from.
    pub player: Option<GridPosition>,
    pub target: Option<GridPosition>,
    pub outcome: Outcome,
}

impl Decision {
    pub fn direction(&self) -> Option<Direction> {
        match self.outcome {
            Outcome::FollowPath(dir) => Some(dir),
            Outcome::Fallback { direction, .. } => direction,
        }
    }
}

/// Directions along a shortest path for `agent`, or None if `destination`
/// cannot be reached. Empty when `start == destination`.
///
/// Neighbors are expanded in N, S, E, W order, so equal boards give equal
/// paths.
pub fn shortest_path(
    maze: &MazeMap,
    start: GridPosition,
    destination: GridPosition,
    agent: AgentKind,
) -> Option<Vec<Direction>> {
    let squares = bfs(
        &start,
        |pos| maze.traversable_neighbors(*pos, agent),
        |pos| *pos == destination,
    )?;

    squares
        .windows(2)
        .map(|step| maze.direction_between(step[0], step[1]))
        .collect()
}

/// Manhattan distance.
pub fn manhattan(a: &GridPosition, b: &GridPosition) -> u32 {
    (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
}

/// A uniformly random legal direction for `agent` at `pos`.
pub fn random_legal_direction(
    maze: &MazeMap,
    pos: GridPosition,
    agent: AgentKind,
    rng: &mut impl Rng,
) -> Option<Direction> {
    maze.legal_directions(pos, agent).choose(rng).copied()
}

/// Pursuit target for the ghost's own variant.
pub fn pursuit_target(
    ghost: &GhostAgent,
    player: &Unit,
    board: &Board,
    config: &EngineConfig,
) -> Option<GridPosition> {
    match ghost.kind {
        GhostKind::Chaser => chaser::target(ghost, player, board, config),
        GhostKind::Ambusher => ambusher::target(ghost, player, board, config),
        GhostKind::Flanker => flanker::target(ghost, player, board, config),
        GhostKind::Shy => shy::target(ghost, player, board, config),
    }
}

/// Work out where `ghost` goes next. Never fails: anything that cannot be
/// resolved falls back to a random legal direction.
#[span_fn]
pub fn decide(
    ghost: &GhostAgent,
    mode: Mode,
    board: &Board,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Decision {
    let (player, target) = match mode {
        Mode::Patrol => (None, Some(ghost.home)),
        Mode::Pursuit => {
            let Some(player) =
                find_nearest(board.maze, board.occupancy, ghost.square, UnitKind::Player)
            else {
                return fallback(ghost, mode, board, FallbackReason::NoPlayer, None, None, rng);
            };
            (
                Some(player.square),
                pursuit_target(ghost, &player, board, config),
            )
        }
    };

    let Some(target) = target else {
        return fallback(ghost, mode, board, FallbackReason::NoTarget, player, None, rng);
    };

    match shortest_path(board.maze, ghost.square, target, AgentKind::Ghost) {
        Some(path) => match path.first() {
            Some(&first) => Decision {
                mode,
                player,
                target: Some(target),
                outcome: Outcome::FollowPath(first),
            },
            None => fallback(ghost, mode, board, FallbackReason::AtTarget, player, Some(target), rng),
        },
        None => fallback(ghost, mode, board, FallbackReason::Unreachable, player, Some(target), rng),
    }
}

fn fallback(
    ghost: &GhostAgent,
    mode: Mode,
    board: &Board,
    reason: FallbackReason,
    player: Option<GridPosition>,
    target: Option<GridPosition>,
    rng: &mut impl Rng,
) -> Decision {
    Decision {
        mode,
        player,
        target,
        outcome: Outcome::Fallback {
            reason,
            direction: random_legal_direction(board.maze, ghost.square, AgentKind::Ghost, rng),
        },
    }
}

/// [`decide`], reported to `observer`, reduced to the direction to move.
pub fn next_move(
    ghost: &GhostAgent,
    mode: Mode,
    board: &Board,
    config: &EngineConfig,
    rng: &mut impl Rng,
    observer: &mut dyn DecisionObserver,
) -> Option<Direction> {
    let decision = decide(ghost, mode, board, config, rng);
    observer.on_decision(ghost, &decision);
    decision.direction()
}

/// Time until this ghost kind's next decision: base plus fresh jitter.
pub fn move_interval(kind: GhostKind, config: &EngineConfig, rng: &mut impl Rng) -> Duration {
    config.timing(kind).sample(rng)
}
