use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use ghostwalk::GhostwalkPlugin;
use ghostwalk::ai::{self, Decision, DecisionObserver, GhostAgent};
use ghostwalk::components::{Ghost, GhostKind, GridPosition, HomeCorner, MoveTimer, Player};
use ghostwalk::plugins::ghosts::{DecisionLog, LastDecision};
use ghostwalk::plugins::maze::{AgentKind, MazeMap};
use ghostwalk::plugins::mode::ModeSchedule;
use ghostwalk::resources::{EngineConfig, GhostTiming, Mode, PhaseConfig};

const FRAME: Duration = Duration::from_millis(50);

const CORRIDOR: &str = "\
#########
#P      #
# ##### #
#      G#
#########";

fn config(phases: Vec<PhaseConfig>, seed: u64) -> EngineConfig {
    EngineConfig {
        chaser: GhostTiming::new(100, 0),
        ambusher: GhostTiming::new(100, 20),
        flanker: GhostTiming::new(100, 20),
        shy: GhostTiming::new(100, 20),
        phases,
        seed: Some(seed),
        ..EngineConfig::default()
    }
}

fn setup_app(maze: MazeMap, config: EngineConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.insert_resource(config);
    app.insert_resource(maze);
    app.add_plugins(GhostwalkPlugin);
    app.finish();
    app.cleanup();
    app
}

/// Ghost kinds and squares in spawn order. Archetype moves reorder query
/// iteration, so sort by entity.
fn ghosts(app: &mut App) -> Vec<(GhostKind, GridPosition)> {
    let mut query = app
        .world_mut()
        .query_filtered::<(Entity, &GhostKind, &GridPosition), With<Ghost>>();
    let mut found: Vec<_> = query.iter(app.world()).collect();
    found.sort_by_key(|(entity, _, _)| *entity);
    found.into_iter().map(|(_, k, p)| (*k, *p)).collect()
}

fn player_square(app: &mut App) -> GridPosition {
    let mut query = app
        .world_mut()
        .query_filtered::<&GridPosition, With<Player>>();
    *query.single(app.world()).unwrap()
}

fn last_decisions(app: &mut App) -> Vec<LastDecision> {
    let mut query = app.world_mut().query::<&LastDecision>();
    query.iter(app.world()).copied().collect()
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

#[test]
fn bundled_level_spawns_one_of_each_kind() {
    let maze = MazeMap::load("assets/maps/level_01.txt").unwrap();
    let mut app = setup_app(maze, config(vec![PhaseConfig::forever(Mode::Pursuit)], 1));
    app.update();

    let mut kinds: Vec<_> = ghosts(&mut app).into_iter().map(|(k, _)| k).collect();
    kinds.sort_by_key(|k| k.as_str());
    let mut expected = GhostKind::ALL.to_vec();
    expected.sort_by_key(|k| k.as_str());
    assert_eq!(kinds, expected);

    let mut homes = app.world_mut().query::<&HomeCorner>();
    let maze = app.world().resource::<MazeMap>();
    for home in homes.iter(app.world()) {
        assert!(maze.is_walkable(home.0));
    }
}

// ---------------------------------------------------------------------------
// Pursuit
// ---------------------------------------------------------------------------

#[test]
fn chaser_closes_in_one_square_per_move() {
    let maze = MazeMap::parse(CORRIDOR).unwrap();
    let mut app = setup_app(maze, config(vec![PhaseConfig::forever(Mode::Pursuit)], 3));
    app.update();

    let target = player_square(&mut app);
    let distance = |app: &mut App| {
        let (_, square) = ghosts(app)[0];
        let maze = app.world().resource::<MazeMap>();
        ai::shortest_path(maze, square, target, AgentKind::Ghost)
            .unwrap()
            .len()
    };

    let mut previous = distance(&mut app);
    assert_eq!(previous, 8);
    for _ in 0..60 {
        app.update();
        let now = distance(&mut app);
        assert!(now <= previous, "ghost moved away: {previous} -> {now}");
        assert!(previous - now <= 1, "ghost skipped a square");
        previous = now;
        if now == 0 {
            break;
        }
    }
    assert_eq!(previous, 0, "chaser never reached the player");

    let decisions = last_decisions(&mut app);
    assert!(
        decisions
            .iter()
            .all(|d| d.0.mode == Mode::Pursuit && d.0.player == Some(target))
    );
}

#[test]
fn ghosts_only_stand_on_ghost_squares() {
    let maze = MazeMap::load("assets/maps/level_01.txt").unwrap();
    let mut app = setup_app(maze, config(vec![PhaseConfig::forever(Mode::Pursuit)], 11));
    app.update();

    let mut before = ghosts(&mut app);
    for _ in 0..200 {
        app.update();
        let after = ghosts(&mut app);
        let maze = app.world().resource::<MazeMap>();
        for ((kind, from), (_, to)) in before.iter().zip(&after) {
            assert!(maze.is_traversable(*to, AgentKind::Ghost), "{kind:?} on {to:?}");
            assert!(
                from == to || maze.direction_between(*from, *to).is_some(),
                "{kind:?} jumped from {from:?} to {to:?}"
            );
        }
        before = after;
    }
}

// ---------------------------------------------------------------------------
// Patrol and phase changes
// ---------------------------------------------------------------------------

#[test]
fn patrol_sends_chaser_to_its_corner() {
    let maze = MazeMap::parse(CORRIDOR).unwrap();
    let mut app = setup_app(maze, config(vec![PhaseConfig::forever(Mode::Patrol)], 5));

    // North-east corner of the corridor is (7, 1); the ghost starts at (7, 3).
    let mut reached = false;
    for _ in 0..40 {
        app.update();
        if ghosts(&mut app)[0].1 == GridPosition::new(7, 1) {
            reached = true;
            break;
        }
    }
    assert!(reached, "chaser never reached its corner");

    let decisions = last_decisions(&mut app);
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].0.mode, Mode::Patrol);
    assert_eq!(decisions[0].0.target, Some(GridPosition::new(7, 1)));
    assert_eq!(decisions[0].0.player, None);
}

#[test]
fn ghosts_switch_from_patrol_to_pursuit() {
    let maze = MazeMap::parse(CORRIDOR).unwrap();
    let phases = vec![
        PhaseConfig::timed(Mode::Patrol, 0.5),
        PhaseConfig::forever(Mode::Pursuit),
    ];
    let mut app = setup_app(maze, config(phases, 9));
    app.update();
    assert_eq!(app.world().resource::<ModeSchedule>().current(), Mode::Patrol);

    for _ in 0..30 {
        app.update();
    }
    assert_eq!(app.world().resource::<ModeSchedule>().current(), Mode::Pursuit);

    let decisions = last_decisions(&mut app);
    assert_eq!(decisions[0].0.mode, Mode::Pursuit);
    assert_eq!(decisions[0].0.player, Some(GridPosition::new(1, 1)));
}

// ---------------------------------------------------------------------------
// Reproducibility
// ---------------------------------------------------------------------------

fn trajectory(seed: u64) -> Vec<Vec<(GhostKind, GridPosition)>> {
    let maze = MazeMap::load("assets/maps/level_01.txt").unwrap();
    let phases = vec![
        PhaseConfig::timed(Mode::Patrol, 2.0),
        PhaseConfig::forever(Mode::Pursuit),
    ];
    let mut app = setup_app(maze, config(phases, seed));
    (0..120)
        .map(|_| {
            app.update();
            ghosts(&mut app)
        })
        .collect()
}

#[test]
fn same_seed_same_trajectory() {
    assert_eq!(trajectory(21), trajectory(21));
}

// ---------------------------------------------------------------------------
// Cadence and snapshot
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct DecisionCount(Arc<AtomicUsize>);

impl DecisionObserver for DecisionCount {
    fn on_decision(&mut self, _ghost: &GhostAgent, _decision: &Decision) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn decisions_keep_pace_with_the_interval() {
    let maze = MazeMap::parse(CORRIDOR).unwrap();
    let config = EngineConfig {
        chaser: GhostTiming::new(125, 0),
        ..config(vec![PhaseConfig::forever(Mode::Pursuit)], 13)
    };
    let mut app = setup_app(maze, config);
    let count = DecisionCount::default();
    app.insert_resource(DecisionLog(Box::new(count.clone())));

    // The first frame has no delta: 199 x 50ms = 9.95s of game time. The
    // first decision comes after 125-250ms, then one every 125ms.
    for _ in 0..200 {
        app.update();
    }

    let decisions = count.0.load(Ordering::Relaxed);
    assert!(
        (78..=81).contains(&decisions),
        "{decisions} decisions in 9.95s at a 125ms interval"
    );
}

const OPEN_FIELD: &str = "\
.........
..G......
.......G.
.........
......P..
.........
.........
.G.......
.........";

#[test]
fn simultaneous_ghosts_see_positions_from_before_the_frame() {
    // Spawn order makes (2,1) the chaser, (7,2) the ambusher and (1,7) the
    // flanker. The player spawns facing west, so the flanker's pivot is (4,4).
    let maze = MazeMap::parse(OPEN_FIELD).unwrap();
    let mut app = setup_app(maze, config(vec![PhaseConfig::forever(Mode::Pursuit)], 2));
    app.update();

    // Line every ghost up on the same deadline.
    let mut timers = app.world_mut().query::<&mut MoveTimer>();
    for mut timer in timers.iter_mut(app.world_mut()) {
        *timer = MoveTimer(Timer::new(Duration::from_millis(100), TimerMode::Repeating));
    }

    app.update();
    app.update();

    let mut query = app
        .world_mut()
        .query::<(&GhostKind, &GridPosition, &LastDecision)>();
    let decided: Vec<_> = query
        .iter(app.world())
        .map(|(kind, pos, decision)| (*kind, *pos, decision.0))
        .collect();
    assert_eq!(decided.len(), 3, "every ghost decides on the same frame");

    let (_, chaser_now, _) = decided
        .iter()
        .find(|(kind, _, _)| *kind == GhostKind::Chaser)
        .copied()
        .unwrap();
    let (_, _, flanker) = decided
        .iter()
        .find(|(kind, _, _)| *kind == GhostKind::Flanker)
        .copied()
        .unwrap();

    // The chaser moved this frame, yet the flanker reflected it from (2,1).
    assert_ne!(chaser_now, GridPosition::new(2, 1));
    assert_eq!(flanker.target, Some(GridPosition::new(6, 7)));
}
