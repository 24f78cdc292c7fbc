use std::process::ExitCode;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use ghostwalk::GhostwalkPlugin;
use ghostwalk::ai;
use ghostwalk::components::{Facing, Ghost, GhostKind, GridPosition, PendingMove, Player};
use ghostwalk::plugins::GameSet;
use ghostwalk::plugins::maze::{AgentKind, MazeMap};
use ghostwalk::resources::EngineConfig;
use ghostwalk::tracing_bridge::ScopeBridgeLayer;
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::{flush_thread_buffer, init_thread_stream, unregister_thread_stream};
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

/// Roughly ten seconds at the runner's 16ms frame pacing.
const DEMO_FRAMES: u32 = 600;

/// How often the stand-in player takes a step.
const PLAYER_STEP: Duration = Duration::from_millis(200);

fn main() -> ExitCode {
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .expect("failed to initialize telemetry");

    let log_layer = TracingCaptureLayer {
        max_level: LevelFilter::Info,
    };
    let subscriber = Registry::default()
        .with(ScopeBridgeLayer)
        .with(log_layer);
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    // Worker threads need a Micromegas stream before Bevy starts them,
    // otherwise their spans are dropped. Logs and metrics work regardless.
    init_thread_stream();
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(init_thread_stream)
            .on_thread_destroy(|| {
                flush_thread_buffer();
                unregister_thread_stream();
            })
            .build()
    });

    // Optional first argument: path to a JSON engine config.
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let maze = match MazeMap::load(&config.maze_file) {
        Ok(maze) => maze.with_topology(config.topology),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "ghostwalk demo starting: {} ({}x{})",
        config.maze_file, maze.width, maze.height
    );

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(16))))
        .insert_resource(WanderRng::new(config.seed))
        .insert_resource(config)
        .insert_resource(maze)
        .add_plugins(GhostwalkPlugin)
        .add_systems(Update, wander_player.in_set(GameSet::Decide))
        .add_systems(Last, stop_after_demo)
        .run();

    ExitCode::SUCCESS
}

/// Randomness for the stand-in player. Separate from the ghosts' stream, so
/// system order within the decision phase does not change either sequence.
#[derive(Resource)]
struct WanderRng(StdRng);

impl WanderRng {
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed.wrapping_add(1))),
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// Stand-in for player input: keep going straight, turn at random when
/// blocked or at a junction.
fn wander_player(
    time: Res<Time>,
    maze: Res<MazeMap>,
    mut rng: ResMut<WanderRng>,
    mut since_step: Local<Duration>,
    players: Query<(Entity, &GridPosition, &Facing), With<Player>>,
    mut commands: Commands,
) {
    *since_step += time.delta();
    if *since_step < PLAYER_STEP {
        return;
    }
    *since_step = Duration::ZERO;

    for (entity, pos, facing) in &players {
        let legal = maze.legal_directions(*pos, AgentKind::Player);
        let keep_going = legal.contains(&facing.0) && legal.len() <= 2;
        let dir = if keep_going || (legal.contains(&facing.0) && rng.0.gen_bool(0.6)) {
            Some(facing.0)
        } else {
            ai::random_legal_direction(&maze, *pos, AgentKind::Player, &mut rng.0)
        };
        if let Some(dir) = dir {
            commands.entity(entity).insert(PendingMove(dir));
        }
    }
}

fn stop_after_demo(
    mut frames: Local<u32>,
    ghosts: Query<(&GhostKind, &GridPosition), With<Ghost>>,
    players: Query<&GridPosition, With<Player>>,
    mut exit: MessageWriter<AppExit>,
) {
    *frames += 1;
    if *frames < DEMO_FRAMES {
        return;
    }
    for pos in &players {
        info!("player ended at ({}, {})", pos.x, pos.y);
    }
    for (kind, pos) in &ghosts {
        info!("{} ended at ({}, {})", kind.as_str(), pos.x, pos.y);
    }
    exit.write(AppExit::Success);
}
