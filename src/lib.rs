pub mod ai;
pub mod components;
pub mod occupancy;
pub mod plugins;
pub mod resources;
pub mod tracing_bridge;

use bevy::prelude::*;

use plugins::GameSet;
use plugins::ghosts::GhostPlugin;
use plugins::maze::MazePlugin;
use plugins::mode::{ModePlugin, ModeSchedule};
use plugins::movement::MovementPlugin;
use plugins::telemetry::TelemetryPlugin;
use resources::{EngineConfig, GhostRng};

/// Ghost movement engine. Insert an [`EngineConfig`] and a
/// [`MazeMap`](plugins::maze::MazeMap) before adding it; a default config is
/// used when none is present.
pub struct GhostwalkPlugin;

impl Plugin for GhostwalkPlugin {
    fn build(&self, app: &mut App) {
        // Seeded RNG and phase clock both come from the config, so they are
        // built here rather than lazily.
        let config = app
            .world()
            .get_resource::<EngineConfig>()
            .cloned()
            .unwrap_or_default();
        app.insert_resource(GhostRng::new(config.seed));
        app.insert_resource(ModeSchedule::new(&config.phases));
        app.insert_resource(config);

        app.configure_sets(
            Update,
            (GameSet::Mode, GameSet::Decide, GameSet::Apply).chain(),
        );

        app.add_plugins(MazePlugin);
        app.add_plugins(ModePlugin);
        app.add_plugins(GhostPlugin);
        app.add_plugins(MovementPlugin);
        app.add_plugins(TelemetryPlugin);
    }
}
