//! Frame-level telemetry: frame time plus how ghosts decided this frame.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, span_scope};

use crate::resources::DecisionCounters;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DecisionCounters>();
        app.add_systems(Last, frame_telemetry);
    }
}

fn frame_telemetry(time: Res<Time>, mut counters: ResMut<DecisionCounters>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);
    imetric!("ghost_path_moves", "count", counters.followed_path);
    imetric!("ghost_random_moves", "count", counters.random_fallback);
    imetric!("ghost_stuck", "count", counters.stuck);
    *counters = DecisionCounters::default();
}
