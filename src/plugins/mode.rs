//! Game-wide patrol/pursuit clock.

use std::time::Duration;

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_fn, span_scope};

use crate::plugins::GameSet;
use crate::resources::{Mode, PhaseConfig};

pub struct ModePlugin;

impl Plugin for ModePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, advance_mode.in_set(GameSet::Mode));
    }
}

/// Walks through the configured phase list. The last phase never ends.
#[derive(Resource, Debug, Clone)]
pub struct ModeSchedule {
    phases: Vec<PhaseConfig>,
    index: usize,
    elapsed: Duration,
}

impl ModeSchedule {
    pub fn new(phases: &[PhaseConfig]) -> Self {
        Self {
            phases: phases.to_vec(),
            index: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn current(&self) -> Mode {
        self.phases
            .get(self.index)
            .map(|phase| phase.mode)
            .unwrap_or(Mode::Pursuit)
    }

    /// Length of the current phase. None for phases that never end,
    /// including lengths too large to represent.
    fn current_limit(&self) -> Option<Duration> {
        let seconds = self.phases.get(self.index)?.seconds?;
        Duration::try_from_secs_f32(seconds).ok()
    }

    /// Advance the clock. Returns the new mode when it changed.
    pub fn advance(&mut self, dt: Duration) -> Option<Mode> {
        let before = self.current();
        self.elapsed += dt;
        while let Some(limit) = self.current_limit() {
            if self.elapsed < limit || self.index + 1 >= self.phases.len() {
                break;
            }
            self.elapsed -= limit;
            self.index += 1;
        }
        let after = self.current();
        (after != before).then_some(after)
    }
}

#[span_fn]
fn advance_mode(time: Res<Time>, mut schedule: ResMut<ModeSchedule>) {
    if let Some(mode) = schedule.advance(time.delta()) {
        info!("ghosts switch to {:?}", mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> ModeSchedule {
        ModeSchedule::new(&[
            PhaseConfig::timed(Mode::Patrol, 7.0),
            PhaseConfig::timed(Mode::Pursuit, 20.0),
            PhaseConfig::forever(Mode::Patrol),
        ])
    }

    #[test]
    fn starts_in_first_phase() {
        assert_eq!(classic().current(), Mode::Patrol);
    }

    #[test]
    fn switches_when_phase_elapses() {
        let mut schedule = classic();
        assert_eq!(schedule.advance(Duration::from_secs(6)), None);
        assert_eq!(schedule.advance(Duration::from_secs(1)), Some(Mode::Pursuit));
        assert_eq!(schedule.current(), Mode::Pursuit);
    }

    #[test]
    fn large_step_skips_whole_phases() {
        let mut schedule = classic();
        assert_eq!(schedule.advance(Duration::from_secs(30)), None);
        // Patrol -> Pursuit -> Patrol in one step: same mode as before.
        assert_eq!(schedule.current(), Mode::Patrol);
    }

    #[test]
    fn final_phase_never_ends() {
        let mut schedule = classic();
        schedule.advance(Duration::from_secs(27));
        assert_eq!(schedule.current(), Mode::Patrol);
        assert_eq!(schedule.advance(Duration::from_secs(10_000)), None);
        assert_eq!(schedule.current(), Mode::Patrol);
    }

    #[test]
    fn timed_last_phase_holds() {
        let mut schedule = ModeSchedule::new(&[PhaseConfig::timed(Mode::Pursuit, 1.0)]);
        schedule.advance(Duration::from_secs(5));
        assert_eq!(schedule.current(), Mode::Pursuit);
    }

    #[test]
    fn single_untimed_phase() {
        let mut schedule = ModeSchedule::new(&[PhaseConfig::forever(Mode::Pursuit)]);
        schedule.advance(Duration::from_secs(100));
        assert_eq!(schedule.current(), Mode::Pursuit);
    }

    #[test]
    fn unrepresentable_phase_length_never_ends() {
        // Phases built in code skip config validation.
        let mut schedule = ModeSchedule::new(&[
            PhaseConfig::timed(Mode::Patrol, 1e30),
            PhaseConfig::forever(Mode::Pursuit),
        ]);
        assert_eq!(schedule.advance(Duration::from_secs(3600)), None);
        assert_eq!(schedule.current(), Mode::Patrol);
    }
}
