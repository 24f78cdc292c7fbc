use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::components::GhostKind;
use crate::plugins::maze::Topology;

// ---------------------------------------------------------------------------
// Behavior phases
// ---------------------------------------------------------------------------

/// Game-wide behavior phase shared by every ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Head for the home corner.
    #[default]
    Patrol,
    /// Head for the variant's player-derived target.
    Pursuit,
}

/// One entry of the phase timetable. A phase without `seconds` never ends.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PhaseConfig {
    pub mode: Mode,
    #[serde(default)]
    pub seconds: Option<f32>,
}

impl PhaseConfig {
    pub fn timed(mode: Mode, seconds: f32) -> Self {
        Self {
            mode,
            seconds: Some(seconds),
        }
    }

    pub fn forever(mode: Mode) -> Self {
        Self {
            mode,
            seconds: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine config
// ---------------------------------------------------------------------------

/// Movement cadence for one ghost variant, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GhostTiming {
    pub base_ms: u64,
    /// Exclusive upper bound of the random jitter added to `base_ms`.
    pub variation_ms: u64,
}

impl GhostTiming {
    pub const fn new(base_ms: u64, variation_ms: u64) -> Self {
        Self {
            base_ms,
            variation_ms,
        }
    }

    /// Sample one interval in `[base, base + variation)`.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let jitter = if self.variation_ms == 0 {
            0
        } else {
            rng.gen_range(0..self.variation_ms)
        };
        Duration::from_millis(self.base_ms + jitter)
    }
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chaser: GhostTiming,
    pub ambusher: GhostTiming,
    pub flanker: GhostTiming,
    pub shy: GhostTiming,
    /// How far ahead of the player the ambusher aims.
    pub squares_ahead: u32,
    /// How far ahead of the player the flanker's pivot sits.
    pub flanker_pivot: u32,
    /// Path length at or below which the shy ghost retreats.
    pub shy_radius: usize,
    pub phases: Vec<PhaseConfig>,
    /// Fixed seed for the ghost RNG. Entropy when absent.
    pub seed: Option<u64>,
    pub maze_file: String,
    pub topology: Topology,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chaser: GhostTiming::new(115, 40),
            ambusher: GhostTiming::new(125, 50),
            flanker: GhostTiming::new(135, 50),
            shy: GhostTiming::new(145, 50),
            squares_ahead: 4,
            flanker_pivot: 2,
            shy_radius: 8,
            phases: vec![
                PhaseConfig::timed(Mode::Patrol, 7.0),
                PhaseConfig::timed(Mode::Pursuit, 20.0),
                PhaseConfig::timed(Mode::Patrol, 7.0),
                PhaseConfig::timed(Mode::Pursuit, 20.0),
                PhaseConfig::timed(Mode::Patrol, 5.0),
                PhaseConfig::forever(Mode::Pursuit),
            ],
            seed: None,
            maze_file: "assets/maps/level_01.txt".to_string(),
            topology: Topology::Bounded,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, String> {
        let config: EngineConfig =
            serde_json::from_str(text).map_err(|e| format!("Invalid engine config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_json_str(&text)
    }

    pub fn timing(&self, kind: GhostKind) -> GhostTiming {
        match kind {
            GhostKind::Chaser => self.chaser,
            GhostKind::Ambusher => self.ambusher,
            GhostKind::Flanker => self.flanker,
            GhostKind::Shy => self.shy,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.phases.is_empty() {
            return Err("Phase list must not be empty".to_string());
        }
        for phase in &self.phases {
            if let Some(secs) = phase.seconds
                && Duration::try_from_secs_f32(secs).ok().is_none_or(|d| d.is_zero())
            {
                return Err(format!(
                    "Phase duration must be a positive, representable number of seconds, got {}",
                    secs
                ));
            }
        }
        for kind in GhostKind::ALL {
            if self.timing(kind).base_ms == 0 {
                return Err(format!("Base interval for {} must be positive", kind.as_str()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// Source for interval jitter and random fallback moves.
#[derive(Resource, Debug)]
pub struct GhostRng(pub StdRng);

impl GhostRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision stats
// ---------------------------------------------------------------------------

/// Per-frame decision tallies, drained by the telemetry plugin.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecisionCounters {
    pub followed_path: u64,
    pub random_fallback: u64,
    pub stuck: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
