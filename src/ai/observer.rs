//! Hooks for watching decisions without threading logging through the AI.

use micromegas_tracing::prelude::*;

use super::{Decision, FallbackReason, GhostAgent, Outcome};
use crate::occupancy::UnitId;

/// Receives every decision right after it is made.
pub trait DecisionObserver {
    fn on_decision(&mut self, ghost: &GhostAgent, decision: &Decision);
}

/// Discards decisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {
    fn on_decision(&mut self, _ghost: &GhostAgent, _decision: &Decision) {}
}

/// Logs each branch of the decision at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn on_decision(&mut self, ghost: &GhostAgent, decision: &Decision) {
        let name = ghost.kind.as_str();
        match (decision.outcome, decision.target) {
            (Outcome::FollowPath(dir), Some(target)) => {
                debug!(
                    "{} {}: path to ({}, {}) found, moving {:?}",
                    name, ghost.id, target.x, target.y, dir
                );
            }
            (Outcome::FollowPath(dir), None) => {
                debug!("{} {}: moving {:?}", name, ghost.id, dir);
            }
            (Outcome::Fallback { reason, direction }, _) => {
                let why = match reason {
                    FallbackReason::NoPlayer => "no player found",
                    FallbackReason::NoTarget => "no target square",
                    FallbackReason::AtTarget => "already on target",
                    FallbackReason::Unreachable => "target unreachable",
                };
                match direction {
                    Some(dir) => {
                        debug!("{} {}: {}, moving randomly {:?}", name, ghost.id, why, dir)
                    }
                    None => warn!("{} {}: {} and no legal move", name, ghost.id, why),
                }
            }
        }
    }
}

/// Keeps every decision in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub decisions: Vec<(UnitId, Decision)>,
}

impl DecisionObserver for RecordingObserver {
    fn on_decision(&mut self, ghost: &GhostAgent, decision: &Decision) {
        self.decisions.push((ghost.id, *decision));
    }
}
