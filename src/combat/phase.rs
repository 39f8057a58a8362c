//! Combat phases and the per-phase audit record

use serde::{Deserialize, Serialize};

use crate::stats::Composition;

/// Phase of a single-pairing combat
///
/// Only ever advances forward; `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombatPhase {
    /// Opening volleys while the lines close
    #[default]
    RangedExchange,
    /// The lines have met
    MeleeEngagement,
    /// One side has no melee line left; the rest is pursuit
    Cleanup,
    Ended,
}

impl CombatPhase {
    /// Monotonic index, for ordering assertions
    pub fn index(&self) -> usize {
        match self {
            CombatPhase::RangedExchange => 0,
            CombatPhase::MeleeEngagement => 1,
            CombatPhase::Cleanup => 2,
            CombatPhase::Ended => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CombatPhase::Ended)
    }

    /// The phase that follows this one
    pub fn next(&self) -> CombatPhase {
        match self {
            CombatPhase::RangedExchange => CombatPhase::MeleeEngagement,
            CombatPhase::MeleeEngagement => CombatPhase::Cleanup,
            CombatPhase::Cleanup | CombatPhase::Ended => CombatPhase::Ended,
        }
    }
}

/// Immutable summary of one completed phase
///
/// Recorded at each transition, before the running accumulators reset, so the
/// history is independent of final-tick rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: CombatPhase,
    /// Seconds since the previous phase boundary
    pub duration: f64,
    pub attacker_damage: f64,
    pub defender_damage: f64,
    pub attacker_casualties: Composition,
    pub defender_casualties: Composition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_indices_ordered() {
        assert!(CombatPhase::RangedExchange.index() < CombatPhase::MeleeEngagement.index());
        assert!(CombatPhase::MeleeEngagement.index() < CombatPhase::Cleanup.index());
        assert!(CombatPhase::Cleanup.index() < CombatPhase::Ended.index());
    }

    #[test]
    fn test_next_is_forward_only() {
        assert_eq!(
            CombatPhase::RangedExchange.next(),
            CombatPhase::MeleeEngagement
        );
        assert_eq!(CombatPhase::Ended.next(), CombatPhase::Ended);
    }

    #[test]
    fn test_only_ended_is_terminal() {
        assert!(CombatPhase::Ended.is_terminal());
        assert!(!CombatPhase::Cleanup.is_terminal());
    }
}
