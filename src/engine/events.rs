//! State-change records emitted by the engine
//!
//! The engine never touches world entities; every consequence of a tick is
//! one of these variants, applied by the world model (and read by the
//! presentation layer) through an exhaustive match.

use serde::{Deserialize, Serialize};

use crate::combat::{CombatReport, CombatSide, CombatWinner, CombatantId, PhaseRecord};
use crate::core::types::{ArmyId, CombatId, VillagerGroupId};
use crate::hex::HexCoord;
use crate::stack::DefenseTier;

/// One meaningful state change within a tick
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CombatEvent {
    CombatStarted {
        combat: CombatId,
        location: HexCoord,
        attacker: ArmyId,
        defenders: Vec<CombatantId>,
    },
    ReinforcementJoined {
        combat: CombatId,
        army: ArmyId,
        side: CombatSide,
    },
    PhaseCompleted {
        combat: CombatId,
        record: PhaseRecord,
    },
    CombatEnded {
        combat: CombatId,
        winner: CombatWinner,
        report: CombatReport,
    },
    ArmyDestroyed {
        army: ArmyId,
        location: HexCoord,
    },
    VillagerGroupDestroyed {
        group: VillagerGroupId,
        location: HexCoord,
    },
    ArmyRetreated {
        army: ArmyId,
    },
    StackCombatStarted {
        location: HexCoord,
        attackers: Vec<ArmyId>,
        army_defenders: usize,
        villager_groups: usize,
    },
    TierAdvanced {
        location: HexCoord,
        tier: DefenseTier,
    },
    VillagerPhaseStarted {
        location: HexCoord,
    },
    StackCombatEnded {
        location: HexCoord,
    },
}
