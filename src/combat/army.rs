//! Per-army tracking inside an aggregated side
//!
//! A side may be fed by several physical armies (the opener plus any
//! reinforcements) or by pressed villager groups; each keeps its own ledger
//! so after-action reporting can attribute losses and damage.

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, OwnerId, SimSeconds, VillagerGroupId};
use crate::stats::{Composition, UnitType};

/// Identity of one combatant contributing to a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantId {
    Army(ArmyId),
    Villagers(VillagerGroupId),
}

impl CombatantId {
    pub fn army(&self) -> Option<ArmyId> {
        match self {
            CombatantId::Army(id) => Some(*id),
            CombatantId::Villagers(_) => None,
        }
    }
}

/// One combatant's participation record within a side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmyCombatState {
    pub id: CombatantId,
    pub name: String,
    pub owner: OwnerId,
    pub joined_at: SimSeconds,

    /// End of the charge bonus window; set only for reinforcements
    pub charge_window_until: Option<SimSeconds>,
    /// End of the ranged bonus window; set only for reinforcements
    pub ranged_window_until: Option<SimSeconds>,

    initial: Composition,
    current: Composition,

    damage_dealt_by_type: [f64; UnitType::COUNT],
    casualties: Composition,
}

impl ArmyCombatState {
    /// An army present from the start of the pairing
    pub fn opener(
        id: CombatantId,
        name: String,
        owner: OwnerId,
        composition: Composition,
        joined_at: SimSeconds,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            joined_at,
            charge_window_until: None,
            ranged_window_until: None,
            initial: composition,
            current: composition,
            damage_dealt_by_type: [0.0; UnitType::COUNT],
            casualties: Composition::new(),
        }
    }

    /// An army arriving mid-combat; both bonus windows open until
    /// `joined_at + window`
    pub fn reinforcement(
        id: CombatantId,
        name: String,
        owner: OwnerId,
        composition: Composition,
        joined_at: SimSeconds,
        window: f64,
    ) -> Self {
        let mut state = Self::opener(id, name, owner, composition, joined_at);
        state.charge_window_until = Some(joined_at + window);
        state.ranged_window_until = Some(joined_at + window);
        state
    }

    pub fn initial(&self) -> &Composition {
        &self.initial
    }

    pub fn current(&self) -> &Composition {
        &self.current
    }

    pub fn casualties(&self) -> &Composition {
        &self.casualties
    }

    /// Still fielding units; inactive records are retained for reporting
    pub fn is_active(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn in_charge_window(&self, now: SimSeconds) -> bool {
        self.charge_window_until.is_some_and(|until| now < until)
    }

    pub fn in_ranged_window(&self, now: SimSeconds) -> bool {
        self.ranged_window_until.is_some_and(|until| now < until)
    }

    /// Remove up to `count` units of a type; returns how many actually fell
    pub fn take_casualties(&mut self, ty: UnitType, count: u32) -> u32 {
        let taken = self.current.remove(ty, count);
        self.casualties.add(ty, taken);
        taken
    }

    pub fn record_damage_dealt(&mut self, ty: UnitType, amount: f64) {
        self.damage_dealt_by_type[ty.index()] += amount;
    }

    pub fn damage_dealt(&self, ty: UnitType) -> f64 {
        self.damage_dealt_by_type[ty.index()]
    }

    pub fn total_damage_dealt(&self) -> f64 {
        self.damage_dealt_by_type.iter().sum()
    }
}
