//! Defensive tier construction
//!
//! A one-shot snapshot and sort: given a tile and an attacking owner, classify
//! every eligible defender into ordered tiers. Transient by design; rebuilt
//! for each attack resolution, never persisted.

use serde::{Deserialize, Serialize};

use crate::core::config::CombatConfig;
use crate::core::types::{ArmyId, OwnerId, VillagerGroupId};
use crate::hex::HexCoord;
use crate::world::{ArmySnapshot, WorldView};

/// Priority class of a defender; lower tiers engage first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenseTier {
    Entrenched,
    Regular,
    Villager,
}

/// One classified defender awaiting engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackEntry {
    pub army: ArmyId,
    pub tier: DefenseTier,
    /// Defends this tile from an adjacent hex rather than occupying it
    pub covers_from_adjacent: bool,
    pub source: HexCoord,
    /// Damage-reduction bonus; nonzero only for entrenched entries
    pub entrenchment_bonus: f64,
}

/// Tiered, ordered defender classification for one tile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefensiveStack {
    /// Tier-ordered: all Entrenched entries, then all Regular ones
    pub entries: Vec<StackEntry>,
    /// Villager groups never get a pairing until the army tiers are spent
    pub villagers: Vec<VillagerGroupId>,
}

impl DefensiveStack {
    /// Classify every eligible defender of `tile` against `attacker_owner`
    ///
    /// `already_engaged` is the engine's own membership predicate; armies
    /// fighting elsewhere are skipped.
    pub fn build(
        world: &dyn WorldView,
        tile: HexCoord,
        attacker_owner: OwnerId,
        config: &CombatConfig,
        already_engaged: &dyn Fn(ArmyId) -> bool,
    ) -> Self {
        let eligible = |a: &ArmySnapshot| {
            world.is_hostile(attacker_owner, a.owner) && !already_engaged(a.id)
        };
        let on_tile: Vec<ArmySnapshot> = world
            .armies_at(tile)
            .into_iter()
            .filter(eligible)
            .collect();

        let mut entries = Vec::new();

        // Tier 1: entrenched on the tile, last-entrenched first (LIFO)
        let mut entrenched: Vec<&ArmySnapshot> =
            on_tile.iter().filter(|a| a.entrenched.is_some()).collect();
        entrenched.sort_by(|a, b| entrench_since(a).total_cmp(&entrench_since(b)).reverse());
        for army in &entrenched {
            entries.push(StackEntry {
                army: army.id,
                tier: DefenseTier::Entrenched,
                covers_from_adjacent: false,
                source: army.position,
                entrenchment_bonus: config.entrenchment_bonus,
            });
        }

        // Tier 1 continued: adjacent entrenched armies covering this tile,
        // same LIFO order, de-duplicated against the on-tile entries
        let mut coverers: Vec<ArmySnapshot> = world
            .entrenched_coverers_of(tile)
            .into_iter()
            .filter(eligible)
            .filter(|a| !entries.iter().any(|e| e.army == a.id))
            .collect();
        coverers.sort_by(|a, b| entrench_since(b).total_cmp(&entrench_since(a)));
        for army in &coverers {
            entries.push(StackEntry {
                army: army.id,
                tier: DefenseTier::Entrenched,
                covers_from_adjacent: true,
                source: army.position,
                entrenchment_bonus: config.entrenchment_bonus,
            });
        }

        // Tier 2: regular armies on the tile, most recently arrived first
        let mut regular: Vec<&ArmySnapshot> =
            on_tile.iter().filter(|a| a.entrenched.is_none()).collect();
        regular.sort_by(|a, b| b.arrived_at.total_cmp(&a.arrived_at));
        for army in &regular {
            entries.push(StackEntry {
                army: army.id,
                tier: DefenseTier::Regular,
                covers_from_adjacent: false,
                source: army.position,
                entrenchment_bonus: 0.0,
            });
        }

        // Tier 3: villager groups, unordered
        let villagers = world
            .villager_groups_at(tile)
            .into_iter()
            .filter(|g| world.is_hostile(attacker_owner, g.owner))
            .map(|g| g.id)
            .collect();

        Self { entries, villagers }
    }

    /// Number of army-tier defenders (tiers 1-2)
    pub fn army_defenders(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.villagers.is_empty()
    }

    /// Any entrenched defender present?
    pub fn has_entrenched(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.tier == DefenseTier::Entrenched)
    }
}

fn entrench_since(army: &ArmySnapshot) -> f64 {
    army.entrenched.as_ref().map(|e| e.since).unwrap_or(0.0)
}
