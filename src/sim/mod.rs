//! In-memory world model for headless simulation and tests
//!
//! `SimWorld` implements the `WorldView` contract and applies emitted
//! `CombatEvent`s back to its records, standing in for the real world model.

pub mod runner;
pub mod scenario;

pub use runner::{run_scenario, RunSummary};
pub use scenario::{generate, Scenario, ScenarioConfig};

use ahash::{AHashMap, AHashSet};

use crate::combat::CombatantId;
use crate::core::types::{ArmyId, OwnerId, SimSeconds, VillagerGroupId};
use crate::engine::CombatEvent;
use crate::hex::HexCoord;
use crate::stats::{CavalryStance, Composition, UnitType};
use crate::terrain::Terrain;
use crate::world::{ArmySnapshot, Entrenchment, VillagerGroupSnapshot, WorldView};

/// Simple in-memory world state
#[derive(Debug, Clone)]
pub struct SimWorld {
    default_terrain: Terrain,
    terrain: AHashMap<HexCoord, Terrain>,
    armies: Vec<ArmySnapshot>,
    villagers: Vec<VillagerGroupSnapshot>,
    hostile: AHashSet<(OwnerId, OwnerId)>,
}

impl SimWorld {
    pub fn new(default_terrain: Terrain) -> Self {
        Self {
            default_terrain,
            terrain: AHashMap::new(),
            armies: Vec::new(),
            villagers: Vec::new(),
            hostile: AHashSet::new(),
        }
    }

    pub fn add_owner(&mut self) -> OwnerId {
        OwnerId::new()
    }

    /// Declare mutual hostility between two owners
    pub fn set_hostile(&mut self, a: OwnerId, b: OwnerId) {
        self.hostile.insert((a, b));
        self.hostile.insert((b, a));
    }

    pub fn set_terrain(&mut self, at: HexCoord, terrain: Terrain) {
        self.terrain.insert(at, terrain);
    }

    pub fn add_army(
        &mut self,
        owner: OwnerId,
        position: HexCoord,
        composition: Composition,
        arrived_at: SimSeconds,
    ) -> ArmyId {
        let id = ArmyId::new();
        self.armies.push(ArmySnapshot {
            id,
            owner,
            name: format!("Army {}", self.armies.len() + 1),
            position,
            composition,
            cavalry_stance: CavalryStance::default(),
            arrived_at,
            entrenched: None,
        });
        id
    }

    pub fn add_villagers(
        &mut self,
        owner: OwnerId,
        position: HexCoord,
        headcount: u32,
    ) -> VillagerGroupId {
        let id = VillagerGroupId::new();
        self.villagers.push(VillagerGroupSnapshot {
            id,
            owner,
            position,
            headcount,
        });
        id
    }

    pub fn entrench(&mut self, army: ArmyId, since: SimSeconds, covers: Vec<HexCoord>) {
        if let Some(a) = self.armies.iter_mut().find(|a| a.id == army) {
            a.entrenched = Some(Entrenchment { since, covers });
        }
    }

    pub fn set_cavalry_stance(&mut self, army: ArmyId, stance: CavalryStance) {
        if let Some(a) = self.armies.iter_mut().find(|a| a.id == army) {
            a.cavalry_stance = stance;
        }
    }

    pub fn armies(&self) -> &[ArmySnapshot] {
        &self.armies
    }

    pub fn villager_groups(&self) -> &[VillagerGroupSnapshot] {
        &self.villagers
    }

    /// Total units still fielded by an owner (villagers included)
    pub fn owner_strength(&self, owner: OwnerId) -> u32 {
        let army_units: u32 = self
            .armies
            .iter()
            .filter(|a| a.owner == owner)
            .map(|a| a.composition.total())
            .sum();
        let villager_units: u32 = self
            .villagers
            .iter()
            .filter(|g| g.owner == owner)
            .map(|g| g.headcount)
            .sum();
        army_units + villager_units
    }

    /// Fold a tick's emitted events back into the world records
    pub fn apply_events(&mut self, events: &[CombatEvent]) {
        for event in events {
            match event {
                CombatEvent::CombatEnded { report, .. } => {
                    for army_report in report
                        .attacker_armies
                        .iter()
                        .chain(report.defender_armies.iter())
                    {
                        match army_report.id {
                            CombatantId::Army(id) => {
                                if let Some(a) = self.armies.iter_mut().find(|a| a.id == id) {
                                    a.composition = army_report.survivors;
                                }
                            }
                            CombatantId::Villagers(id) => {
                                if let Some(g) = self.villagers.iter_mut().find(|g| g.id == id) {
                                    g.headcount =
                                        army_report.survivors.get(UnitType::Villager);
                                }
                            }
                        }
                    }
                }
                CombatEvent::ArmyDestroyed { army, .. } => {
                    self.armies.retain(|a| a.id != *army);
                }
                CombatEvent::VillagerGroupDestroyed { group, .. } => {
                    self.villagers.retain(|g| g.id != *group);
                }
                // Movement, notification, and bookkeeping consequences live
                // outside this stand-in world model
                CombatEvent::CombatStarted { .. }
                | CombatEvent::ReinforcementJoined { .. }
                | CombatEvent::PhaseCompleted { .. }
                | CombatEvent::ArmyRetreated { .. }
                | CombatEvent::StackCombatStarted { .. }
                | CombatEvent::TierAdvanced { .. }
                | CombatEvent::VillagerPhaseStarted { .. }
                | CombatEvent::StackCombatEnded { .. } => {}
            }
        }
    }
}

impl WorldView for SimWorld {
    fn army(&self, id: ArmyId) -> Option<ArmySnapshot> {
        self.armies.iter().find(|a| a.id == id).cloned()
    }

    fn armies_at(&self, at: HexCoord) -> Vec<ArmySnapshot> {
        self.armies
            .iter()
            .filter(|a| a.position == at)
            .cloned()
            .collect()
    }

    fn villager_groups_at(&self, at: HexCoord) -> Vec<VillagerGroupSnapshot> {
        self.villagers
            .iter()
            .filter(|g| g.position == at)
            .cloned()
            .collect()
    }

    fn entrenched_coverers_of(&self, at: HexCoord) -> Vec<ArmySnapshot> {
        self.armies
            .iter()
            .filter(|a| {
                a.position.is_adjacent(&at)
                    && a.entrenched
                        .as_ref()
                        .is_some_and(|e| e.covers.contains(&at))
            })
            .cloned()
            .collect()
    }

    fn is_hostile(&self, a: OwnerId, b: OwnerId) -> bool {
        self.hostile.contains(&(a, b))
    }

    fn terrain_at(&self, at: HexCoord) -> Terrain {
        self.terrain.get(&at).copied().unwrap_or(self.default_terrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::UnitType;

    #[test]
    fn test_hostility_is_symmetric() {
        let mut world = SimWorld::new(Terrain::Plains);
        let a = world.add_owner();
        let b = world.add_owner();
        world.set_hostile(a, b);
        assert!(world.is_hostile(a, b));
        assert!(world.is_hostile(b, a));
        assert!(!world.is_hostile(a, a));
    }

    #[test]
    fn test_terrain_override() {
        let mut world = SimWorld::new(Terrain::Plains);
        let hill = HexCoord::new(2, 2);
        world.set_terrain(hill, Terrain::Hills);
        assert_eq!(world.terrain_at(hill), Terrain::Hills);
        assert_eq!(world.terrain_at(HexCoord::new(0, 0)), Terrain::Plains);
    }

    #[test]
    fn test_coverers_require_adjacency_and_coverage() {
        let mut world = SimWorld::new(Terrain::Plains);
        let owner = world.add_owner();
        let tile = HexCoord::new(0, 0);

        let near = world.add_army(
            owner,
            HexCoord::new(1, 0),
            Composition::from_pairs(&[(UnitType::Spearman, 5)]),
            0.0,
        );
        world.entrench(near, 1.0, vec![tile]);

        let far = world.add_army(
            owner,
            HexCoord::new(3, 0),
            Composition::from_pairs(&[(UnitType::Spearman, 5)]),
            0.0,
        );
        world.entrench(far, 1.0, vec![tile]);

        let coverers = world.entrenched_coverers_of(tile);
        assert_eq!(coverers.len(), 1);
        assert_eq!(coverers[0].id, near);
    }
}
