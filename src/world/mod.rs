//! Contract with the surrounding world model
//!
//! The engine never mutates world entities directly. It reads snapshots
//! through `WorldView` and emits `CombatEvent`s; the world model applies them
//! after `update` returns.

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, OwnerId, SimSeconds, VillagerGroupId};
use crate::hex::HexCoord;
use crate::stats::{CavalryStance, Composition};
use crate::terrain::Terrain;

/// Entrenchment status of an army
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entrenchment {
    /// When the army finished digging in
    pub since: SimSeconds,
    /// Tiles this position covers beyond the one it occupies
    pub covers: Vec<HexCoord>,
}

/// Read-only view of one army, as supplied by the world model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmySnapshot {
    pub id: ArmyId,
    pub owner: OwnerId,
    pub name: String,
    pub position: HexCoord,
    pub composition: Composition,
    pub cavalry_stance: CavalryStance,
    /// When the army reached its current tile
    pub arrived_at: SimSeconds,
    pub entrenched: Option<Entrenchment>,
}

/// Read-only view of one villager group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VillagerGroupSnapshot {
    pub id: VillagerGroupId,
    pub owner: OwnerId,
    pub position: HexCoord,
    pub headcount: u32,
}

/// Queries the engine needs from the world model
pub trait WorldView {
    fn army(&self, id: ArmyId) -> Option<ArmySnapshot>;

    /// Armies occupying a tile
    fn armies_at(&self, at: HexCoord) -> Vec<ArmySnapshot>;

    /// Villager groups on a tile
    fn villager_groups_at(&self, at: HexCoord) -> Vec<VillagerGroupSnapshot>;

    /// Entrenched armies on *adjacent* tiles whose coverage includes this tile
    fn entrenched_coverers_of(&self, at: HexCoord) -> Vec<ArmySnapshot>;

    /// Diplomatic hostility between two owners
    fn is_hostile(&self, a: OwnerId, b: OwnerId) -> bool;

    fn terrain_at(&self, at: HexCoord) -> Terrain;
}
