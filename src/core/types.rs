//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation time in seconds (continuous, caller-supplied)
pub type SimSeconds = f64;

/// Unique identifier for armies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmyId(pub Uuid);

impl ArmyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArmyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for villager groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VillagerGroupId(pub Uuid);

impl VillagerGroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VillagerGroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for owners (players or AI factions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine-allocated identifier for a single combat resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatId(pub u64);

impl CombatId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}
