//! Unit types and categories
//!
//! The type set is closed: every table in the engine is an array indexed by
//! `UnitType::index()`, so an unknown unit type is unrepresentable.

use serde::{Deserialize, Serialize};

/// Type of military unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    // Infantry
    Swordsman,
    Spearman,
    Villager, // Militia; fights only when pressed into defense

    // Ranged
    Archer,
    Crossbowman,

    // Cavalry
    Lancer,
    Outrider,

    // Siege
    Catapult,
    Ballista,
}

/// Broad combat role of a unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Infantry,
    Ranged,
    Cavalry,
    Siege,
}

/// Stance orders for a side's cavalry contingent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CavalryStance {
    /// Fights in the line alongside infantry
    #[default]
    Frontline,
    /// Sweeps wide for the enemy's ranged and siege units
    Flank,
    /// Held back; commits only once the battle reaches cleanup
    Reserve,
}

impl UnitType {
    pub const COUNT: usize = 9;

    /// All unit types in canonical (index) order
    pub const ALL: [UnitType; Self::COUNT] = [
        UnitType::Swordsman,
        UnitType::Spearman,
        UnitType::Villager,
        UnitType::Archer,
        UnitType::Crossbowman,
        UnitType::Lancer,
        UnitType::Outrider,
        UnitType::Catapult,
        UnitType::Ballista,
    ];

    /// Dense index for array tables
    pub fn index(&self) -> usize {
        match self {
            UnitType::Swordsman => 0,
            UnitType::Spearman => 1,
            UnitType::Villager => 2,
            UnitType::Archer => 3,
            UnitType::Crossbowman => 4,
            UnitType::Lancer => 5,
            UnitType::Outrider => 6,
            UnitType::Catapult => 7,
            UnitType::Ballista => 8,
        }
    }

    /// Combat role of this unit type
    pub fn category(&self) -> UnitCategory {
        match self {
            UnitType::Swordsman | UnitType::Spearman | UnitType::Villager => {
                UnitCategory::Infantry
            }
            UnitType::Archer | UnitType::Crossbowman => UnitCategory::Ranged,
            UnitType::Lancer | UnitType::Outrider => UnitCategory::Cavalry,
            UnitType::Catapult | UnitType::Ballista => UnitCategory::Siege,
        }
    }

    /// Does this type fight in the melee line?
    pub fn is_melee_capable(&self) -> bool {
        matches!(
            self.category(),
            UnitCategory::Infantry | UnitCategory::Cavalry
        )
    }
}
