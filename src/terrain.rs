//! Terrain types and their combat effects
//!
//! Terrain shapes an engagement two ways: a multiplier on attacker damage
//! output and an additive bonus to defender effective hit points.

use serde::{Deserialize, Serialize};

/// Terrain of a world tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Plains, // Baseline, no modifiers
    Forest,     // Broken lines, some cover
    Hills,      // High ground for the defender
    Marsh,      // Attacks bog down
    Ford,       // Assaulting across water
    Settlement, // Streets and walls favor the defender
}

impl Terrain {
    /// Multiplier on attacker damage output (1.0 = no effect)
    pub fn attack_modifier(&self) -> f64 {
        match self {
            Terrain::Plains => 1.0,
            Terrain::Forest => 0.9,
            Terrain::Hills => 0.95,
            Terrain::Marsh => 0.8,
            Terrain::Ford => 0.75,
            Terrain::Settlement => 0.9,
        }
    }

    /// Additive fraction on defender effective hit points (0.0 = no effect)
    pub fn defense_bonus(&self) -> f64 {
        match self {
            Terrain::Plains => 0.0,
            Terrain::Forest => 0.15,
            Terrain::Hills => 0.25,
            Terrain::Marsh => 0.0,
            Terrain::Ford => 0.2,
            Terrain::Settlement => 0.3,
        }
    }

    /// Both modifiers, computed once per combat
    pub fn modifiers(&self) -> TerrainModifiers {
        TerrainModifiers {
            attack: self.attack_modifier(),
            defense: self.defense_bonus(),
        }
    }
}

/// Derived combat modifiers for a tile's terrain
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TerrainModifiers {
    pub attack: f64,
    pub defense: f64,
}
