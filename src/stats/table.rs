//! Per-unit-type combat statistics
//!
//! Stats are immutable data loaded once at startup and queried by pure
//! functions. Three damage channels against three armor channels, plus flat
//! bonuses against the four unit categories and buildings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Index;
use std::path::Path;

use crate::core::error::{EngineError, Result};
use crate::stats::unit_type::{UnitCategory, UnitType};

/// Flat damage bonuses against each category (and buildings)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryBonuses {
    pub infantry: f64,
    pub ranged: f64,
    pub cavalry: f64,
    pub siege: f64,
    pub buildings: f64,
}

impl CategoryBonuses {
    /// Bonus against a defending category
    pub fn against(&self, category: UnitCategory) -> f64 {
        match category {
            UnitCategory::Infantry => self.infantry,
            UnitCategory::Ranged => self.ranged,
            UnitCategory::Cavalry => self.cavalry,
            UnitCategory::Siege => self.siege,
        }
    }
}

/// Immutable combat statistics for one unit type
///
/// Damage values are per unit per second of engagement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitCombatStats {
    pub melee_damage: f64,
    pub pierce_damage: f64,
    pub bludgeon_damage: f64,

    pub melee_armor: f64,
    pub pierce_armor: f64,
    pub bludgeon_armor: f64,

    #[serde(default)]
    pub bonuses: CategoryBonuses,

    pub hit_points: f64,
    /// Tiles per minute on open ground; consumed by the movement layer
    pub speed: f64,
}

impl UnitCombatStats {
    /// Sum of all three damage channels
    pub fn total_damage(&self) -> f64 {
        self.melee_damage + self.pierce_damage + self.bludgeon_damage
    }

    /// Mean of all three armor channels
    pub fn average_armor(&self) -> f64 {
        (self.melee_armor + self.pierce_armor + self.bludgeon_armor) / 3.0
    }
}

/// Aggregate of several stat records: damage and armor summed, bonuses averaged
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregatedStats {
    pub melee_damage: f64,
    pub pierce_damage: f64,
    pub bludgeon_damage: f64,
    pub melee_armor: f64,
    pub pierce_armor: f64,
    pub bludgeon_armor: f64,
    pub bonuses: CategoryBonuses,
}

impl AggregatedStats {
    pub fn from_stats(stats: &[UnitCombatStats]) -> Self {
        let mut agg = AggregatedStats::default();
        if stats.is_empty() {
            return agg;
        }
        for s in stats {
            agg.melee_damage += s.melee_damage;
            agg.pierce_damage += s.pierce_damage;
            agg.bludgeon_damage += s.bludgeon_damage;
            agg.melee_armor += s.melee_armor;
            agg.pierce_armor += s.pierce_armor;
            agg.bludgeon_armor += s.bludgeon_armor;
            agg.bonuses.infantry += s.bonuses.infantry;
            agg.bonuses.ranged += s.bonuses.ranged;
            agg.bonuses.cavalry += s.bonuses.cavalry;
            agg.bonuses.siege += s.bonuses.siege;
            agg.bonuses.buildings += s.bonuses.buildings;
        }
        let n = stats.len() as f64;
        agg.bonuses.infantry /= n;
        agg.bonuses.ranged /= n;
        agg.bonuses.cavalry /= n;
        agg.bonuses.siege /= n;
        agg.bonuses.buildings /= n;
        agg
    }

    pub fn total_damage(&self) -> f64 {
        self.melee_damage + self.pierce_damage + self.bludgeon_damage
    }
}

impl UnitType {
    /// Built-in stats for this unit type
    pub fn base_stats(&self) -> UnitCombatStats {
        match self {
            UnitType::Swordsman => UnitCombatStats {
                melee_damage: 6.0,
                pierce_damage: 0.0,
                bludgeon_damage: 1.0,
                melee_armor: 2.0,
                pierce_armor: 1.0,
                bludgeon_armor: 1.0,
                bonuses: CategoryBonuses {
                    infantry: 2.0,
                    buildings: 2.0,
                    ..Default::default()
                },
                hit_points: 60.0,
                speed: 1.0,
            },

            UnitType::Spearman => UnitCombatStats {
                melee_damage: 4.0,
                pierce_damage: 2.0,
                bludgeon_damage: 0.0,
                melee_armor: 1.0,
                pierce_armor: 1.0,
                bludgeon_armor: 1.0,
                bonuses: CategoryBonuses {
                    cavalry: 8.0, // Braced spears punish a charge
                    ..Default::default()
                },
                hit_points: 55.0,
                speed: 1.0,
            },

            UnitType::Villager => UnitCombatStats {
                melee_damage: 1.5,
                pierce_damage: 0.0,
                bludgeon_damage: 0.5,
                melee_armor: 0.0,
                pierce_armor: 0.0,
                bludgeon_armor: 0.0,
                bonuses: CategoryBonuses::default(),
                hit_points: 25.0,
                speed: 0.8,
            },

            UnitType::Archer => UnitCombatStats {
                melee_damage: 1.0,
                pierce_damage: 5.0,
                bludgeon_damage: 0.0,
                melee_armor: 0.0,
                pierce_armor: 1.0,
                bludgeon_armor: 0.0,
                bonuses: CategoryBonuses {
                    infantry: 1.0,
                    ..Default::default()
                },
                hit_points: 35.0,
                speed: 1.0,
            },

            UnitType::Crossbowman => UnitCombatStats {
                melee_damage: 1.0,
                pierce_damage: 7.0,
                bludgeon_damage: 0.0,
                melee_armor: 1.0,
                pierce_armor: 1.0,
                bludgeon_armor: 0.0,
                bonuses: CategoryBonuses {
                    infantry: 2.0,
                    ..Default::default()
                },
                hit_points: 40.0,
                speed: 0.9,
            },

            UnitType::Lancer => UnitCombatStats {
                melee_damage: 8.0,
                pierce_damage: 2.0,
                bludgeon_damage: 0.0,
                melee_armor: 2.0,
                pierce_armor: 1.0,
                bludgeon_armor: 1.0,
                bonuses: CategoryBonuses {
                    ranged: 4.0,
                    siege: 4.0,
                    ..Default::default()
                },
                hit_points: 90.0,
                speed: 1.8,
            },

            UnitType::Outrider => UnitCombatStats {
                melee_damage: 5.0,
                pierce_damage: 1.0,
                bludgeon_damage: 0.0,
                melee_armor: 1.0,
                pierce_armor: 1.0,
                bludgeon_armor: 0.0,
                bonuses: CategoryBonuses {
                    ranged: 6.0,
                    ..Default::default()
                },
                hit_points: 70.0,
                speed: 2.0,
            },

            UnitType::Catapult => UnitCombatStats {
                melee_damage: 0.0,
                pierce_damage: 0.0,
                bludgeon_damage: 20.0,
                melee_armor: 0.0,
                pierce_armor: 0.0,
                bludgeon_armor: 2.0,
                bonuses: CategoryBonuses {
                    buildings: 40.0,
                    ..Default::default()
                },
                hit_points: 120.0,
                speed: 0.4,
            },

            UnitType::Ballista => UnitCombatStats {
                melee_damage: 0.0,
                pierce_damage: 12.0,
                bludgeon_damage: 0.0,
                melee_armor: 0.0,
                pierce_armor: 1.0,
                bludgeon_armor: 1.0,
                bonuses: CategoryBonuses {
                    siege: 6.0,
                    buildings: 15.0,
                    ..Default::default()
                },
                hit_points: 100.0,
                speed: 0.5,
            },
        }
    }
}

/// Stats for every unit type, indexed by `UnitType`
///
/// Built once at startup; `Index<UnitType>` is the only query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsTable {
    entries: Vec<UnitCombatStats>,
}

impl Default for StatsTable {
    fn default() -> Self {
        Self {
            entries: UnitType::ALL.iter().map(|t| t.base_stats()).collect(),
        }
    }
}

impl StatsTable {
    /// Load a full replacement table from a TOML file
    ///
    /// The file maps unit type names to stat records; types absent from the
    /// file keep their built-in stats.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let overrides: std::collections::HashMap<UnitType, UnitCombatStats> =
            toml::from_str(&text).map_err(|e| EngineError::ConfigError(e.to_string()))?;

        let mut table = StatsTable::default();
        for (ty, stats) in overrides {
            table.entries[ty.index()] = stats;
        }
        Ok(table)
    }
}

impl Index<UnitType> for StatsTable {
    type Output = UnitCombatStats;

    fn index(&self, ty: UnitType) -> &UnitCombatStats {
        &self.entries[ty.index()]
    }
}
