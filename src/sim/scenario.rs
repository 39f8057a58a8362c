//! Seeded scenario generation for batch runs
//!
//! Deterministic per seed: the same `ScenarioConfig` always yields the same
//! armies, so batch results are reproducible run to run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::ArmyId;
use crate::hex::HexCoord;
use crate::sim::SimWorld;
use crate::stats::{Composition, UnitType};
use crate::terrain::Terrain;

/// Parameters for one generated engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub attacker_armies: usize,
    pub defender_armies: usize,
    /// How many defenders start dug in (clamped to `defender_armies`)
    pub entrenched_defenders: usize,
    pub villager_groups: usize,
    pub units_per_army: u32,
    pub terrain: Terrain,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            attacker_armies: 2,
            defender_armies: 2,
            entrenched_defenders: 1,
            villager_groups: 1,
            units_per_army: 60,
            terrain: Terrain::Plains,
        }
    }
}

/// A generated world plus the attack order to run against it
pub struct Scenario {
    pub world: SimWorld,
    pub attackers: Vec<ArmyId>,
    pub location: HexCoord,
}

/// Field army types drawn for random compositions (villagers excluded)
const FIELD_TYPES: [UnitType; 8] = [
    UnitType::Swordsman,
    UnitType::Spearman,
    UnitType::Archer,
    UnitType::Crossbowman,
    UnitType::Lancer,
    UnitType::Outrider,
    UnitType::Catapult,
    UnitType::Ballista,
];

fn random_composition(rng: &mut ChaCha8Rng, units: u32) -> Composition {
    let kinds = rng.gen_range(2..=4usize);
    let mut comp = Composition::new();
    let mut left = units;
    for i in 0..kinds {
        if left == 0 {
            break;
        }
        let ty = FIELD_TYPES[rng.gen_range(0..FIELD_TYPES.len())];
        let share = if i + 1 == kinds {
            left
        } else {
            rng.gen_range(1..=left.saturating_sub(kinds as u32 - i as u32 - 1).max(1))
        };
        comp.add(ty, share);
        left -= share;
        if left == 0 {
            break;
        }
    }
    comp
}

/// Build a contested-tile scenario from a config
pub fn generate(config: &ScenarioConfig) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut world = SimWorld::new(config.terrain);

    let attacker_owner = world.add_owner();
    let defender_owner = world.add_owner();
    world.set_hostile(attacker_owner, defender_owner);

    let location = HexCoord::new(0, 0);
    let staging = HexCoord::new(-1, 0);

    let mut attackers = Vec::new();
    for _ in 0..config.attacker_armies.max(1) {
        let comp = random_composition(&mut rng, config.units_per_army);
        attackers.push(world.add_army(attacker_owner, staging, comp, 0.0));
    }

    let entrenched = config.entrenched_defenders.min(config.defender_armies);
    for i in 0..config.defender_armies {
        let comp = random_composition(&mut rng, config.units_per_army);
        let arrived = i as f64;
        let army = world.add_army(defender_owner, location, comp, arrived);
        if i < entrenched {
            world.entrench(army, arrived + 0.5, Vec::new());
        }
    }

    for _ in 0..config.villager_groups {
        let headcount = rng.gen_range(8..=24);
        world.add_villagers(defender_owner, location, headcount);
    }

    Scenario {
        world,
        attackers,
        location,
    }
}
