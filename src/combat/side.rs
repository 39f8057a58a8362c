//! One side's aggregated state within a single pairing
//!
//! The unit of damage application. Counts and fractional accumulators are
//! arrays over the closed unit-type set; an accumulator entry lives only
//! while its count is nonzero and is cleared the moment the type zeroes out.

use serde::{Deserialize, Serialize};

use crate::stats::{CavalryStance, Composition, StatsTable, UnitType};

/// Guards `floor(accumulator / hp)` against float round-off when split
/// damage sums to an exact whole-unit boundary.
const KILL_EPSILON: f64 = 1e-9;

/// Aggregated combat state for one side of a pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideCombatState {
    counts: Composition,
    accumulators: [f64; UnitType::COUNT],

    // Snapshot at creation (reinforcements merge in)
    initial: Composition,
    initial_total: u32,

    pub cavalry_stance: CavalryStance,

    // Reporting
    damage_dealt_by_type: [f64; UnitType::COUNT],
    damage_received_by_type: [f64; UnitType::COUNT],
    casualties: Composition,
}

impl SideCombatState {
    pub fn new(composition: Composition, cavalry_stance: CavalryStance) -> Self {
        Self {
            counts: composition,
            accumulators: [0.0; UnitType::COUNT],
            initial: composition,
            initial_total: composition.total(),
            cavalry_stance,
            damage_dealt_by_type: [0.0; UnitType::COUNT],
            damage_received_by_type: [0.0; UnitType::COUNT],
            casualties: Composition::new(),
        }
    }

    pub fn counts(&self) -> &Composition {
        &self.counts
    }

    pub fn initial(&self) -> &Composition {
        &self.initial
    }

    pub fn initial_total(&self) -> u32 {
        self.initial_total
    }

    pub fn total(&self) -> u32 {
        self.counts.total()
    }

    pub fn is_defeated(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn melee_capable_total(&self) -> u32 {
        self.counts.melee_capable_total()
    }

    pub fn casualties(&self) -> &Composition {
        &self.casualties
    }

    pub fn damage_dealt(&self, ty: UnitType) -> f64 {
        self.damage_dealt_by_type[ty.index()]
    }

    pub fn damage_received(&self, ty: UnitType) -> f64 {
        self.damage_received_by_type[ty.index()]
    }

    /// Pending fractional damage against a type (zero once the type is gone)
    pub fn accumulator(&self, ty: UnitType) -> f64 {
        self.accumulators[ty.index()]
    }

    /// Credit damage output to the attacking type, for reporting
    pub fn record_damage_dealt(&mut self, ty: UnitType, amount: f64) {
        self.damage_dealt_by_type[ty.index()] += amount;
    }

    /// Apply damage to one target type and return the number of kills
    ///
    /// Damage lands in the type's fractional accumulator; whole kills are
    /// carved out at `floor(accumulator / hp)`, capped at the remaining
    /// count, and the remainder carries forward. Fractional damage never
    /// disappears and a unit only dies when cumulative damage crosses a
    /// whole-HP boundary. When the last unit of a type falls, the type's
    /// accumulator entry is removed with it.
    pub fn apply_damage(
        &mut self,
        amount: f64,
        target: UnitType,
        effective_hp: Option<f64>,
        table: &StatsTable,
    ) -> u32 {
        let count = self.counts.get(target);
        if count == 0 || amount <= 0.0 {
            return 0;
        }

        let hp = effective_hp.unwrap_or(table[target].hit_points);
        debug_assert!(hp > 0.0);

        let idx = target.index();
        self.damage_received_by_type[idx] += amount;
        self.accumulators[idx] += amount;

        let kills = (((self.accumulators[idx] + KILL_EPSILON) / hp).floor() as u32).min(count);
        if kills > 0 {
            self.counts.remove(target, kills);
            self.casualties.add(target, kills);
            self.accumulators[idx] -= kills as f64 * hp;
        }
        if self.counts.get(target) == 0 {
            self.accumulators[idx] = 0.0;
        }
        kills
    }

    /// Merge an arriving reinforcement into the aggregate
    ///
    /// Both the live counts and the initial snapshot grow, so casualty
    /// conservation holds for the combined force.
    pub fn merge_reinforcement(&mut self, composition: &Composition) {
        self.counts.merge(composition);
        self.initial.merge(composition);
        self.initial_total += composition.total();
    }
}
