//! Combat tuning configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose
//! and how they interact with each other. Defaults reproduce the reference
//! balance; the simulator can override them from a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{EngineError, Result};

/// Configuration for combat resolution
///
/// These values have been tuned against the scenario suite in `tests/`.
/// Changing them shifts engagement pacing and casualty ratios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === PHASES ===
    /// Duration of the opening ranged exchange, in seconds
    ///
    /// Melee-capable units spend this window closing the distance; only
    /// ranged and siege units deal damage during it.
    pub ranged_phase_seconds: f64,

    /// Duration of the bonus window granted to a reinforcing army, in seconds
    ///
    /// While inside the window the army's cavalry resolve with the charge
    /// multiplier and its ranged units with the volley multiplier, regardless
    /// of the phase the aggregate battle has reached.
    pub reinforcement_window_seconds: f64,

    // === DAMAGE MODIFIERS ===
    /// Damage-reduction fraction applied to an entrenched defender side
    ///
    /// 0.25 means entrenched defenders absorb 25% less of every hit.
    pub entrenchment_bonus: f64,

    /// Damage-output penalty per simultaneous front an army fights on
    ///
    /// Feeds `StackCombat::stretching_multiplier`:
    /// `max(floor, 1 - penalty * fronts)`.
    pub stretching_penalty_per_front: f64,

    /// Lower bound of the stretching multiplier
    ///
    /// An army spread across arbitrarily many fronts never drops below
    /// this fraction of its damage output.
    pub stretching_floor: f64,

    /// Bonus damage fraction for Flank-stance cavalry striking Ranged units
    pub flank_ranged_bonus: f64,

    /// Damage multiplier for cavalry inside a reinforcement window (the charge)
    pub charge_window_multiplier: f64,

    /// Damage multiplier for ranged units inside a reinforcement window
    pub ranged_window_multiplier: f64,

    /// Minimum per-unit damage after armor, per second
    ///
    /// Keeps heavily-armored matchups from stalling forever: every attacking
    /// unit always chips at least this much through.
    pub min_effective_damage: f64,

    // === STACK ORCHESTRATION ===
    /// Cap on simultaneously active pairings within one stack combat
    ///
    /// Queued attackers beyond the cap wait for a pairing slot to free up.
    pub max_active_pairings_per_stack: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            ranged_phase_seconds: 3.0,
            reinforcement_window_seconds: 3.0,
            entrenchment_bonus: 0.25,
            stretching_penalty_per_front: 0.15,
            stretching_floor: 0.1,
            flank_ranged_bonus: 0.25,
            charge_window_multiplier: 1.5,
            ranged_window_multiplier: 1.25,
            min_effective_damage: 0.5,
            max_active_pairings_per_stack: 6,
        }
    }
}

impl CombatConfig {
    /// Load overrides from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| EngineError::ConfigError(e.to_string()))
    }
}
