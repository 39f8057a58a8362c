//! Drive one scenario to completion
//!
//! The engine has no internal timeout; the tick cap here is the caller-side
//! guard against non-termination.

use serde::Serialize;
use tracing::debug;

use crate::core::config::CombatConfig;
use crate::engine::{CombatEngine, CombatEvent};
use crate::sim::scenario::Scenario;
use crate::stats::StatsTable;
use crate::world::WorldView;

/// Outcome of one simulated engagement
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub sim_seconds: f64,
    pub timed_out: bool,
    pub attacker_victory: bool,
    pub combats_fought: usize,
    pub armies_destroyed: usize,
    pub villager_groups_destroyed: usize,
    pub attacker_units_left: u32,
    pub defender_units_left: u32,
}

/// Run a generated scenario until the engine idles or the tick cap hits
pub fn run_scenario(
    mut scenario: Scenario,
    seed: u64,
    config: &CombatConfig,
    table: &StatsTable,
    max_ticks: u64,
    tick_seconds: f64,
) -> RunSummary {
    let attacker_owner = scenario
        .world
        .army(scenario.attackers[0])
        .map(|a| a.owner)
        .unwrap_or_default();
    let defender_owner = scenario
        .world
        .armies()
        .iter()
        .find(|a| a.owner != attacker_owner)
        .map(|a| a.owner)
        .or_else(|| scenario.world.villager_groups().first().map(|g| g.owner))
        .unwrap_or_default();

    let mut engine = CombatEngine::new(config.clone(), table.clone());
    engine
        .start_attack(&scenario.world, &scenario.attackers, scenario.location, 0.0)
        .expect("scenario generation produced an invalid attack order");

    let mut ticks = 0u64;
    let mut now = 0.0;
    let mut combats_fought = 0;
    let mut armies_destroyed = 0;
    let mut villager_groups_destroyed = 0;

    while !engine.is_idle() && ticks < max_ticks {
        ticks += 1;
        now = ticks as f64 * tick_seconds;
        let events = engine.update(now, &scenario.world);
        for event in &events {
            match event {
                CombatEvent::CombatStarted { .. } => combats_fought += 1,
                CombatEvent::ArmyDestroyed { .. } => armies_destroyed += 1,
                CombatEvent::VillagerGroupDestroyed { .. } => villager_groups_destroyed += 1,
                _ => {}
            }
        }
        scenario.world.apply_events(&events);
    }
    debug!(seed, ticks, "scenario finished");

    let defender_left = scenario.world.owner_strength(defender_owner);
    RunSummary {
        seed,
        ticks,
        sim_seconds: now,
        timed_out: !engine.is_idle(),
        attacker_victory: defender_left == 0,
        combats_fought,
        armies_destroyed,
        villager_groups_destroyed,
        attacker_units_left: scenario.world.owner_strength(attacker_owner),
        defender_units_left: defender_left,
    }
}
