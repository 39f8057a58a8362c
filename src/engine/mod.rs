//! Top-level combat orchestration
//!
//! Owns every in-flight `ActiveCombat` and `StackCombat`, starts new ones,
//! and drives their per-tick update. Within one tick, phase transitions are
//! evaluated and recorded before new pairings are drawn, so an army freed
//! this tick re-engages no earlier than the next.

pub mod events;

pub use events::CombatEvent;

use ahash::{AHashMap, AHashSet};
use tracing::{debug, info, warn};

use crate::combat::{ActiveCombat, CombatReport, CombatSide, CombatWinner, CombatantId};
use crate::core::config::CombatConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{ArmyId, CombatId, SimSeconds};
use crate::hex::HexCoord;
use crate::stack::{DefensiveStack, StackCombat, StackEntry};
use crate::stats::StatsTable;
use crate::world::{ArmySnapshot, WorldView};

/// A survivor waiting to re-enter its queue at the end of the tick
enum Requeue {
    Attacker(ArmyId),
    Defender(StackEntry),
}

/// The combat resolution engine
///
/// Single-threaded cooperative: everything advances synchronously inside one
/// `update` call. Emptiness of both collections is the termination signal for
/// a simulation tick loop.
pub struct CombatEngine {
    config: CombatConfig,
    table: StatsTable,
    combats: Vec<ActiveCombat>,
    stacks: Vec<StackCombat>,
    next_combat_id: u64,
    pending_events: Vec<CombatEvent>,
}

impl CombatEngine {
    pub fn new(config: CombatConfig, table: StatsTable) -> Self {
        Self {
            config,
            table,
            combats: Vec::new(),
            stacks: Vec::new(),
            next_combat_id: 0,
            pending_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn active_combats(&self) -> &[ActiveCombat] {
        &self.combats
    }

    pub fn stack_combats(&self) -> &[StackCombat] {
        &self.stacks
    }

    /// Nothing left to resolve
    pub fn is_idle(&self) -> bool {
        self.combats.is_empty() && self.stacks.is_empty()
    }

    /// Is this army engaged anywhere (pairing, queue, or front table)?
    pub fn involves_army(&self, army: ArmyId) -> bool {
        self.combats
            .iter()
            .any(|c| !c.is_ended() && c.involves_army(army))
            || self.stacks.iter().any(|s| s.involves_army(army))
    }

    fn alloc_combat_id(&mut self) -> CombatId {
        self.next_combat_id += 1;
        CombatId(self.next_combat_id)
    }

    /// Reject an engagement request for an army that is already fighting
    ///
    /// A duplicate request is a caller programming error: loud in debug
    /// builds, a logged rejection in release.
    fn ensure_unengaged(&self, army: ArmyId) -> Result<()> {
        if self.involves_army(army) {
            debug_assert!(false, "army {:?} is already engaged", army);
            warn!(?army, "rejected engagement request for busy army");
            return Err(EngineError::ArmyAlreadyEngaged(army));
        }
        Ok(())
    }

    /// Open a simple 1-vs-1 combat between two armies
    pub fn start_combat(
        &mut self,
        world: &dyn WorldView,
        attacker: ArmyId,
        defender: ArmyId,
        now: SimSeconds,
    ) -> Result<CombatId> {
        self.ensure_unengaged(attacker)?;
        self.ensure_unengaged(defender)?;
        let attacker_snap = world
            .army(attacker)
            .ok_or(EngineError::ArmyNotFound(attacker))?;
        let defender_snap = world
            .army(defender)
            .ok_or(EngineError::ArmyNotFound(defender))?;

        let terrain = world.terrain_at(defender_snap.position);
        let entrenchment = if defender_snap.entrenched.is_some() {
            self.config.entrenchment_bonus
        } else {
            0.0
        };

        let id = self.alloc_combat_id();
        let combat = ActiveCombat::new(
            id,
            &attacker_snap,
            &defender_snap,
            defender_snap.position,
            terrain,
            entrenchment,
            now,
        );
        info!(combat = id.0, ?attacker, ?defender, "combat started");
        self.pending_events.push(CombatEvent::CombatStarted {
            combat: id,
            location: defender_snap.position,
            attacker,
            defenders: vec![CombatantId::Army(defender)],
        });
        self.combats.push(combat);
        Ok(id)
    }

    /// Open a stack combat over a contested tile
    pub fn start_stack_combat(
        &mut self,
        world: &dyn WorldView,
        attackers: &[ArmyId],
        location: HexCoord,
        now: SimSeconds,
    ) -> Result<()> {
        let stack = self.classify_defenders(world, attackers, location)?;
        self.open_stack(attackers, location, stack, now);
        Ok(())
    }

    /// Resolve an attack on a tile, choosing the right combat shape
    ///
    /// A lone attacker against a single unentrenched defender is a plain
    /// pairing; anything else (multiple defenders, any entrenchment, or
    /// villagers present) becomes a stack combat.
    pub fn start_attack(
        &mut self,
        world: &dyn WorldView,
        attackers: &[ArmyId],
        location: HexCoord,
        now: SimSeconds,
    ) -> Result<()> {
        let stack = self.classify_defenders(world, attackers, location)?;

        let simple = attackers.len() == 1
            && stack.army_defenders() == 1
            && !stack.has_entrenched()
            && stack.villagers.is_empty();
        if simple {
            self.start_combat(world, attackers[0], stack.entries[0].army, now)?;
        } else {
            self.open_stack(attackers, location, stack, now);
        }
        Ok(())
    }

    fn classify_defenders(
        &self,
        world: &dyn WorldView,
        attackers: &[ArmyId],
        location: HexCoord,
    ) -> Result<DefensiveStack> {
        let first = *attackers
            .first()
            .ok_or(EngineError::NoAttackers(location))?;
        for army in attackers {
            self.ensure_unengaged(*army)?;
            world.army(*army).ok_or(EngineError::ArmyNotFound(*army))?;
        }
        let owner = world
            .army(first)
            .ok_or(EngineError::ArmyNotFound(first))?
            .owner;

        let engaged = |id: ArmyId| self.involves_army(id);
        Ok(DefensiveStack::build(
            world,
            location,
            owner,
            &self.config,
            &engaged,
        ))
    }

    fn open_stack(
        &mut self,
        attackers: &[ArmyId],
        location: HexCoord,
        stack: DefensiveStack,
        _now: SimSeconds,
    ) {
        info!(
            ?location,
            attackers = attackers.len(),
            defenders = stack.army_defenders(),
            villagers = stack.villagers.len(),
            "stack combat started"
        );
        self.pending_events.push(CombatEvent::StackCombatStarted {
            location,
            attackers: attackers.to_vec(),
            army_defenders: stack.army_defenders(),
            villager_groups: stack.villagers.len(),
        });
        self.stacks
            .push(StackCombat::new(location, attackers.to_vec(), stack));
    }

    /// Merge an army into one side of a running combat
    ///
    /// The side is chosen by hostility: an army hostile to the attacker side
    /// reinforces the defenders, anything else the attackers.
    pub fn add_reinforcement(
        &mut self,
        world: &dyn WorldView,
        combat_id: CombatId,
        army: ArmyId,
        now: SimSeconds,
    ) -> Result<()> {
        self.ensure_unengaged(army)?;
        let snap = world.army(army).ok_or(EngineError::ArmyNotFound(army))?;

        let combat = self
            .combats
            .iter_mut()
            .find(|c| c.id == combat_id && !c.is_ended())
            .ok_or(EngineError::CombatNotFound(combat_id))?;

        let attacker_owner = combat
            .armies(CombatSide::Attacker)
            .first()
            .map(|a| a.owner);
        let side = match attacker_owner {
            Some(owner) if world.is_hostile(snap.owner, owner) => CombatSide::Defender,
            _ => CombatSide::Attacker,
        };

        combat.add_reinforcement(side, &snap, now, &self.config);
        self.pending_events.push(CombatEvent::ReinforcementJoined {
            combat: combat_id,
            army,
            side,
        });
        Ok(())
    }

    /// Withdraw an army from every fight it is in (retreat order)
    ///
    /// Each pairing it leaves completes immediately with the opposing army as
    /// winner; the opponent re-enters its queue and the combat is closed.
    pub fn withdraw_army(&mut self, army: ArmyId, now: SimSeconds) {
        if !self.involves_army(army) {
            debug!(?army, "withdraw for an army not in combat");
            return;
        }
        self.pending_events.push(CombatEvent::ArmyRetreated { army });

        for stack in self.stacks.iter_mut() {
            if !stack.involves_army(army) {
                continue;
            }
            let voided = stack.remove_army(army, true);
            for combat_id in voided {
                // Re-queue the surviving opponent per the completed pairing
                let survivor = stack
                    .pairings()
                    .iter()
                    .find(|p| p.combat == combat_id)
                    .map(|p| (p.attacker, p.defender.clone(), p.winner));
                if let Some((attacker, entry, winner)) = survivor {
                    if winner == Some(attacker) {
                        stack.enqueue_attacker(attacker);
                    } else {
                        stack.enqueue_defender(entry);
                    }
                }
                if let Some(combat) = self.combats.iter_mut().find(|c| c.id == combat_id) {
                    combat.force_end(now);
                }
            }
        }

        // Standalone pairings end as-is; the report shows both sides standing
        for combat in self.combats.iter_mut() {
            if !combat.is_ended() && combat.involves_army(army) {
                combat.force_end(now);
            }
        }
    }

    /// Advance every in-flight combat to `now`
    ///
    /// Tick order: advance pairings (phase transitions recorded first),
    /// process completions into stack bookkeeping, then drain queues into new
    /// pairings, then drop finished combats and stacks.
    pub fn update(&mut self, now: SimSeconds, world: &dyn WorldView) -> Vec<CombatEvent> {
        let mut events = std::mem::take(&mut self.pending_events);

        // Stretching multipliers frozen for this tick
        let mut stretch: AHashMap<ArmyId, f64> = AHashMap::new();
        for stack in &self.stacks {
            for (army, _) in stack.armies_with_fronts() {
                stretch.insert(army, stack.stretching_multiplier(army, &self.config));
            }
        }

        // 1. Advance pairings
        for combat in self.combats.iter_mut() {
            if let Some(record) = combat.update(now, &self.table, &self.config, &stretch) {
                events.push(CombatEvent::PhaseCompleted {
                    combat: combat.id,
                    record,
                });
            }
        }

        // 2. Completions
        let mut remaining = Vec::with_capacity(self.combats.len());
        let mut finished = Vec::new();
        for combat in self.combats.drain(..) {
            if combat.is_ended() {
                finished.push(combat);
            } else {
                remaining.push(combat);
            }
        }
        self.combats = remaining;
        // Survivors re-enter their queues only after this tick's pairing
        // draw, so a freed army cannot re-engage in the same tick
        let mut deferred: Vec<(HexCoord, Requeue)> = Vec::new();
        let mut destroyed: AHashSet<CombatantId> = AHashSet::new();
        for combat in finished {
            self.process_completion(&combat, world, &mut events, &mut deferred, &mut destroyed);
        }

        // 3. Draw new pairings from the stack queues
        for idx in 0..self.stacks.len() {
            self.drain_stack(idx, now, world, &mut events);
        }
        for (location, op) in deferred {
            if let Some(stack) = self.stacks.iter_mut().find(|s| s.location == location) {
                match op {
                    Requeue::Attacker(army) => stack.enqueue_attacker(army),
                    Requeue::Defender(entry) => stack.enqueue_defender(entry),
                }
            }
        }

        // 4. Drop completed stacks
        let mut keep = Vec::with_capacity(self.stacks.len());
        for stack in std::mem::take(&mut self.stacks) {
            if stack.is_complete() {
                info!(location = ?stack.location, "stack combat ended");
                events.push(CombatEvent::StackCombatEnded {
                    location: stack.location,
                });
            } else {
                keep.push(stack);
            }
        }
        self.stacks = keep;

        events
    }

    /// Fold one finished combat into events and stack bookkeeping
    ///
    /// Surviving armies are not re-queued here; they land in `deferred` and
    /// join their queues after the current tick's pairing draw.
    fn process_completion(
        &mut self,
        combat: &ActiveCombat,
        world: &dyn WorldView,
        events: &mut Vec<CombatEvent>,
        deferred: &mut Vec<(HexCoord, Requeue)>,
        destroyed: &mut AHashSet<CombatantId>,
    ) {
        let report = combat.report();
        let winner = combat.winner();
        info!(combat = combat.id.0, ?winner, "combat ended");
        events.push(CombatEvent::CombatEnded {
            combat: combat.id,
            winner,
            report: report.clone(),
        });
        self.emit_destructions(&report, combat.location, world, events, destroyed);

        let Some(stack) = self.stacks.iter_mut().find(|s| {
            s.villager_combat() == Some(combat.id)
                || s.pairings().iter().any(|p| p.combat == combat.id)
        }) else {
            return;
        };

        if stack.villager_combat() == Some(combat.id) {
            let attacker = report
                .attacker_armies
                .first()
                .and_then(|r| r.id.army());
            if let Some(attacker) = attacker {
                stack.complete_villager_combat(combat.id, attacker);
                let attacker_alive = report
                    .attacker_armies
                    .first()
                    .map(|r| !r.survivors.is_empty())
                    .unwrap_or(false);
                if winner == CombatWinner::Attacker {
                    stack.clear_villagers();
                }
                if attacker_alive {
                    deferred.push((stack.location, Requeue::Attacker(attacker)));
                } else {
                    stack.mark_defeated(attacker);
                }
            }
            return;
        }

        // Regular army pairing: identify it while still incomplete
        let Some((att, def)) = stack
            .pairings()
            .iter()
            .find(|p| p.combat == combat.id && !p.complete)
            .map(|p| (p.attacker, p.defender.army))
        else {
            // Already voided by a withdrawal; bookkeeping is done
            return;
        };

        let (winner_id, loser_id) = match winner {
            CombatWinner::Attacker => (Some(att), Some(def)),
            CombatWinner::Defender => (Some(def), Some(att)),
            CombatWinner::Draw => (None, None),
        };
        let Some(pairing) = stack.complete_pairing(combat.id, winner_id, loser_id) else {
            return;
        };

        let attacker_alive = report
            .attacker_armies
            .iter()
            .find(|r| r.id == CombatantId::Army(att))
            .map(|r| !r.survivors.is_empty())
            .unwrap_or(false);
        let defender_alive = report
            .defender_armies
            .iter()
            .find(|r| r.id == CombatantId::Army(def))
            .map(|r| !r.survivors.is_empty())
            .unwrap_or(false);

        if attacker_alive {
            deferred.push((stack.location, Requeue::Attacker(att)));
        } else {
            stack.mark_defeated(att);
        }
        if defender_alive {
            deferred.push((stack.location, Requeue::Defender(pairing.defender)));
        } else {
            stack.mark_defeated(def);
        }
    }

    /// Emit destruction events for every combatant wiped out in a report
    ///
    /// An army duplicated across several fronts can be wiped out more than
    /// once on paper; the per-tick set and the world check keep the event
    /// stream to one destruction per combatant.
    fn emit_destructions(
        &self,
        report: &CombatReport,
        location: HexCoord,
        world: &dyn WorldView,
        events: &mut Vec<CombatEvent>,
        destroyed: &mut AHashSet<CombatantId>,
    ) {
        for army_report in report
            .attacker_armies
            .iter()
            .chain(report.defender_armies.iter())
        {
            if !army_report.survivors.is_empty() || army_report.initial.is_empty() {
                continue;
            }
            if !destroyed.insert(army_report.id) {
                continue;
            }
            match army_report.id {
                CombatantId::Army(army) => {
                    if world.army(army).is_some() {
                        events.push(CombatEvent::ArmyDestroyed { army, location });
                    }
                }
                CombatantId::Villagers(group) => {
                    events.push(CombatEvent::VillagerGroupDestroyed { group, location })
                }
            }
        }
    }

    /// Next queued army still alive in the world, skipping the fallen
    fn next_live_attacker(
        stack: &mut StackCombat,
        world: &dyn WorldView,
    ) -> Option<(ArmyId, ArmySnapshot)> {
        while let Some(army) = stack.dequeue_next_attacker() {
            match world.army(army) {
                Some(snap) if !snap.composition.is_empty() => return Some((army, snap)),
                _ => stack.mark_defeated(army),
            }
        }
        None
    }

    fn next_live_defender(
        stack: &mut StackCombat,
        world: &dyn WorldView,
    ) -> Option<(StackEntry, ArmySnapshot)> {
        while let Some(entry) = stack.dequeue_next_defender() {
            match world.army(entry.army) {
                Some(snap) if !snap.composition.is_empty() => return Some((entry, snap)),
                _ => stack.mark_defeated(entry.army),
            }
        }
        None
    }

    /// Draw pairings for one stack: queue heads first, then surplus
    /// attackers against the thinnest engaged defender, then villagers.
    fn drain_stack(
        &mut self,
        idx: usize,
        now: SimSeconds,
        world: &dyn WorldView,
        events: &mut Vec<CombatEvent>,
    ) {
        let cap = self.config.max_active_pairings_per_stack;
        let terrain = world.terrain_at(self.stacks[idx].location);
        let tier_before = self.stacks[idx].current_tier();

        // Head-to-head pairings while both queues hold entries
        loop {
            let stack = &mut self.stacks[idx];
            if stack.active_pairings() >= cap || stack.defender_queue_len() == 0 {
                break;
            }
            let Some((attacker, attacker_snap)) = Self::next_live_attacker(stack, world) else {
                break;
            };
            let Some((entry, defender_snap)) = Self::next_live_defender(stack, world) else {
                // Nothing to face after all; restore queue order
                stack.requeue_attacker_front(attacker);
                break;
            };

            self.next_combat_id += 1;
            let id = CombatId(self.next_combat_id);
            let location = self.stacks[idx].location;
            let combat = ActiveCombat::new(
                id,
                &attacker_snap,
                &defender_snap,
                location,
                terrain,
                entry.entrenchment_bonus,
                now,
            );
            debug!(combat = id.0, ?attacker, defender = ?entry.army, "pairing formed");
            events.push(CombatEvent::CombatStarted {
                combat: id,
                location,
                attacker,
                defenders: vec![CombatantId::Army(entry.army)],
            });
            self.stacks[idx].record_pairing(attacker, entry, id);
            self.combats.push(combat);
        }

        if self.stacks[idx].current_tier() != tier_before {
            events.push(CombatEvent::TierAdvanced {
                location: self.stacks[idx].location,
                tier: self.stacks[idx].current_tier(),
            });
        }

        // Surplus attackers open extra fronts against engaged defenders
        loop {
            let stack = &mut self.stacks[idx];
            if stack.defender_queue_len() > 0
                || stack.only_villagers()
                || stack.active_pairings() >= cap
                || stack.attacker_queue_len() == 0
            {
                break;
            }
            // Engaged defender army carrying the fewest fronts, first come on ties
            let target = stack
                .pairings()
                .iter()
                .filter(|p| !p.complete)
                .map(|p| p.defender.clone())
                .min_by_key(|e| stack.fronts(e.army));
            let Some(entry) = target else {
                break;
            };
            let Some(defender_snap) = world.army(entry.army) else {
                break;
            };
            let Some((attacker, attacker_snap)) = Self::next_live_attacker(stack, world) else {
                break;
            };

            self.next_combat_id += 1;
            let id = CombatId(self.next_combat_id);
            let location = self.stacks[idx].location;
            let combat = ActiveCombat::new(
                id,
                &attacker_snap,
                &defender_snap,
                location,
                terrain,
                entry.entrenchment_bonus,
                now,
            );
            debug!(
                combat = id.0,
                ?attacker,
                defender = ?entry.army,
                "extra front opened"
            );
            events.push(CombatEvent::CombatStarted {
                combat: id,
                location,
                attacker,
                defenders: vec![CombatantId::Army(entry.army)],
            });
            self.stacks[idx].record_pairing(attacker, entry, id);
            self.combats.push(combat);
        }

        // Villager-only defense
        let stack = &mut self.stacks[idx];
        if stack.only_villagers()
            && !stack.villagers().is_empty()
            && stack.villager_combat().is_none()
            && stack.attacker_queue_len() > 0
        {
            if !stack.in_villager_phase() {
                stack.begin_villager_phase();
                events.push(CombatEvent::VillagerPhaseStarted {
                    location: stack.location,
                });
            }
            if let Some((attacker, attacker_snap)) = Self::next_live_attacker(stack, world) {
                let wanted = stack.villagers().to_vec();
                let groups: Vec<_> = world
                    .villager_groups_at(stack.location)
                    .into_iter()
                    .filter(|g| g.headcount > 0 && wanted.contains(&g.id))
                    .collect();
                if groups.is_empty() {
                    stack.clear_villagers();
                    stack.requeue_attacker_front(attacker);
                } else {
                    self.next_combat_id += 1;
                    let id = CombatId(self.next_combat_id);
                    let location = stack.location;
                    let defenders = groups
                        .iter()
                        .map(|g| CombatantId::Villagers(g.id))
                        .collect();
                    let combat = ActiveCombat::versus_villagers(
                        id,
                        &attacker_snap,
                        &groups,
                        location,
                        terrain,
                        now,
                    );
                    events.push(CombatEvent::CombatStarted {
                        combat: id,
                        location,
                        attacker,
                        defenders,
                    });
                    self.stacks[idx].record_villager_combat(attacker, id);
                    self.combats.push(combat);
                }
            }
        }

        // Nothing left to fight: release whoever is still queued
        let stack = &mut self.stacks[idx];
        if stack.only_villagers() && stack.villagers().is_empty() && stack.villager_combat().is_none()
        {
            while stack.dequeue_next_attacker().is_some() {}
        }
        if stack.attacker_queue_len() == 0 && stack.active_pairings() == 0 {
            while stack.dequeue_next_defender().is_some() {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimWorld;
    use crate::stats::{Composition, UnitType};
    use crate::terrain::Terrain;

    fn engine() -> CombatEngine {
        CombatEngine::new(CombatConfig::default(), StatsTable::default())
    }

    fn comp(pairs: &[(UnitType, u32)]) -> Composition {
        Composition::from_pairs(pairs)
    }

    /// Step the engine until idle, applying events back to the world
    fn run(engine: &mut CombatEngine, world: &mut SimWorld, max_ticks: u32) -> Vec<CombatEvent> {
        let mut all = Vec::new();
        let mut tick = 0u32;
        while !engine.is_idle() && tick < max_ticks {
            tick += 1;
            let events = engine.update(tick as f64 * 0.1, world);
            world.apply_events(&events);
            all.extend(events);
        }
        all
    }

    #[test]
    fn test_simple_combat_lifecycle() {
        let mut world = SimWorld::new(Terrain::Plains);
        let red = world.add_owner();
        let blue = world.add_owner();
        world.set_hostile(red, blue);

        let attacker = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 8)]), 0.0);
        let defender = world.add_army(blue, HexCoord::new(0, 0), comp(&[(UnitType::Archer, 3)]), 0.0);

        let mut engine = engine();
        engine.start_combat(&world, attacker, defender, 0.0).unwrap();
        let events = run(&mut engine, &mut world, 10_000);

        assert!(engine.is_idle());
        assert!(matches!(events.first(), Some(CombatEvent::CombatStarted { .. })));
        let phases = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::PhaseCompleted { .. }))
            .count();
        assert_eq!(phases, 3);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ArmyDestroyed { army, .. } if *army == defender)));
        // Loser removed from the world, winner still standing
        assert!(world.army(defender).is_none());
        assert!(world.army(attacker).is_some());
    }

    #[test]
    #[should_panic(expected = "already engaged")]
    fn test_duplicate_engagement_asserts_in_debug() {
        let mut world = SimWorld::new(Terrain::Plains);
        let red = world.add_owner();
        let blue = world.add_owner();
        world.set_hostile(red, blue);

        let attacker = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 5)]), 0.0);
        let defender = world.add_army(blue, HexCoord::new(0, 0), comp(&[(UnitType::Archer, 2)]), 0.0);
        let other = world.add_army(blue, HexCoord::new(0, 1), comp(&[(UnitType::Archer, 2)]), 0.0);

        let mut engine = engine();
        engine.start_combat(&world, attacker, defender, 0.0).unwrap();
        let _ = engine.start_combat(&world, attacker, other, 0.0);
    }

    #[test]
    fn test_withdraw_closes_the_pairing() {
        let mut world = SimWorld::new(Terrain::Plains);
        let red = world.add_owner();
        let blue = world.add_owner();
        world.set_hostile(red, blue);

        let attacker = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 5)]), 0.0);
        let defender = world.add_army(blue, HexCoord::new(0, 0), comp(&[(UnitType::Swordsman, 5)]), 0.0);

        let mut engine = engine();
        engine.start_combat(&world, attacker, defender, 0.0).unwrap();
        engine.update(0.1, &world);

        engine.withdraw_army(attacker, 0.2);
        let events = engine.update(0.3, &world);

        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ArmyRetreated { army } if *army == attacker)));
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::CombatEnded { .. })));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_start_attack_picks_simple_pairing() {
        let mut world = SimWorld::new(Terrain::Plains);
        let red = world.add_owner();
        let blue = world.add_owner();
        world.set_hostile(red, blue);

        let tile = HexCoord::new(0, 0);
        let attacker = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 5)]), 0.0);
        world.add_army(blue, tile, comp(&[(UnitType::Archer, 2)]), 0.0);

        let mut engine = engine();
        engine.start_attack(&world, &[attacker], tile, 0.0).unwrap();

        assert_eq!(engine.active_combats().len(), 1);
        assert!(engine.stack_combats().is_empty());
    }

    #[test]
    fn test_surplus_attacker_opens_second_front() {
        let mut world = SimWorld::new(Terrain::Plains);
        let red = world.add_owner();
        let blue = world.add_owner();
        world.set_hostile(red, blue);

        let tile = HexCoord::new(0, 0);
        let a1 = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 20)]), 0.0);
        let a2 = world.add_army(red, HexCoord::new(1, 0), comp(&[(UnitType::Swordsman, 20)]), 0.0);
        let defender = world.add_army(blue, tile, comp(&[(UnitType::Spearman, 30)]), 0.0);

        let mut engine = engine();
        engine.start_attack(&world, &[a1, a2], tile, 0.0).unwrap();
        engine.update(0.1, &world);

        let stack = &engine.stack_combats()[0];
        assert_eq!(stack.fronts(defender), 2);
        assert_eq!(stack.fronts(a1), 1);
        assert_eq!(stack.fronts(a2), 1);
        assert_eq!(engine.active_combats().len(), 2);

        let config = CombatConfig::default();
        let m = stack.stretching_multiplier(defender, &config);
        assert!((m - (1.0 - 2.0 * config.stretching_penalty_per_front)).abs() < 1e-9);
    }
}
