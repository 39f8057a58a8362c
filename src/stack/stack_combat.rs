//! Per-tile multi-army orchestration state
//!
//! Owns the attacker and defender queues, the active pairings, and the
//! per-army front counts. Queue order is the authority for who engages next;
//! tier advancement is monotonic for the lifetime of the stack combat.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::CombatConfig;
use crate::core::types::{ArmyId, CombatId, VillagerGroupId};
use crate::hex::HexCoord;
use crate::stack::defensive::{DefenseTier, DefensiveStack, StackEntry};

/// One attacker-vs-defender-entry link, resolved by a single `ActiveCombat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    pub attacker: ArmyId,
    pub defender: StackEntry,
    pub combat: CombatId,
    pub complete: bool,
    pub winner: Option<ArmyId>,
    pub loser: Option<ArmyId>,
}

/// Orchestration state for one contested tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackCombat {
    pub location: HexCoord,

    attacker_queue: VecDeque<ArmyId>,
    defender_queue: VecDeque<StackEntry>,
    villagers: Vec<VillagerGroupId>,

    pairings: Vec<Pairing>,
    villager_combat: Option<CombatId>,

    defeated: AHashSet<ArmyId>,
    retreated: AHashSet<ArmyId>,
    fronts: AHashMap<ArmyId, u32>,

    current_tier: DefenseTier,
    villager_phase: bool,
}

impl StackCombat {
    pub fn new(location: HexCoord, attackers: Vec<ArmyId>, stack: DefensiveStack) -> Self {
        Self {
            location,
            attacker_queue: attackers.into(),
            defender_queue: stack.entries.into(),
            villagers: stack.villagers,
            pairings: Vec::new(),
            villager_combat: None,
            defeated: AHashSet::new(),
            retreated: AHashSet::new(),
            fronts: AHashMap::new(),
            current_tier: DefenseTier::Entrenched,
            villager_phase: false,
        }
    }

    pub fn current_tier(&self) -> DefenseTier {
        self.current_tier
    }

    pub fn villagers(&self) -> &[VillagerGroupId] {
        &self.villagers
    }

    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn villager_combat(&self) -> Option<CombatId> {
        self.villager_combat
    }

    pub fn defeated(&self) -> &AHashSet<ArmyId> {
        &self.defeated
    }

    pub fn retreated(&self) -> &AHashSet<ArmyId> {
        &self.retreated
    }

    pub fn attacker_queue_len(&self) -> usize {
        self.attacker_queue.len()
    }

    pub fn defender_queue_len(&self) -> usize {
        self.defender_queue.len()
    }

    /// Pop the next attacker; FIFO order is authoritative
    pub fn dequeue_next_attacker(&mut self) -> Option<ArmyId> {
        self.attacker_queue.pop_front()
    }

    /// Pop the next defender entry, advancing the tier monotonically
    pub fn dequeue_next_defender(&mut self) -> Option<StackEntry> {
        let entry = self.defender_queue.pop_front()?;
        if entry.tier > self.current_tier {
            self.current_tier = entry.tier;
        }
        Some(entry)
    }

    /// Re-queue a surviving attacker at the tail
    pub fn enqueue_attacker(&mut self, army: ArmyId) {
        self.attacker_queue.push_back(army);
    }

    /// Put an attacker back at the head, preserving queue order
    ///
    /// Used when an attacker was popped but no engagement materialized.
    pub fn requeue_attacker_front(&mut self, army: ArmyId) {
        self.attacker_queue.push_front(army);
    }

    /// Re-queue a surviving defender entry at the tail
    pub fn enqueue_defender(&mut self, entry: StackEntry) {
        self.defender_queue.push_back(entry);
    }

    pub fn add_front(&mut self, army: ArmyId) {
        *self.fronts.entry(army).or_insert(0) += 1;
    }

    pub fn remove_front(&mut self, army: ArmyId) {
        match self.fronts.get_mut(&army) {
            Some(n) if *n > 1 => *n -= 1,
            Some(_) => {
                self.fronts.remove(&army);
            }
            None => warn!(?army, "front removal for untracked army"),
        }
    }

    pub fn fronts(&self, army: ArmyId) -> u32 {
        self.fronts.get(&army).copied().unwrap_or(0)
    }

    /// Armies currently carrying at least one front
    pub fn armies_with_fronts(&self) -> impl Iterator<Item = (ArmyId, u32)> + '_ {
        self.fronts.iter().map(|(a, n)| (*a, *n))
    }

    /// Damage-output multiplier for an army spread across `fronts` pairings
    ///
    /// `max(floor, 1 - penalty * fronts)`; exactly 1.0 at zero fronts.
    pub fn stretching_multiplier(&self, army: ArmyId, config: &CombatConfig) -> f64 {
        let fronts = self.fronts(army) as f64;
        (1.0 - config.stretching_penalty_per_front * fronts).max(config.stretching_floor)
    }

    /// The army-tier defender queue (tiers 1-2) is empty
    pub fn all_army_defenders_engaged(&self) -> bool {
        self.defender_queue.is_empty()
    }

    /// No army defender left anywhere: queue drained and every army pairing
    /// resolved. Villager-only defense may begin.
    pub fn only_villagers(&self) -> bool {
        self.defender_queue.is_empty() && self.pairings.iter().all(|p| p.complete)
    }

    /// Has the villager phase been entered?
    pub fn in_villager_phase(&self) -> bool {
        self.villager_phase
    }

    pub fn begin_villager_phase(&mut self) {
        self.villager_phase = true;
    }

    /// Count of unresolved pairings (the villager pairing included)
    pub fn active_pairings(&self) -> usize {
        let armies = self.pairings.iter().filter(|p| !p.complete).count();
        armies + usize::from(self.villager_combat.is_some())
    }

    /// Idempotent membership check, used to avoid double-processing
    pub fn involves_army(&self, army: ArmyId) -> bool {
        self.attacker_queue.contains(&army)
            || self.defender_queue.iter().any(|e| e.army == army)
            || self
                .pairings
                .iter()
                .any(|p| !p.complete && (p.attacker == army || p.defender.army == army))
            || self.fronts.contains_key(&army)
    }

    /// Record a freshly created pairing
    pub fn record_pairing(&mut self, attacker: ArmyId, defender: StackEntry, combat: CombatId) {
        self.add_front(attacker);
        self.add_front(defender.army);
        self.pairings.push(Pairing {
            attacker,
            defender,
            combat,
            complete: false,
            winner: None,
            loser: None,
        });
    }

    /// Record the villager pairing
    pub fn record_villager_combat(&mut self, attacker: ArmyId, combat: CombatId) {
        self.add_front(attacker);
        self.villager_combat = Some(combat);
    }

    /// Mark a pairing resolved and return it for bookkeeping
    ///
    /// Fronts for both participants are released here; re-queueing survivors
    /// is the engine's call, made from the combat report.
    pub fn complete_pairing(
        &mut self,
        combat: CombatId,
        winner: Option<ArmyId>,
        loser: Option<ArmyId>,
    ) -> Option<Pairing> {
        let pairing = self
            .pairings
            .iter_mut()
            .find(|p| p.combat == combat && !p.complete)?;
        pairing.complete = true;
        pairing.winner = winner;
        pairing.loser = loser;
        let snapshot = pairing.clone();
        self.remove_front(snapshot.attacker);
        self.remove_front(snapshot.defender.army);
        Some(snapshot)
    }

    /// Resolve the villager pairing; fronts of the attacker are released
    pub fn complete_villager_combat(&mut self, combat: CombatId, attacker: ArmyId) -> bool {
        if self.villager_combat != Some(combat) {
            return false;
        }
        self.villager_combat = None;
        self.remove_front(attacker);
        true
    }

    pub fn mark_defeated(&mut self, army: ArmyId) {
        self.defeated.insert(army);
    }

    /// All villager groups are gone; nothing left to defend with
    pub fn clear_villagers(&mut self) {
        self.villagers.clear();
    }

    /// Purge an army from every queue, pairing, and the front table
    ///
    /// Any unresolved pairing it was fighting completes immediately with the
    /// opposing army as winner. Returns the combat ids of those pairings so
    /// the engine can terminate the attached combats.
    pub fn remove_army(&mut self, army: ArmyId, as_retreat: bool) -> Vec<CombatId> {
        self.attacker_queue.retain(|a| *a != army);
        self.defender_queue.retain(|e| e.army != army);

        let mut ended = Vec::new();
        for pairing in self.pairings.iter_mut().filter(|p| !p.complete) {
            if pairing.attacker == army || pairing.defender.army == army {
                pairing.complete = true;
                let opponent = if pairing.attacker == army {
                    pairing.defender.army
                } else {
                    pairing.attacker
                };
                pairing.winner = Some(opponent);
                pairing.loser = Some(army);
                ended.push(pairing.combat);
                // Release the opponent's front for the voided pairing
                self.fronts
                    .entry(opponent)
                    .and_modify(|n| *n = n.saturating_sub(1));
            }
        }
        self.fronts.retain(|_, n| *n > 0);
        self.fronts.remove(&army);

        if as_retreat {
            self.retreated.insert(army);
        } else {
            self.defeated.insert(army);
        }
        ended
    }

    /// Both queues empty, no unresolved pairing, no villager fight pending
    ///
    /// Villager groups left standing with no attacker to press them do not
    /// keep the stack alive.
    pub fn is_complete(&self) -> bool {
        self.attacker_queue.is_empty()
            && self.defender_queue.is_empty()
            && self.pairings.iter().all(|p| p.complete)
            && self.villager_combat.is_none()
    }
}
