//! Multi-army combat over one contested tile
//!
//! `DefensiveStack` classifies eligible defenders into ordered tiers;
//! `StackCombat` drains attacker and defender queues into pairings and tracks
//! per-army fronts for the stretching penalty.

pub mod defensive;
pub mod stack_combat;

pub use defensive::{DefenseTier, DefensiveStack, StackEntry};
pub use stack_combat::{Pairing, StackCombat};
