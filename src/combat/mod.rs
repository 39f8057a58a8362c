//! Single-pairing combat resolution
//!
//! An `ActiveCombat` resolves one attacker side against one defender side
//! through three phases, applying damage per tick via the target-priority
//! rules and the per-type accumulator ledgers.

pub mod active;
pub mod army;
pub mod phase;
pub mod side;
pub mod targeting;

pub use active::{ActiveCombat, ArmyReport, CombatReport, CombatSide, CombatWinner};
pub use army::{ArmyCombatState, CombatantId};
pub use phase::{CombatPhase, PhaseRecord};
pub use side::SideCombatState;
pub use targeting::{find_target, priority_order};
