//! Core types, errors, and configuration shared across the engine

pub mod config;
pub mod error;
pub mod types;

pub use config::CombatConfig;
pub use error::{EngineError, Result};
pub use types::{ArmyId, CombatId, OwnerId, SimSeconds, VillagerGroupId};
