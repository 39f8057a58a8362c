//! Unit statistics: types, categories, combat stats table, compositions

pub mod composition;
pub mod table;
pub mod unit_type;

pub use composition::Composition;
pub use table::{AggregatedStats, CategoryBonuses, StatsTable, UnitCombatStats};
pub use unit_type::{CavalryStance, UnitCategory, UnitType};
