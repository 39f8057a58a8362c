//! Category matchup rules: who shoots at whom
//!
//! Pure functions over the closed category set. The priority tables are
//! fixed; stance only matters for cavalry.

use crate::stats::{CavalryStance, Composition, UnitCategory, UnitType};

/// Ordered target preference for an attacking category
///
/// Reserve-stance cavalry is excluded from attacking entirely until the
/// cleanup phase; that policy belongs to the combat resolution loop, not to
/// this table.
pub fn priority_order(attacker: UnitCategory, stance: CavalryStance) -> [UnitCategory; 4] {
    use UnitCategory::*;
    match attacker {
        Ranged => [Siege, Cavalry, Infantry, Ranged],
        Siege => [Siege, Ranged, Infantry, Cavalry],
        Infantry => [Infantry, Cavalry, Ranged, Siege],
        Cavalry => match stance {
            CavalryStance::Flank => [Ranged, Siege, Infantry, Cavalry],
            CavalryStance::Frontline | CavalryStance::Reserve => [Infantry, Cavalry, Ranged, Siege],
        },
    }
}

/// First category in the attacker's preference list the defender still fields
pub fn find_target(
    attacker: UnitCategory,
    stance: CavalryStance,
    defender: &Composition,
) -> Option<UnitCategory> {
    priority_order(attacker, stance)
        .into_iter()
        .find(|c| defender.category_total(*c) > 0)
}

/// Concrete unit type absorbing the attack: the most numerous type of the
/// chosen category, ties broken by canonical type order
pub fn target_type(category: UnitCategory, defender: &Composition) -> Option<UnitType> {
    let mut best: Option<(UnitType, u32)> = None;
    for ty in UnitType::ALL {
        if ty.category() != category {
            continue;
        }
        let count = defender.get(ty);
        if count > 0 && best.map_or(true, |(_, n)| count > n) {
            best = Some((ty, count));
        }
    }
    best.map(|(ty, _)| ty)
}
