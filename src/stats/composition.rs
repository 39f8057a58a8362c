//! Army composition: unit counts keyed by the closed unit-type enumeration
//!
//! A fixed-size array rather than an open dictionary, so the key set is
//! bounded and exhaustively iterable.

use serde::{Deserialize, Serialize};

use crate::stats::unit_type::{UnitCategory, UnitType};

/// Per-type unit counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Composition {
    counts: [u32; UnitType::COUNT],
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (type, count) pairs; repeated types accumulate
    pub fn from_pairs(pairs: &[(UnitType, u32)]) -> Self {
        let mut comp = Self::new();
        for &(ty, n) in pairs {
            comp.add(ty, n);
        }
        comp
    }

    pub fn get(&self, ty: UnitType) -> u32 {
        self.counts[ty.index()]
    }

    pub fn set(&mut self, ty: UnitType, count: u32) {
        self.counts[ty.index()] = count;
    }

    pub fn add(&mut self, ty: UnitType, count: u32) {
        self.counts[ty.index()] += count;
    }

    /// Remove up to `count` units of a type; returns how many were removed
    pub fn remove(&mut self, ty: UnitType, count: u32) -> u32 {
        let have = self.counts[ty.index()];
        let removed = have.min(count);
        self.counts[ty.index()] = have - removed;
        removed
    }

    /// Total units across all types
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Total units belonging to one category
    pub fn category_total(&self, category: UnitCategory) -> u32 {
        UnitType::ALL
            .iter()
            .filter(|t| t.category() == category)
            .map(|t| self.get(*t))
            .sum()
    }

    /// Total melee-capable units (infantry + cavalry)
    pub fn melee_capable_total(&self) -> u32 {
        self.category_total(UnitCategory::Infantry) + self.category_total(UnitCategory::Cavalry)
    }

    /// Iterate (type, count) over types with a nonzero count, in index order
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (UnitType, u32)> + '_ {
        UnitType::ALL
            .iter()
            .filter_map(|t| match self.get(*t) {
                0 => None,
                n => Some((*t, n)),
            })
    }

    /// Add every count from another composition
    pub fn merge(&mut self, other: &Composition) {
        for (ty, n) in other.iter_nonzero() {
            self.add(ty, n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_accumulates() {
        let comp = Composition::from_pairs(&[
            (UnitType::Swordsman, 3),
            (UnitType::Swordsman, 2),
            (UnitType::Archer, 4),
        ]);
        assert_eq!(comp.get(UnitType::Swordsman), 5);
        assert_eq!(comp.get(UnitType::Archer), 4);
        assert_eq!(comp.total(), 9);
    }

    #[test]
    fn test_remove_caps_at_current_count() {
        let mut comp = Composition::from_pairs(&[(UnitType::Archer, 2)]);
        assert_eq!(comp.remove(UnitType::Archer, 5), 2);
        assert_eq!(comp.get(UnitType::Archer), 0);
    }

    #[test]
    fn test_category_totals() {
        let comp = Composition::from_pairs(&[
            (UnitType::Swordsman, 5),
            (UnitType::Lancer, 3),
            (UnitType::Archer, 2),
            (UnitType::Catapult, 1),
        ]);
        assert_eq!(comp.category_total(UnitCategory::Infantry), 5);
        assert_eq!(comp.category_total(UnitCategory::Cavalry), 3);
        assert_eq!(comp.melee_capable_total(), 8);
    }

    #[test]
    fn test_iter_nonzero_skips_zeroes() {
        let comp = Composition::from_pairs(&[(UnitType::Ballista, 1)]);
        let entries: Vec<_> = comp.iter_nonzero().collect();
        assert_eq!(entries, vec![(UnitType::Ballista, 1)]);
    }

    #[test]
    fn test_merge() {
        let mut a = Composition::from_pairs(&[(UnitType::Swordsman, 2)]);
        let b = Composition::from_pairs(&[(UnitType::Swordsman, 1), (UnitType::Archer, 3)]);
        a.merge(&b);
        assert_eq!(a.get(UnitType::Swordsman), 3);
        assert_eq!(a.get(UnitType::Archer), 3);
    }
}
