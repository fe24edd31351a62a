//! Density checks over one scope's order values.

use crate::ordering::scope::{OrderedEntity, Scope};
use std::collections::BTreeMap;

/// Result of checking that a scope's orders are exactly `0..N-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityReport {
    pub scope: Scope,
    /// Number of siblings in the scope.
    pub count: u32,
    /// Slots in `0..count` that no sibling occupies.
    pub gaps: Vec<u32>,
    /// Order values held by more than one sibling.
    pub duplicates: Vec<u32>,
}

impl DensityReport {
    pub fn is_dense(&self) -> bool {
        self.gaps.is_empty() && self.duplicates.is_empty()
    }
}

/// Checks the density invariant for one scope snapshot.
///
/// A value at or above `count` always leaves some slot empty, so it shows up
/// as a gap.
pub fn check_density(scope: Scope, entities: &[OrderedEntity]) -> DensityReport {
    let count = entities.len() as u32;
    let mut occupancy = BTreeMap::<u32, u32>::new();
    for entity in entities {
        *occupancy.entry(entity.order).or_default() += 1;
    }

    let gaps = (0..count)
        .filter(|slot| !occupancy.contains_key(slot))
        .collect();
    let duplicates = occupancy
        .iter()
        .filter(|(_, holders)| **holders > 1)
        .map(|(order, _)| *order)
        .collect();

    DensityReport {
        scope,
        count,
        gaps,
        duplicates,
    }
}
