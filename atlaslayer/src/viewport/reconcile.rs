//! Resident-set reconciliation.

use std::collections::HashSet;

use crate::coord::TileKey;

/// Result of diffing the resident tile set against the visible set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDelta {
    /// Visible but not resident, in the enumerator's distance order
    pub to_fetch: Vec<TileKey>,
    /// Resident but no longer visible; the render layer removes these
    /// visuals (distinct from cache eviction)
    pub to_evict: Vec<TileKey>,
}

/// Diff the previous resident set against the newly enumerated visible
/// list.
///
/// Pure identity math: no I/O and no cache coupling. `to_fetch`
/// preserves the visible list's order (and drops duplicate keys the
/// enumerator can produce near the world edge); `to_evict` is sorted for
/// determinism.
pub fn reconcile(resident: &HashSet<TileKey>, visible: &[TileKey]) -> ViewDelta {
    let mut seen: HashSet<TileKey> = HashSet::with_capacity(visible.len());
    let mut to_fetch = Vec::new();
    for key in visible {
        if seen.insert(*key) && !resident.contains(key) {
            to_fetch.push(*key);
        }
    }

    let mut to_evict: Vec<TileKey> = resident
        .iter()
        .filter(|key| !seen.contains(key))
        .copied()
        .collect();
    to_evict.sort_by_key(|key| (key.level, key.y, key.x));

    ViewDelta { to_fetch, to_evict }
}
