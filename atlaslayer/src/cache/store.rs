//! Entry map with size accounting and LRU eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use geojson::FeatureCollection;
use tracing::{debug, info};

use super::stats::LoadStats;
use super::types::CacheKey;
use crate::coord::DetailLevel;
use crate::feature::estimate_size;

/// One settled cache entry.
///
/// Immutable once inserted; a re-load replaces the entry wholesale, so
/// readers either miss or see a fully populated entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<FeatureCollection>,
    size_bytes: usize,
    last_accessed: Instant,
}

/// Entry storage shared by the cache service.
///
/// Holds settled entries only; in-flight loads live in the service's
/// dedup map. All mutation goes through these methods, which keep the
/// size total consistent with the map under one lock order.
pub(crate) struct EntryStore {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    total_bytes: Mutex<usize>,
    max_size_bytes: usize,
    stats: Arc<Mutex<LoadStats>>,
}

impl EntryStore {
    pub(crate) fn new(max_size_bytes: usize, stats: Arc<Mutex<LoadStats>>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            total_bytes: Mutex::new(0),
            max_size_bytes,
            stats,
        }
    }

    /// Get a settled entry, bumping its access time.
    pub(crate) fn get(&self, key: &CacheKey) -> Option<Arc<FeatureCollection>> {
        let mut entries = self.entries.lock().unwrap();
        entries.get_mut(key).map(|entry| {
            entry.last_accessed = Instant::now();
            Arc::clone(&entry.data)
        })
    }

    /// Insert (or replace) an entry, then evict oldest-first until the
    /// total is back under the ceiling.
    ///
    /// Eviction runs synchronously before this returns, so the size
    /// invariant holds whenever the cache is observable as settled.
    pub(crate) fn insert(&self, key: CacheKey, data: Arc<FeatureCollection>) {
        let size_bytes = estimate_size(&data);
        let mut entries = self.entries.lock().unwrap();
        let mut total = self.total_bytes.lock().unwrap();

        if let Some(replaced) = entries.insert(
            key,
            CacheEntry {
                data,
                size_bytes,
                last_accessed: Instant::now(),
            },
        ) {
            *total = total.saturating_sub(replaced.size_bytes);
        }
        *total += size_bytes;

        self.evict_over_limit(&mut entries, &mut total);
    }

    fn evict_over_limit(
        &self,
        entries: &mut HashMap<CacheKey, CacheEntry>,
        total: &mut usize,
    ) {
        if *total <= self.max_size_bytes {
            return;
        }

        let mut by_age: Vec<(CacheKey, Instant, usize)> = entries
            .iter()
            .map(|(k, v)| (k.clone(), v.last_accessed, v.size_bytes))
            .collect();
        by_age.sort_by_key(|(_, accessed, _)| *accessed);

        let mut evicted = 0u64;
        for (key, _, size) in by_age {
            if *total <= self.max_size_bytes {
                break;
            }
            entries.remove(&key);
            *total = total.saturating_sub(size);
            evicted += 1;
            debug!(key = %key, size, "Evicted boundary cache entry");
        }

        if evicted > 0 {
            self.stats.lock().unwrap().record_eviction(evicted);
            info!(
                evicted,
                total_bytes = *total,
                "Cache eviction brought size under limit"
            );
        }
    }

    pub(crate) fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub(crate) fn total_bytes(&self) -> usize {
        *self.total_bytes.lock().unwrap()
    }

    /// Region-scoped entries currently resident: whole-region documents
    /// and province subsets, with their levels.
    pub(crate) fn cached_regions(&self) -> Vec<(String, DetailLevel)> {
        let entries = self.entries.lock().unwrap();
        let mut regions: Vec<(String, DetailLevel)> = entries
            .keys()
            .filter_map(|key| {
                key.region_id()
                    .map(|id| (id.to_string(), key.level()))
            })
            .collect();
        regions.sort();
        regions
    }

    /// Drop every entry.
    pub(crate) fn clear_all(&self) {
        let mut entries = self.entries.lock().unwrap();
        let mut total = self.total_bytes.lock().unwrap();
        entries.clear();
        *total = 0;
    }

    /// Drop entries belonging to one region id (whole-region and
    /// province-family keys alike). Returns how many were removed.
    pub(crate) fn clear_region(&self, region_id: &str) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let mut total = self.total_bytes.lock().unwrap();

        let doomed: Vec<CacheKey> = entries
            .keys()
            .filter(|key| key.region_id() == Some(region_id))
            .cloned()
            .collect();
        for key in &doomed {
            if let Some(entry) = entries.remove(key) {
                *total = total.saturating_sub(entry.size_bytes);
            }
        }
        doomed.len()
    }
}
