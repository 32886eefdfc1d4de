//! The boundary cache service.
//!
//! Content-addressed storage of decoded boundary data with size-bounded
//! LRU eviction and in-flight load deduplication. Constructed once at
//! application start and passed by handle to the render layer and
//! diagnostic tooling; tests construct isolated instances.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use geojson::FeatureCollection;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::stats::{LoadStats, StatsSnapshot};
use super::store::EntryStore;
use super::types::{CacheConfig, CacheKey};
use crate::coord::{normalize_region_id, DetailLevel, TileKey};
use crate::decode::{
    decode_tile, filter_provinces, parse_region_document, DecodeError, ParseError,
};
use crate::feature::empty_collection;
use crate::fetch::{provinces_path, region_path, tile_path, FetchError, Fetcher};

/// Failure inside one load attempt.
///
/// Never escapes the cache: every variant is recorded in [`LoadStats`]
/// and replaced by an empty cached collection.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A load future shared by every caller waiting on the same key.
type SharedLoad = Shared<BoxFuture<'static, Arc<FeatureCollection>>>;

/// How a request resolves after checking the dedup map.
enum Resolution {
    /// Entry settled between the first check and registration
    Settled(Arc<FeatureCollection>),
    /// Await this (possibly just registered) shared load
    Pending(SharedLoad),
}

/// Bounded multi-resolution cache of decoded boundary data.
///
/// Load operations never fail from the caller's perspective: a fetch,
/// parse or decode failure is logged into the statistics and cached as
/// an empty collection, so the map always has something to draw and a
/// known-missing resource is not re-fetched every frame.
pub struct BoundaryCache<F> {
    fetcher: Arc<F>,
    store: Arc<EntryStore>,
    in_flight: Arc<Mutex<HashMap<CacheKey, SharedLoad>>>,
    stats: Arc<Mutex<LoadStats>>,
    config: CacheConfig,
}

impl<F: Fetcher + 'static> BoundaryCache<F> {
    /// Create a cache over the given fetcher.
    pub fn new(fetcher: F, config: CacheConfig) -> Self {
        let stats = Arc::new(Mutex::new(LoadStats::new()));
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(EntryStore::new(config.max_size_bytes, Arc::clone(&stats))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            stats,
            config,
        }
    }

    /// Load a whole-region boundary document.
    ///
    /// Returns the cached collection when resident, otherwise fetches,
    /// parses and caches it. Failures yield an empty collection; callers
    /// needing failure detail inspect [`BoundaryCache::stats`].
    pub async fn load_region(
        &self,
        region_id: &str,
        level: DetailLevel,
    ) -> Arc<FeatureCollection> {
        let id = normalize_region_id(region_id);
        let path = region_path(&id, level);
        let key = CacheKey::region(&id, level);
        let fetcher = Arc::clone(&self.fetcher);

        self.get_or_load(key, async move {
            let bytes = fetcher.fetch(&path).await?;
            let fetched = bytes.len();
            let collection = parse_region_document(&bytes)?;
            Ok((collection, fetched))
        })
        .await
    }

    /// Load the province subset for one country.
    ///
    /// Fetches the shared per-folder province document and keeps only
    /// features whose id carries one of the country's accepted prefixes.
    pub async fn load_provinces(
        &self,
        country: &str,
        folder: &str,
        level: DetailLevel,
    ) -> Arc<FeatureCollection> {
        let code = normalize_region_id(country);
        let path = provinces_path(folder, level);
        let key = CacheKey::provinces(&code, level);
        let fetcher = Arc::clone(&self.fetcher);
        let table = self.config.prefixes.clone();

        self.get_or_load(key, async move {
            let bytes = fetcher.fetch(&path).await?;
            let fetched = bytes.len();
            let collection = parse_region_document(&bytes)?;
            Ok((filter_provinces(collection, &code, &table), fetched))
        })
        .await
    }

    /// Load one binary tile.
    pub async fn load_tile(&self, tile: TileKey) -> Arc<FeatureCollection> {
        let path = tile_path(&tile);
        let key = CacheKey::tile(tile);
        let fetcher = Arc::clone(&self.fetcher);

        self.get_or_load(key, async move {
            let bytes = fetcher.fetch(&path).await?;
            let fetched = bytes.len();
            let collection = decode_tile(&bytes)?;
            Ok((collection, fetched))
        })
        .await
    }

    /// Load a region at a higher detail tier.
    ///
    /// Identical to [`BoundaryCache::load_region`]; exists so call sites
    /// can say what they mean when the user zooms in.
    pub async fn upgrade_detail(
        &self,
        region_id: &str,
        target: DetailLevel,
    ) -> Arc<FeatureCollection> {
        self.load_region(region_id, target).await
    }

    /// Whether a region document is resident at the given tier.
    pub fn is_cached(&self, region_id: &str, level: DetailLevel) -> bool {
        self.store
            .contains(&CacheKey::region(&normalize_region_id(region_id), level))
    }

    /// Region-scoped entries currently resident.
    pub fn cached_regions(&self) -> Vec<(String, DetailLevel)> {
        self.store.cached_regions()
    }

    /// Drop cached entries.
    ///
    /// With a region id, drops that region's whole-region and province
    /// entries. With `None`, drops everything and resets the statistics.
    pub fn clear(&self, region_id: Option<&str>) {
        match region_id {
            Some(id) => {
                let normalized = normalize_region_id(id);
                let removed = self.store.clear_region(&normalized);
                debug!(region = %normalized, removed, "Cleared region from cache");
            }
            None => {
                self.store.clear_all();
                *self.stats.lock().unwrap() = LoadStats::new();
                debug!("Cleared boundary cache");
            }
        }
    }

    /// Snapshot of cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        let stats = self.stats.lock().unwrap();
        StatsSnapshot::new(&stats, self.store.entry_count(), self.store.total_bytes())
    }

    /// Get-or-load with single-flight deduplication.
    ///
    /// At most one load runs per key; concurrent requesters for the same
    /// key await the same shared future. The registered future removes
    /// itself from the dedup map after inserting its result, so later
    /// requests hit the settled entry.
    async fn get_or_load(
        &self,
        key: CacheKey,
        load: impl Future<Output = Result<(FeatureCollection, usize), LoadError>> + Send + 'static,
    ) -> Arc<FeatureCollection> {
        self.stats.lock().unwrap().record_request();

        if let Some(hit) = self.store.get(&key) {
            self.stats.lock().unwrap().record_hit();
            trace!(key = %key, "Cache hit");
            return hit;
        }

        let resolution = {
            let mut in_flight = self.in_flight.lock().unwrap();
            if let Some(pending) = in_flight.get(&key) {
                trace!(key = %key, "Joining in-flight load");
                Resolution::Pending(pending.clone())
            } else if let Some(hit) = self.store.get(&key) {
                // Settled while we were waiting for the dedup lock.
                Resolution::Settled(hit)
            } else {
                let shared = self.spawn_load(key.clone(), load);
                in_flight.insert(key, shared.clone());
                Resolution::Pending(shared)
            }
        };

        match resolution {
            Resolution::Settled(data) => {
                self.stats.lock().unwrap().record_hit();
                data
            }
            Resolution::Pending(shared) => shared.await,
        }
    }

    /// Build the shared future that performs one load and settles it.
    fn spawn_load(
        &self,
        key: CacheKey,
        load: impl Future<Output = Result<(FeatureCollection, usize), LoadError>> + Send + 'static,
    ) -> SharedLoad {
        let store = Arc::clone(&self.store);
        let stats = Arc::clone(&self.stats);
        let in_flight = Arc::clone(&self.in_flight);

        async move {
            let started = Instant::now();
            let collection = match load.await {
                Ok((collection, bytes)) => {
                    let elapsed = started.elapsed();
                    stats
                        .lock()
                        .unwrap()
                        .record_load(bytes as u64, elapsed);
                    debug!(
                        key = %key,
                        bytes,
                        features = collection.features.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Loaded boundary data"
                    );
                    collection
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "Boundary load failed, caching empty result");
                    stats
                        .lock()
                        .unwrap()
                        .record_error(format!("{}: {}", key, err));
                    empty_collection()
                }
            };

            let data = Arc::new(collection);
            store.insert(key.clone(), Arc::clone(&data));
            in_flight.lock().unwrap().remove(&key);
            data
        }
        .boxed()
        .shared()
    }
}
