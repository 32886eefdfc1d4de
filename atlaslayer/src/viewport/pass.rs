//! Debounced visibility pass runner.
//!
//! One active recomputation per viewport change: camera updates arrive
//! on a channel, rapid gestures are debounced to quiescence, and each
//! pass loads its visible tiles sequentially in distance order so a slow
//! far tile never starves a near one. A pass may be superseded mid-flight
//! by a newer one; it detects this through a monotonic version counter
//! and stops enqueuing further fetches without rolling back tiles already
//! committed.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geojson::FeatureCollection;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::enumerate::enumerate_viewport;
use super::lod::{LevelGate, LevelGateConfig};
use super::reconcile::reconcile;
use super::types::ViewportState;
use crate::cache::BoundaryCache;
use crate::coord::{DetailLevel, TileKey};
use crate::fetch::Fetcher;

/// Receives pass results on the render layer's behalf.
///
/// The render layer draws `tile_ready` data and removes visuals for
/// `evict_tile`; neither touches the cache, which keeps its own entries
/// independently of what is on screen.
pub trait RenderSink: Send + Sync {
    /// A visible tile's data is ready to draw.
    fn tile_ready(&self, key: TileKey, data: Arc<FeatureCollection>);

    /// A tile left the visible set; remove its visuals.
    fn evict_tile(&self, key: TileKey);
}

/// Visibility pass configuration.
#[derive(Debug, Clone)]
pub struct PassConfig {
    /// Quiescence window before a camera change triggers a pass
    /// (default: 300 ms)
    pub debounce: Duration,
    /// Edge length of the enumerated tile grid (default: 5)
    pub grid_radius: i32,
    /// Tier-switch debouncing policy
    pub gate: LevelGateConfig,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            grid_radius: 5,
            gate: LevelGateConfig::default(),
        }
    }
}

/// Pass statistics for monitoring.
#[derive(Debug, Default)]
pub struct PassStats {
    /// Passes launched
    pub passes: AtomicU64,
    /// Passes that stopped early because a newer pass started
    pub superseded: AtomicU64,
    /// Tiles fetched and delivered to the sink
    pub tiles_fetched: AtomicU64,
    /// Tiles evicted from the view
    pub tiles_evicted: AtomicU64,
}

impl PassStats {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> PassStatsSnapshot {
        PassStatsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            tiles_fetched: self.tiles_fetched.load(Ordering::Relaxed),
            tiles_evicted: self.tiles_evicted.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pass statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStatsSnapshot {
    pub passes: u64,
    pub superseded: u64,
    pub tiles_fetched: u64,
    pub tiles_evicted: u64,
}

/// Drives visibility recomputation for one viewport.
///
/// Owns the resident tile set and the level gate; all tile loading goes
/// through the shared [`BoundaryCache`].
pub struct VisibilityRunner<F: Fetcher + 'static> {
    cache: Arc<BoundaryCache<F>>,
    sink: Arc<dyn RenderSink>,
    config: PassConfig,
    gate: LevelGate,
    resident: Arc<Mutex<HashSet<TileKey>>>,
    versions: Arc<AtomicU64>,
    stats: Arc<PassStats>,
}

impl<F: Fetcher + 'static> VisibilityRunner<F> {
    /// Create a runner starting at the overview tier.
    pub fn new(cache: Arc<BoundaryCache<F>>, sink: Arc<dyn RenderSink>, config: PassConfig) -> Self {
        let gate = LevelGate::new(DetailLevel::Overview, config.gate.clone());
        Self {
            cache,
            sink,
            config,
            gate,
            resident: Arc::new(Mutex::new(HashSet::new())),
            versions: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(PassStats::default()),
        }
    }

    /// Access the statistics for monitoring.
    pub fn stats(&self) -> Arc<PassStats> {
        Arc::clone(&self.stats)
    }

    /// Run the loop, processing viewport updates from the channel.
    ///
    /// Runs until the channel closes or the cancellation token fires.
    /// Updates arriving faster than the debounce window coalesce into
    /// one pass over the latest state.
    pub async fn run(
        mut self,
        mut viewport_rx: mpsc::Receiver<ViewportState>,
        cancellation_token: CancellationToken,
    ) {
        info!(
            debounce_ms = self.config.debounce.as_millis() as u64,
            grid_radius = self.config.grid_radius,
            "Visibility runner started"
        );

        let mut pending: Option<ViewportState> = None;

        loop {
            tokio::select! {
                biased;

                _ = cancellation_token.cancelled() => {
                    info!("Visibility runner shutting down");
                    break;
                }

                maybe_state = viewport_rx.recv() => {
                    match maybe_state {
                        Some(state) => pending = Some(state),
                        None => break,
                    }
                }

                _ = tokio::time::sleep(self.config.debounce), if pending.is_some() => {
                    if let Some(state) = pending.take() {
                        self.launch_pass(state);
                    }
                }
            }
        }
    }

    /// Start one pass over a settled viewport state.
    ///
    /// Evictions apply immediately; fetches run on a spawned task so a
    /// newer pass can supersede them.
    fn launch_pass(&mut self, state: ViewportState) {
        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.passes.fetch_add(1, Ordering::Relaxed);

        // The tokio clock equals wall time in production and is the one
        // test harnesses can advance.
        let now = tokio::time::Instant::now().into_std();
        let level = self.gate.observe(state.zoom, now);
        let visible = enumerate_viewport(&state, self.config.grid_radius, level);
        let delta = {
            let resident = self.resident.lock().unwrap();
            reconcile(&resident, &visible)
        };

        debug!(
            version,
            level = %level,
            zoom = state.zoom,
            fetch = delta.to_fetch.len(),
            evict = delta.to_evict.len(),
            "Visibility pass computed"
        );

        {
            let mut resident = self.resident.lock().unwrap();
            for key in &delta.to_evict {
                resident.remove(key);
                self.sink.evict_tile(*key);
            }
        }
        self.stats
            .tiles_evicted
            .fetch_add(delta.to_evict.len() as u64, Ordering::Relaxed);

        tokio::spawn(run_pass(
            Arc::clone(&self.cache),
            Arc::clone(&self.sink),
            Arc::clone(&self.resident),
            Arc::clone(&self.versions),
            version,
            delta.to_fetch,
            Arc::clone(&self.stats),
        ));
    }
}

/// Fetch one pass's tiles sequentially, nearest first.
///
/// Checks the version counter before each fetch: once superseded, no new
/// fetch starts, but the tile currently in flight still completes and
/// stays committed.
async fn run_pass<F: Fetcher + 'static>(
    cache: Arc<BoundaryCache<F>>,
    sink: Arc<dyn RenderSink>,
    resident: Arc<Mutex<HashSet<TileKey>>>,
    versions: Arc<AtomicU64>,
    version: u64,
    to_fetch: Vec<TileKey>,
    stats: Arc<PassStats>,
) {
    for key in to_fetch {
        if versions.load(Ordering::SeqCst) != version {
            debug!(version, "Visibility pass superseded, stopping fetches");
            stats.superseded.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let data = cache.load_tile(key).await;
        resident.lock().unwrap().insert(key);
        sink.tile_ready(key, data);
        stats.tiles_fetched.fetch_add(1, Ordering::Relaxed);
    }
}
