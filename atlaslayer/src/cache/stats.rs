//! Load statistics tracking and reporting.

use std::time::{Duration, Instant};

/// Process-wide load statistics.
///
/// Monotonic counters incremented on every load attempt, success or
/// failure. Reset only by an explicit full cache clear.
#[derive(Debug, Clone)]
pub struct LoadStats {
    /// Total cache requests (hits plus misses)
    pub requests: u64,
    /// Requests answered from a settled entry
    pub hits: u64,
    /// Successfully loaded source files
    pub files_loaded: u64,
    /// Raw bytes fetched from sources
    pub bytes_loaded: u64,
    /// Cumulative time spent in fetch plus decode
    pub load_time: Duration,
    /// Entries evicted to stay under the size ceiling
    pub evictions: u64,
    /// Messages from failed loads, oldest first
    pub errors: Vec<String>,
    /// When tracking started
    pub created_at: Instant,
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadStats {
    /// Create a fresh statistics tracker.
    pub fn new() -> Self {
        Self {
            requests: 0,
            hits: 0,
            files_loaded: 0,
            bytes_loaded: 0,
            load_time: Duration::ZERO,
            evictions: 0,
            errors: Vec::new(),
            created_at: Instant::now(),
        }
    }

    /// Requests that did not hit a settled entry.
    pub fn misses(&self) -> u64 {
        self.requests.saturating_sub(self.hits)
    }

    /// Hit ratio in `[0.0, 1.0]`; zero when nothing was requested.
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }

    /// Mean load duration in milliseconds over successful loads.
    pub fn avg_load_time_ms(&self) -> f64 {
        if self.files_loaded == 0 {
            0.0
        } else {
            self.load_time.as_secs_f64() * 1000.0 / self.files_loaded as f64
        }
    }

    /// Record one cache request.
    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    /// Record a request answered from a settled entry.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Record a successful source load.
    pub fn record_load(&mut self, bytes: u64, elapsed: Duration) {
        self.files_loaded += 1;
        self.bytes_loaded += bytes;
        self.load_time += elapsed;
    }

    /// Record a failed load.
    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    /// Record evicted entries.
    pub fn record_eviction(&mut self, count: u64) {
        self.evictions += count;
    }
}

/// Read-only snapshot combining load statistics with the current entry
/// map state, for diagnostic tooling.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Live entries in the cache
    pub entry_count: usize,
    /// Sum of entry size estimates in bytes
    pub total_bytes: usize,
    /// Total requests seen
    pub total_requests: u64,
    /// Hit ratio in `[0.0, 1.0]`
    pub hit_ratio: f64,
    /// Entries evicted so far
    pub evicted_count: u64,
    /// Successfully loaded files
    pub files_loaded: u64,
    /// Raw bytes fetched
    pub bytes_loaded: u64,
    /// Mean load duration in milliseconds
    pub avg_load_time_ms: f64,
    /// Failed-load messages, oldest first
    pub errors: Vec<String>,
}

impl StatsSnapshot {
    /// Build a snapshot from the counters and entry map state.
    pub fn new(stats: &LoadStats, entry_count: usize, total_bytes: usize) -> Self {
        Self {
            entry_count,
            total_bytes,
            total_requests: stats.requests,
            hit_ratio: stats.hit_ratio(),
            evicted_count: stats.evictions,
            files_loaded: stats.files_loaded,
            bytes_loaded: stats.bytes_loaded,
            avg_load_time_ms: stats.avg_load_time_ms(),
            errors: stats.errors.clone(),
        }
    }

    /// Format the snapshot as a human-readable block.
    pub fn format(&self) -> String {
        format!(
            r#"Boundary Cache Statistics

ENTRIES
  Count:       {}
  Size:        {:.2} MB

REQUESTS
  Total:       {}
  Hit Rate:    {:.1}%
  Evictions:   {}

LOADS
  Files:       {}
  Bytes:       {:.2} MB
  Avg Time:    {:.1} ms
  Errors:      {}
"#,
            self.entry_count,
            self.total_bytes as f64 / (1024.0 * 1024.0),
            self.total_requests,
            self.hit_ratio * 100.0,
            self.evicted_count,
            self.files_loaded,
            self.bytes_loaded as f64 / (1024.0 * 1024.0),
            self.avg_load_time_ms,
            self.errors.len(),
        )
    }
}
