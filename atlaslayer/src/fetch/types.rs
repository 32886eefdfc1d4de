//! Fetcher trait and error types.

use std::future::Future;
use thiserror::Error;

/// Errors raised fetching raw boundary payloads.
///
/// These never reach UI-facing callers: the cache boundary records them
/// in the load statistics and caches an empty collection instead.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level HTTP failure (connect, timeout, TLS)
    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    /// Server answered with a non-success status
    #[error("unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Local file does not exist
    #[error("boundary file not found: {path}")]
    NotFound { path: String },

    /// Other filesystem failure
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    /// Fetcher could not be constructed
    #[error("fetcher configuration error: {0}")]
    Config(String),
}

/// Source of raw boundary bytes.
///
/// Implementations resolve a layout-relative path (for example
/// `boundaries/overview/USA.json`) against their own base — an HTTP
/// origin or a local data directory. Mock fetchers in tests implement
/// this trait to script responses without any I/O.
pub trait Fetcher: Send + Sync {
    /// Fetch the raw bytes behind a layout-relative path.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}
