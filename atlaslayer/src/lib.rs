//! AtlasLayer - bounded multi-resolution boundary cache for a world map
//! viewer.
//!
//! Maintains decoded geographic boundary data at the right level of
//! detail for the current camera position while keeping memory usage
//! under a hard ceiling.
//!
//! # High-Level API
//!
//! ```ignore
//! use atlaslayer::cache::{BoundaryCache, CacheConfig};
//! use atlaslayer::coord::DetailLevel;
//! use atlaslayer::fetch::HttpFetcher;
//!
//! let fetcher = HttpFetcher::new("https://boundaries.example.net")?;
//! let cache = BoundaryCache::new(fetcher, CacheConfig::default());
//!
//! let usa = cache.load_region("USA", DetailLevel::Overview).await;
//! ```
//!
//! The render layer drives visibility through
//! [`viewport::VisibilityRunner`], which enumerates visible tiles for
//! each settled camera position, diffs them against its resident set and
//! loads what is missing through the shared cache.

pub mod cache;
pub mod coord;
pub mod decode;
pub mod feature;
pub mod fetch;
pub mod logging;
pub mod viewport;

/// Version of the atlaslayer library and CLI.
///
/// Synchronized across the workspace; defined in `Cargo.toml` and
/// injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
