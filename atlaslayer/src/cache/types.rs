//! Cache key and configuration types.

use std::fmt;

use crate::coord::{normalize_region_id, DetailLevel, RegionKey, TileKey};
use crate::decode::PrefixTable;

/// Hard ceiling on resident decoded boundary data: 50 MiB.
pub const MAX_CACHE_SIZE: usize = 50 * 1024 * 1024;

/// Identity of one cache entry.
///
/// Whole-region documents, province subsets and binary tiles live in the
/// same map; the enum keeps their identities disjoint so a tile can never
/// shadow a region document at the same coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Whole-region boundary document
    Region(RegionKey),
    /// Province subset filtered down to one country
    Provinces { region: String, level: DetailLevel },
    /// One binary tile cell
    Tile(TileKey),
}

impl CacheKey {
    /// Key for a whole-region document.
    pub fn region(id: &str, level: DetailLevel) -> Self {
        CacheKey::Region(RegionKey::new(id, level))
    }

    /// Key for a country's province subset.
    pub fn provinces(country: &str, level: DetailLevel) -> Self {
        CacheKey::Provinces {
            region: normalize_region_id(country),
            level,
        }
    }

    /// Key for one tile.
    pub fn tile(key: TileKey) -> Self {
        CacheKey::Tile(key)
    }

    /// The region id this entry belongs to, if it is region-scoped.
    ///
    /// Used by targeted cache clears: both the whole-region entry and the
    /// province-family entries sharing the id match.
    pub fn region_id(&self) -> Option<&str> {
        match self {
            CacheKey::Region(region) => Some(&region.id),
            CacheKey::Provinces { region, .. } => Some(region),
            CacheKey::Tile(_) => None,
        }
    }

    /// The entry's detail level.
    pub fn level(&self) -> DetailLevel {
        match self {
            CacheKey::Region(region) => region.level,
            CacheKey::Provinces { level, .. } => *level,
            CacheKey::Tile(tile) => tile.level,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Region(region) => write!(f, "{}", region),
            CacheKey::Provinces { region, level } => {
                write!(f, "provinces_{}_{}", region, level)
            }
            CacheKey::Tile(tile) => write!(f, "{}", tile),
        }
    }
}

/// Boundary cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum resident size in bytes (default: 50 MiB)
    pub max_size_bytes: usize,
    /// Accepted province id prefixes per country
    pub prefixes: PrefixTable,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_CACHE_SIZE,
            prefixes: PrefixTable::default(),
        }
    }
}

impl CacheConfig {
    /// Set the resident size ceiling in bytes.
    pub fn with_max_size(mut self, bytes: usize) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// Replace the province prefix table.
    pub fn with_prefix_table(mut self, table: PrefixTable) -> Self {
        self.prefixes = table;
        self
    }
}
