//! Coordinate and key type definitions

use std::fmt;
use std::str::FromStr;

/// Valid longitude range for tile origins (last 10° tile starts at 170).
pub const MIN_LON: i32 = -180;
pub const MAX_LON: i32 = 170;

/// Valid latitude range for tile origins (last 10° tile starts at 80).
pub const MIN_LAT: i32 = -90;
pub const MAX_LAT: i32 = 80;

/// Boundary detail tier, ordered coarse to fine.
///
/// Each tier corresponds to a separate source file set produced by the
/// offline pipeline. The total order matters: "upgrade" always means
/// moving to a strictly greater tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailLevel {
    /// Coarse boundaries for the fully zoomed-out view
    Overview,
    /// Mid-resolution boundaries
    Detailed,
    /// Full-resolution boundaries
    Ultra,
}

impl DetailLevel {
    /// The wire name used in keys, URLs and tile file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Overview => "overview",
            DetailLevel::Detailed => "detailed",
            DetailLevel::Ultra => "ultra",
        }
    }

    /// All tiers, coarse to fine.
    pub fn all() -> [DetailLevel; 3] {
        [
            DetailLevel::Overview,
            DetailLevel::Detailed,
            DetailLevel::Ultra,
        ]
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(DetailLevel::Overview),
            "detailed" => Ok(DetailLevel::Detailed),
            "ultra" => Ok(DetailLevel::Ultra),
            other => Err(KeyError::InvalidLevel(other.to_string())),
        }
    }
}

/// Identity of one tile: detail tier plus the quantized world-degree
/// origin of the cell.
///
/// Equality over all three fields is the cache identity; the same cell at
/// two tiers is two distinct entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Detail tier this tile belongs to
    pub level: DetailLevel,
    /// Longitude of the tile origin in whole degrees
    pub x: i32,
    /// Latitude of the tile origin in whole degrees
    pub y: i32,
}

impl TileKey {
    /// Create a new tile key.
    pub fn new(level: DetailLevel, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }

    /// Parse a textual tile key of the form `{level}_{y}_{x}`.
    ///
    /// Latitude comes before longitude in the textual form; this matches
    /// the coordinate file naming convention of the offline pipeline and
    /// must not be reordered.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] naming the invalid component. A malformed
    /// key is a programmer error in the caller, so this error propagates
    /// rather than being swallowed.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        let parts: Vec<&str> = key.split('_').collect();
        if parts.len() != 3 {
            return Err(KeyError::WrongComponentCount {
                key: key.to_string(),
                found: parts.len(),
            });
        }

        let level = parts[0].parse::<DetailLevel>()?;
        let y = parts[1]
            .parse::<i32>()
            .map_err(|_| KeyError::InvalidLatitude(parts[1].to_string()))?;
        let x = parts[2]
            .parse::<i32>()
            .map_err(|_| KeyError::InvalidLongitude(parts[2].to_string()))?;

        Ok(Self { level, x, y })
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.level, self.y, self.x)
    }
}

/// Identity of a whole-region boundary document.
///
/// The region id is case-normalized on construction: three-letter country
/// codes become uppercase ISO3, everything else becomes a lowercase slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionKey {
    /// Normalized region identifier
    pub id: String,
    /// Detail tier of the document
    pub level: DetailLevel,
}

impl RegionKey {
    /// Create a region key, normalizing the id's case.
    pub fn new(id: &str, level: DetailLevel) -> Self {
        Self {
            id: normalize_region_id(id),
            level,
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.id, self.level)
    }
}

/// Normalize a region identifier.
///
/// Three-letter ids are country codes (uppercase ISO3); longer ids are
/// composite-region slugs (lowercase).
pub fn normalize_region_id(id: &str) -> String {
    let trimmed = id.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        trimmed.to_ascii_uppercase()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Errors raised when parsing textual keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key did not split into exactly three components
    WrongComponentCount { key: String, found: usize },
    /// First component is not a detail level name
    InvalidLevel(String),
    /// Second component is not an integer latitude
    InvalidLatitude(String),
    /// Third component is not an integer longitude
    InvalidLongitude(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::WrongComponentCount { key, found } => {
                write!(
                    f,
                    "Invalid tile key '{}': expected 3 components, found {}",
                    key, found
                )
            }
            KeyError::InvalidLevel(level) => {
                write!(
                    f,
                    "Invalid detail level '{}' (must be overview, detailed or ultra)",
                    level
                )
            }
            KeyError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude component '{}'", lat)
            }
            KeyError::InvalidLongitude(lon) => {
                write!(f, "Invalid longitude component '{}'", lon)
            }
        }
    }
}

impl std::error::Error for KeyError {}
