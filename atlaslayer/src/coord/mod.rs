//! Tile coordinate math and key handling
//!
//! Converts between continuous camera coordinates (longitude/latitude,
//! zoom) and the quantized tile grid used for cache identities and the
//! offline pipeline's file naming.

mod types;

pub use types::{
    normalize_region_id, DetailLevel, KeyError, RegionKey, TileKey, MAX_LAT, MAX_LON, MIN_LAT,
    MIN_LON,
};

/// Baseline tile edge length in degrees at zoom 1.0.
pub const BASE_TILE_SIZE_DEGREES: f64 = 10.0;

/// Tile edge length in degrees for a given zoom.
///
/// The grid refines as the camera zooms in: 10° at zoom ≤ 2, then
/// shrinking as `10 / (zoom / 2)`.
#[inline]
pub fn tile_size_degrees(zoom: f64) -> f64 {
    BASE_TILE_SIZE_DEGREES / (zoom / 2.0).max(1.0)
}

/// Quantize a world coordinate to the origin of its grid cell.
///
/// Floor-division to a multiple of `size`, rounded to whole degrees for
/// embedding in a [`TileKey`].
#[inline]
pub fn quantize(value: f64, size: f64) -> i32 {
    ((value / size).floor() * size).round() as i32
}

/// Quantize a camera position to the tile key containing it.
pub fn tile_key_at(level: DetailLevel, lon: f64, lat: f64, zoom: f64) -> TileKey {
    let size = tile_size_degrees(zoom);
    TileKey::new(level, quantize(lon, size), quantize(lat, size))
}

/// Clamp a tile-origin longitude to the valid grid range.
#[inline]
pub fn clamp_lon(lon: f64) -> f64 {
    lon.clamp(MIN_LON as f64, MAX_LON as f64)
}

/// Clamp a tile-origin latitude to the valid grid range.
#[inline]
pub fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(MIN_LAT as f64, MAX_LAT as f64)
}
