//! Visible tile enumeration.

use crate::coord::{clamp_lat, clamp_lon, tile_size_degrees, DetailLevel, TileKey};

use super::types::ViewportState;

/// Enumerate the tiles that must be resident for a camera position.
///
/// `level` is the tier to enumerate at, chosen by the caller through
/// [`super::select_level`] (or the [`super::LevelGate`] debouncing it).
/// Walks the `grid_radius × grid_radius` square of cells around the
/// tile-aligned center, clamping origins to the valid world range, and
/// returns the keys sorted nearest to the (unclamped) camera center
/// first, ties broken by enumeration order. Callers loading sequentially
/// therefore prioritize on-screen-center tiles.
pub fn enumerate(
    center_lon: f64,
    center_lat: f64,
    zoom: f64,
    grid_radius: i32,
    level: DetailLevel,
) -> Vec<TileKey> {
    let size = tile_size_degrees(zoom);
    let origin_lon = (center_lon / size).floor() * size;
    let origin_lat = (center_lat / size).floor() * size;
    let half = grid_radius / 2;

    let mut candidates: Vec<(TileKey, f64)> =
        Vec::with_capacity((grid_radius * grid_radius).max(0) as usize);
    for dy in -half..=half {
        for dx in -half..=half {
            let lon = clamp_lon(origin_lon + dx as f64 * size);
            let lat = clamp_lat(origin_lat + dy as f64 * size);
            let key = TileKey::new(level, lon.round() as i32, lat.round() as i32);
            let d_lon = lon - center_lon;
            let d_lat = lat - center_lat;
            candidates.push((key, d_lon * d_lon + d_lat * d_lat));
        }
    }

    // Stable sort keeps submission order for equidistant tiles.
    candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().map(|(key, _)| key).collect()
}

/// Enumerate for a viewport snapshot.
pub fn enumerate_viewport(
    state: &ViewportState,
    grid_radius: i32,
    level: DetailLevel,
) -> Vec<TileKey> {
    enumerate(
        state.center_lon,
        state.center_lat,
        state.zoom,
        grid_radius,
        level,
    )
}
