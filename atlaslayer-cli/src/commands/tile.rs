//! Fetch one binary tile for a camera position.

use atlaslayer::cache::BoundaryCache;
use atlaslayer::coord::{tile_key_at, DetailLevel};
use atlaslayer::fetch::Fetcher;
use atlaslayer::viewport::select_level;

use crate::error::CliError;

pub async fn run_tile<F: Fetcher + 'static>(
    cache: &BoundaryCache<F>,
    lat: f64,
    lon: f64,
    zoom: f64,
) -> Result<(), CliError> {
    let level = select_level(zoom, DetailLevel::Overview);
    let key = tile_key_at(level, lon, lat, zoom);
    let collection = cache.load_tile(key).await;

    println!("Tile {} for ({:.4}, {:.4}) at zoom {:.1}", key, lat, lon, zoom);
    println!("  Features:  {}", collection.features.len());
    Ok(())
}
