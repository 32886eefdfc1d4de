//! Fetch a region document and summarize it.

use atlaslayer::cache::BoundaryCache;
use atlaslayer::coord::{normalize_region_id, DetailLevel};
use atlaslayer::fetch::Fetcher;

use crate::error::CliError;

pub async fn run_region<F: Fetcher + 'static>(
    cache: &BoundaryCache<F>,
    id: &str,
    level: DetailLevel,
) -> Result<(), CliError> {
    let collection = cache.load_region(id, level).await;
    let stats = cache.stats();

    println!("Region {} at {}", normalize_region_id(id), level);
    println!("  Features:  {}", collection.features.len());
    println!("  Cached:    {}", cache.is_cached(id, level));
    if let Some(error) = stats.errors.last() {
        println!("  Last error: {}", error);
    }
    Ok(())
}
