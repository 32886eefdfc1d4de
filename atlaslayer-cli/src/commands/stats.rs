//! Run a scripted load sequence and print the statistics block.

use atlaslayer::cache::BoundaryCache;
use atlaslayer::coord::DetailLevel;
use atlaslayer::fetch::Fetcher;

use crate::error::CliError;

pub async fn run_stats<F: Fetcher + 'static>(
    cache: &BoundaryCache<F>,
    regions: &[String],
    level: DetailLevel,
) -> Result<(), CliError> {
    for region in regions {
        cache.load_region(region, level).await;
        // A second load per region exercises the hit path so the
        // printed ratio means something.
        cache.load_region(region, level).await;
    }

    println!("{}", cache.stats().format());
    let cached = cache.cached_regions();
    if !cached.is_empty() {
        println!("RESIDENT REGIONS");
        for (id, level) in cached {
            println!("  {} ({})", id, level);
        }
    }
    Ok(())
}
