//! AtlasLayer CLI - diagnostic command-line interface
//!
//! Exercises the boundary cache against a published HTTP data set or a
//! local data directory: fetch a region or tile, run a scripted load
//! sequence, print cache statistics.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use atlaslayer::cache::{BoundaryCache, CacheConfig};
use atlaslayer::coord::DetailLevel;
use atlaslayer::fetch::{Fetcher, FileFetcher, HttpFetcher};
use atlaslayer::logging::init_logging;

mod commands;
mod error;

use error::CliError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    /// Coarse boundaries for the zoomed-out view
    Overview,
    /// Mid-resolution boundaries
    Detailed,
    /// Full-resolution boundaries
    Ultra,
}

impl From<LevelArg> for DetailLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Overview => DetailLevel::Overview,
            LevelArg::Detailed => DetailLevel::Detailed,
            LevelArg::Ultra => DetailLevel::Ultra,
        }
    }
}

#[derive(Parser)]
#[command(name = "atlaslayer")]
#[command(about = "Inspect and exercise the boundary cache", version)]
struct Cli {
    /// Base URL of the published boundary data set
    #[arg(long, conflicts_with = "data_dir")]
    base_url: Option<String>,

    /// Local data directory laid out like the published data set
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a region document and summarize it
    Region {
        /// Region id (ISO3 country code or composite slug)
        id: String,

        /// Detail tier to fetch
        #[arg(long, value_enum, default_value = "overview")]
        level: LevelArg,
    },

    /// Fetch one binary tile for a camera position
    Tile {
        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Zoom scalar (1.0 = fully zoomed out)
        #[arg(long, default_value = "2.0")]
        zoom: f64,
    },

    /// Run a scripted load sequence and print cache statistics
    Stats {
        /// Region ids to load
        #[arg(required = true)]
        regions: Vec<String>,

        /// Detail tier to fetch
        #[arg(long, value_enum, default_value = "overview")]
        level: LevelArg,
    },
}

async fn run<F: Fetcher + 'static>(
    cache: BoundaryCache<F>,
    command: Command,
) -> Result<(), CliError> {
    match command {
        Command::Region { id, level } => commands::run_region(&cache, &id, level.into()).await,
        Command::Tile { lat, lon, zoom } => commands::run_tile(&cache, lat, lon, zoom).await,
        Command::Stats { regions, level } => {
            commands::run_stats(&cache, &regions, level.into()).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match init_logging("logs", "atlaslayer.log") {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging unavailable: {}", e);
            None
        }
    };

    let config = CacheConfig::default();
    let result = match (cli.base_url, cli.data_dir) {
        (Some(url), _) => match HttpFetcher::new(url) {
            Ok(fetcher) => run(BoundaryCache::new(fetcher, config), cli.command).await,
            Err(e) => Err(CliError::from(e)),
        },
        (None, Some(dir)) => {
            run(
                BoundaryCache::new(FileFetcher::new(dir), config),
                cli.command,
            )
            .await
        }
        (None, None) => Err(CliError::MissingSource),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
