//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    /// Neither --base-url nor --data-dir was given
    #[error("no boundary source: pass --base-url or --data-dir")]
    MissingSource,

    /// The HTTP fetcher could not be constructed
    #[error(transparent)]
    Fetch(#[from] atlaslayer::fetch::FetchError),
}
