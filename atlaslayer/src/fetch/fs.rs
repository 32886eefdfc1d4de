//! Filesystem fetcher for locally installed boundary data sets.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::trace;

use super::types::{FetchError, Fetcher};

/// Reads boundary payloads from a local data directory laid out the same
/// way as the published HTTP source.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher rooted at the given data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory this fetcher reads from.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl Fetcher for FileFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path.trim_start_matches('/'));
        trace!(path = %full.display(), "Reading boundary file");

        tokio::fs::read(&full).await.map_err(|e| {
            let path = full.display().to_string();
            if e.kind() == ErrorKind::NotFound {
                FetchError::NotFound { path }
            } else {
                FetchError::Io {
                    path,
                    message: e.to_string(),
                }
            }
        })
    }
}
