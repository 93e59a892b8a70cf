//! Blocking HTTP fetch of raw image bytes

use crate::error::Result;
use std::time::Duration;
use tracing::debug;

/// Fetches the raw bytes behind a URL. The seam where tests substitute a
/// stub transport; the library never caches or retries at this layer.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain blocking HTTP(S) GET with the client's default redirect handling.
/// No custom headers, no auth.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with default settings (30 second timeout)
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url = %url, "fetching image");
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        debug!(url = %url, size = bytes.len(), "fetched image");
        Ok(bytes.to_vec())
    }
}
