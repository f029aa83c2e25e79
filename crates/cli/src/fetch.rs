//! HTTP thumbnail downloads.

use deck_core::{Error, ImageFetch, ThumbnailFetcher};
use std::time::Duration;

/// Fetches thumbnails over HTTP with a per-request timeout.
pub struct HttpThumbnailFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpThumbnailFetcher {
    pub fn new(timeout_secs: u64) -> deck_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::ThumbnailError {
                url: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }

    async fn download(&self, url: &str) -> deck_core::Result<Vec<u8>> {
        let failed = |reason: String| Error::ThumbnailError {
            url: url.to_string(),
            reason,
        };

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                failed(format!("timed out after {}s", self.timeout_secs))
            } else {
                failed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl ThumbnailFetcher for HttpThumbnailFetcher {
    async fn fetch(&self, url: &str) -> ImageFetch {
        log::debug!("Downloading thumbnail {}", url);
        match self.download(url).await {
            Ok(bytes) => ImageFetch::from_bytes(bytes),
            Err(e) => ImageFetch::Missing(e.to_string()),
        }
    }
}
