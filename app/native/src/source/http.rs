//! Shared HTTP plumbing for providers and artwork downloads.

use std::io::Read;
use std::time::Duration;

use image::RgbImage;

use super::SourceError;
use crate::constants::USER_AGENT;
use crate::tracker::ArtworkFetcher;

/// Artwork responses larger than this are rejected.
const MAX_ARTWORK_BYTES: u64 = 10 * 1024 * 1024;

/// Blocking HTTP client with bounded timeouts.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self { Self::new() }
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(5))
            .timeout_write(Duration::from_secs(5))
            .user_agent(USER_AGENT)
            .build();

        Self { agent }
    }

    #[must_use]
    pub const fn agent(&self) -> &ureq::Agent { &self.agent }

    /// Downloads `url` into memory, refusing bodies over `limit` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, non-2xx statuses, empty or
    /// oversized bodies.
    pub fn download(&self, url: &str, limit: u64) -> Result<Vec<u8>, SourceError> {
        let response = self.agent.get(url).call()?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(limit + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if bytes.is_empty() {
            return Err(SourceError::Malformed("empty response body".to_string()));
        }
        if bytes.len() as u64 > limit {
            return Err(SourceError::TooLarge(limit));
        }

        Ok(bytes)
    }
}

impl From<ureq::Error> for SourceError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(transport) => Self::Network(transport.to_string()),
        }
    }
}

/// Downloads and decodes artwork over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpArtworkFetcher {
    client: HttpClient,
}

impl HttpArtworkFetcher {
    #[must_use]
    pub const fn new(client: HttpClient) -> Self { Self { client } }
}

impl ArtworkFetcher for HttpArtworkFetcher {
    fn fetch(&self, url: &str) -> Result<RgbImage, SourceError> {
        let bytes = self.client.download(url, MAX_ARTWORK_BYTES)?;
        let image =
            image::load_from_memory(&bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(image.into_rgb8())
    }
}
