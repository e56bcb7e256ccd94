//! External value fetching
//!
//! Resolves `externalValue` example references over HTTP, with a
//! time-expiring cache in front of the network. Only absolute http/https
//! URLs are fetched; every other scheme is rejected outright, which keeps
//! config-driven reads away from local files and exotic transports.

mod cache;

pub use cache::{ExternalValueCache, ABSOLUTE_TTL, SLIDING_TTL};

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::error::{SimulationError, SimulatorResult};

/// Fetches external example payloads, consulting the cache first
#[derive(Debug)]
pub struct ExternalValueFetcher {
    client: reqwest::Client,
    cache: ExternalValueCache,
}

impl ExternalValueFetcher {
    pub fn new() -> Self {
        Self::with_cache(ExternalValueCache::new())
    }

    pub fn with_cache(cache: ExternalValueCache) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache,
        }
    }

    /// Fetch the body behind `url`, returning a cache hit when possible.
    ///
    /// On a miss performs a single GET; HTTP error statuses and transport
    /// failures are reported as [`SimulationError::ExternalFetch`]. There is
    /// no retry. The token cancels the outbound request.
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> SimulatorResult<String> {
        let parsed = Url::parse(url).map_err(|e| SimulationError::ExternalFetch {
            url: url.to_string(),
            reason: format!("invalid URL: {}", e),
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(SimulationError::DisallowedScheme(other.to_string())),
        }

        if let Some(hit) = self.cache.get(url) {
            debug!(url = %url, "External value cache hit");
            return Ok(hit);
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(SimulationError::Cancelled),
            result = self.get_body(parsed) => result?,
        };

        self.cache.insert(url, body.clone());
        debug!(url = %url, bytes = body.len(), "External value fetched");
        Ok(body)
    }

    async fn get_body(&self, url: Url) -> SimulatorResult<String> {
        let fetch_err = |e: reqwest::Error| SimulationError::ExternalFetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(fetch_err)?;
        let response = response.error_for_status().map_err(fetch_err)?;
        response.text().await.map_err(fetch_err)
    }

    pub fn cache(&self) -> &ExternalValueCache {
        &self.cache
    }
}

impl Default for ExternalValueFetcher {
    fn default() -> Self {
        Self::new()
    }
}
