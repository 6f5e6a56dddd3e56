//! PokeAPI client
//!
//! This module fetches location areas and creatures from the PokeAPI REST catalog.
//! Every request goes through an in-memory `ExpiringCache` keyed by the full request
//! URL, so repeated lookups within the cache interval never touch the network.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::{LocationArea, LocationPage, Pokemon};
use crate::cache::ExpiringCache;

/// Base URL for the PokeAPI
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Errors that can occur when fetching from the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{status} {reason}")]
    Status {
        status: u16,
        reason: String,
        url: String,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Fetching a named creature failed
    #[error("Error fetching pokemon '{name}': {source}")]
    Pokemon {
        name: String,
        #[source]
        source: Box<ApiError>,
    },
}

/// Source of raw response bodies
///
/// The API client only needs "GET this URL as text"; keeping that behind a trait
/// lets tests serve canned bodies.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Fetches `url` and returns the response body
    async fn get_text(&self, url: &str) -> Result<String, ApiError>;
}

/// `Fetch` implementation backed by a reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Fetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(%status, url, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Client for the PokeAPI with a read-through response cache
#[derive(Debug)]
pub struct PokeApi<F = HttpFetcher> {
    fetcher: F,
    cache: ExpiringCache<String>,
    base_url: String,
}

impl<F: Fetch> PokeApi<F> {
    /// Creates a client with a custom fetcher and base URL
    ///
    /// # Arguments
    /// * `fetcher` - Source of response bodies
    /// * `base_url` - API root, e.g. "https://pokeapi.co/api/v2"; trailing slashes are ignored
    /// * `interval` - Expiry interval of the response cache
    pub fn with_fetcher(fetcher: F, base_url: impl Into<String>, interval: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            fetcher,
            cache: ExpiringCache::new(interval),
            base_url,
        }
    }

    /// The API root requests are built from
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The response cache, keyed by request URL
    pub fn cache(&self) -> &ExpiringCache<String> {
        &self.cache
    }

    /// Fetches one page of location areas
    ///
    /// # Arguments
    /// * `page_url` - A `next`/`previous` URL from an earlier page, or `None` for the first page
    pub async fn fetch_locations(&self, page_url: Option<&str>) -> Result<LocationPage, ApiError> {
        let url = match page_url {
            Some(url) => url.to_string(),
            None => format!("{}/location-area", self.base_url),
        };
        self.get_json(&url).await
    }

    /// Fetches a single location area with its encounters
    pub async fn fetch_location(&self, name: &str) -> Result<LocationArea, ApiError> {
        let url = format!("{}/location-area/{}", self.base_url, name);
        self.get_json(&url).await
    }

    /// Fetches a creature by name
    pub async fn fetch_pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let url = format!("{}/pokemon/{}", self.base_url, name);
        self.get_json(&url).await.map_err(|e| ApiError::Pokemon {
            name: name.to_string(),
            source: Box::new(e),
        })
    }

    /// Stops the cache's background sweep
    pub fn dispose(&self) {
        self.cache.dispose();
    }

    /// Returns the decoded body for `url`, from the cache when fresh
    ///
    /// Only bodies that decode successfully are cached.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        if let Some(body) = self.cache.lookup(url) {
            debug!(url, "cache hit");
            return Ok(serde_json::from_str(&body)?);
        }

        debug!(url, "cache miss, fetching");
        let body = self.fetcher.get_text(url).await?;
        let value = serde_json::from_str(&body)?;
        self.cache.insert(url, body);

        Ok(value)
    }
}
