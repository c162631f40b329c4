//! Remote autocomplete search
//!
//! `GET {endpoint}/?q={query}&l={limit}` returns a JSON array of candidate
//! objects. Results for identical queries can be served from a bounded TTL
//! cache. Ordering of overlapping searches is not handled here; the caller
//! discards stale responses.

use crate::config::{with_trailing_slash, RemoteConfig};
use crate::error::SearchError;
use crate::transport::{HttpRequest, Transport};
use moka::future::Cache;
use pw_model::{AutocompleteConfig, RefValue};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache key: endpoint and query
type SearchKey = (String, String);

/// Query-driven remote candidate source
#[derive(Clone)]
pub struct AutocompleteSource {
    transport: Arc<dyn Transport>,
    config: Arc<RemoteConfig>,
    cache: Option<Cache<SearchKey, Arc<Vec<Value>>>>,
}

impl AutocompleteSource {
    /// Create source; a cache is attached when the configuration asks for one
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: Arc<RemoteConfig>) -> Self {
        let cache = (config.search_cache_capacity > 0).then(|| {
            Cache::builder()
                .max_capacity(config.search_cache_capacity)
                .time_to_live(Duration::from_secs(config.search_cache_ttl_secs))
                .build()
        });
        Self {
            transport,
            config,
            cache,
        }
    }

    /// Result-count limit sent with every query
    #[inline]
    #[must_use]
    pub fn result_limit(&self) -> usize {
        self.config.search_result_limit
    }

    /// Build the search request without sending it
    ///
    /// # Errors
    /// - `SearchError::InvalidUrl` if the endpoint cannot be resolved
    pub fn build_request(&self, endpoint: &str, query: &str) -> Result<HttpRequest, SearchError> {
        let mut url = self
            .config
            .resolve(&with_trailing_slash(endpoint))
            .map_err(|e| SearchError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .clear()
            .append_pair("q", query)
            .append_pair("l", &self.config.search_result_limit.to_string());
        Ok(HttpRequest::get(url))
    }

    /// Fetch raw candidate objects for a query
    ///
    /// # Errors
    /// - `SearchError::Transport` if no response arrived
    /// - `SearchError::Status` for non-2xx responses
    /// - `SearchError::Decode` if the body is not a JSON array
    pub async fn fetch(&self, endpoint: &str, query: &str) -> Result<Arc<Vec<Value>>, SearchError> {
        let key = (endpoint.to_string(), query.to_string());
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                debug!(endpoint, query, "autocomplete cache hit");
                return Ok(hit);
            }
        }

        let request = self.build_request(endpoint, query)?;
        debug!(endpoint, query, url = %request.url, "autocomplete search");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(SearchError::Status {
                status: response.status,
            });
        }
        let items: Vec<Value> = response.decode().map_err(SearchError::Decode)?;
        let items = Arc::new(items);

        if let Some(cache) = &self.cache {
            cache.insert(key, Arc::clone(&items)).await;
        }
        Ok(items)
    }

    /// Search candidates for a reference field
    ///
    /// Objects without a usable identifier are dropped, then the remaining
    /// candidates are filtered on the configured search attributes.
    ///
    /// # Errors
    /// Same as [`AutocompleteSource::fetch`]
    pub async fn search(
        &self,
        field: &AutocompleteConfig,
        query: &str,
    ) -> Result<Vec<RefValue>, SearchError> {
        let items = self
            .fetch(&field.search_endpoint, query)
            .await
            .map_err(|e| {
                warn!(endpoint = %field.search_endpoint, query, error = %e, "autocomplete search failed");
                e
            })?;

        let candidates: Vec<RefValue> = items
            .iter()
            .filter_map(|item| field.candidate_from(item))
            .filter(|candidate| field.matches(candidate, query))
            .take(self.config.search_result_limit)
            .collect();

        debug!(
            endpoint = %field.search_endpoint,
            query,
            received = items.len(),
            kept = candidates.len(),
            "autocomplete candidates"
        );
        Ok(candidates)
    }
}

impl fmt::Debug for AutocompleteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutocompleteSource")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
