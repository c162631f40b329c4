//! Paginated record lists
//!
//! Data side of the list widget: `GET {collection}?perpage=N&ordering=F&page=P`
//! answered with `{"count": total, "results": [...]}`.

use crate::config::RemoteConfig;
use crate::error::ListError;
use crate::transport::{HttpRequest, Transport};
use pw_model::Record;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Sort order on one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    /// Attribute name
    pub field: String,
    /// Descending when true
    pub descending: bool,
}

impl Ordering {
    /// Ascending order on an attribute
    #[inline]
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on an attribute
    #[inline]
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Query parameter value (`-field` for descending)
    #[must_use]
    pub fn to_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }
}

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    per_page: usize,
    page: usize,
    ordering: Option<Ordering>,
}

impl ListQuery {
    /// Default page size
    pub const DEFAULT_PER_PAGE: usize = 20;
    /// Largest page size the server honours
    pub const MAX_PER_PAGE: usize = 100;

    /// First page with the default size and server-side ordering
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With page size, clamped to `1..=MAX_PER_PAGE`
    #[inline]
    #[must_use]
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, Self::MAX_PER_PAGE);
        self
    }

    /// With 1-based page number
    #[inline]
    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// With ordering
    #[inline]
    #[must_use]
    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    /// Page size
    #[inline]
    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// 1-based page number
    #[inline]
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Ordering, if any
    #[inline]
    #[must_use]
    pub fn ordering(&self) -> Option<&Ordering> {
        self.ordering.as_ref()
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            per_page: Self::DEFAULT_PER_PAGE,
            page: 1,
            ordering: None,
        }
    }
}

/// One page of records
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    /// Total number of records across all pages
    pub count: u64,
    /// Records on this page
    pub results: Vec<Record>,
}

impl Page {
    /// Number of pages for a page size
    #[must_use]
    pub fn page_count(&self, per_page: usize) -> u64 {
        let per_page = per_page.max(1) as u64;
        self.count.div_ceil(per_page)
    }
}

/// Fetches pages of records from a collection endpoint
#[derive(Clone)]
pub struct RecordLister {
    transport: Arc<dyn Transport>,
    config: Arc<RemoteConfig>,
}

impl RecordLister {
    /// Create lister
    #[inline]
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: Arc<RemoteConfig>) -> Self {
        Self { transport, config }
    }

    /// Build the list request without sending it
    ///
    /// # Errors
    /// - `ListError::InvalidUrl` if the collection path cannot be resolved
    pub fn build_request(&self, collection: &str, query: &ListQuery) -> Result<HttpRequest, ListError> {
        let mut url = self
            .config
            .resolve(collection)
            .map_err(|e| ListError::InvalidUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("perpage", &query.per_page.to_string());
            if let Some(ordering) = &query.ordering {
                pairs.append_pair("ordering", &ordering.to_param());
            }
            pairs.append_pair("page", &query.page.to_string());
        }
        Ok(HttpRequest::get(url))
    }

    /// Fetch one page
    ///
    /// # Errors
    /// - `ListError::Transport` if no response arrived
    /// - `ListError::Status` for non-2xx responses
    /// - `ListError::Decode` if the body is not a page of records
    pub async fn fetch_page(&self, collection: &str, query: &ListQuery) -> Result<Page, ListError> {
        let request = self.build_request(collection, query)?;
        debug!(url = %request.url, "fetching record page");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ListError::Status {
                status: response.status,
            });
        }
        response.decode().map_err(ListError::Decode)
    }
}

impl fmt::Debug for RecordLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordLister")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
