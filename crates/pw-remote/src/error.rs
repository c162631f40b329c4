//! Error types for the remote boundary
//!
//! Every request family has its own error so callers can apply the right
//! degraded behaviour:
//! - [`PatchError`]: the field stays open for correction
//! - [`SearchError`]: the candidate list is emptied, nothing is shown to the user
//! - [`ListError`]: the list widget keeps its previous page

/// Failure below HTTP: connection, timeout, TLS, ...
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the server
    #[error("connection failed: {0}")]
    Connect(String),

    /// Request took longer than the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Request could not be built or the response body could not be read
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Partial update failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Transport failed before a response arrived
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Server answered with a non-2xx status
    #[error("server rejected update with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// 2xx response whose body is not a record
    #[error("invalid record in response: {0}")]
    Decode(String),

    /// Resource URL could not be built
    #[error("invalid resource url: {0}")]
    InvalidUrl(String),
}

impl PatchError {
    /// HTTP status, when the server answered
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the server rejected the request itself (4xx)
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }
}

/// Autocomplete search failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Transport failed before a response arrived
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Server answered with a non-2xx status
    #[error("search failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body is not a JSON array
    #[error("invalid search response: {0}")]
    Decode(String),

    /// Search URL could not be built
    #[error("invalid search url: {0}")]
    InvalidUrl(String),
}

/// Record list failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// Transport failed before a response arrived
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Server answered with a non-2xx status
    #[error("list request failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body is not a page of records
    #[error("invalid list response: {0}")]
    Decode(String),

    /// Collection URL could not be built
    #[error("invalid collection url: {0}")]
    InvalidUrl(String),
}

/// Invalid remote configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Base URL does not parse or cannot carry paths
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl {
        /// Offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// A setting has an unusable value
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client could not be constructed
    #[error("http client error: {0}")]
    Client(String),
}
