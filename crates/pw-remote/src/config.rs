//! Remote endpoint configuration

use crate::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Server root; all endpoint paths are resolved against it
    pub base_url: String,
    /// Collection path of the editable records (`{records_path}{id}/`)
    pub records_path: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum number of autocomplete candidates requested
    pub search_result_limit: usize,
    /// Header announcing the partial-update semantic on a POST
    pub method_override_header: String,
    /// Header carrying the anti-forgery token
    pub csrf_header: String,
    /// Autocomplete cache capacity; 0 disables caching
    pub search_cache_capacity: u64,
    /// Autocomplete cache time-to-live in seconds
    pub search_cache_ttl_secs: u64,
}

impl RemoteConfig {
    /// Create default configuration for a server
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// With records collection path
    #[inline]
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    /// With autocomplete cache
    #[inline]
    #[must_use]
    pub fn with_search_cache(mut self, capacity: u64, ttl_secs: u64) -> Self {
        self.search_cache_capacity = capacity;
        self.search_cache_ttl_secs = ttl_secs;
        self
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check settings
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` if `base_url` is not an absolute http(s) URL
    /// - `ConfigError::InvalidValue` for zero timeouts or limits and blank header names
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.search_result_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "search_result_limit",
                reason: "must be greater than zero".to_string(),
            });
        }
        for (key, value) in [
            ("method_override_header", &self.method_override_header),
            ("csrf_header", &self.csrf_header),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "header name must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parsed base URL
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` if `base_url` is not an absolute http(s) URL
    pub fn base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Ok(url)
    }

    /// Resolve an endpoint path against the base URL
    ///
    /// Absolute URLs are used as-is; paths are joined onto the server root.
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` if the base or the path cannot be combined
    pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }
        self.base()?
            .join(path)
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }

    /// Resource URL of one record
    ///
    /// # Errors
    /// - `ConfigError::InvalidBaseUrl` if the URL cannot be built
    pub fn record_url(&self, record_id: pw_model::RecordId) -> Result<Url, ConfigError> {
        let collection = with_trailing_slash(&self.records_path);
        self.resolve(&format!("{collection}{record_id}/"))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            records_path: "/records/".to_string(),
            request_timeout_secs: 30,
            search_result_limit: 10,
            method_override_header: "X-HTTP-Method-Override".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            search_cache_capacity: 0,
            search_cache_ttl_secs: 60,
        }
    }
}

/// Append a trailing slash unless already present
pub(crate) fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_model::RecordId;

    #[test]
    fn defaults_are_valid() {
        let config = RemoteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_result_limit, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn record_url_layout() {
        let config = RemoteConfig::new("https://patchwork.example.org");
        let url = config.record_url(RecordId(42)).unwrap();
        assert_eq!(url.as_str(), "https://patchwork.example.org/records/42/");

        let config = RemoteConfig::new("https://patchwork.example.org")
            .with_records_path("/api/1.0/series");
        let url = config.record_url(RecordId(42)).unwrap();
        assert_eq!(url.as_str(), "https://patchwork.example.org/api/1.0/series/42/");
    }

    #[test]
    fn resolve_keeps_absolute_urls() {
        let config = RemoteConfig::new("https://patchwork.example.org");
        let url = config.resolve("https://users.example.org/complete/").unwrap();
        assert_eq!(url.host_str(), Some("users.example.org"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = RemoteConfig::new("ftp://example.org");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl { .. })));

        let config = RemoteConfig::new("not a url");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl { .. })));

        let mut config = RemoteConfig::default();
        config.search_result_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "search_result_limit", .. })
        ));

        let mut config = RemoteConfig::default();
        config.csrf_header = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "csrf_header", .. })
        ));
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let config: RemoteConfig =
            serde_json::from_str(r#"{"base_url": "https://pw.example.org/"}"#).unwrap();
        assert_eq!(config.base_url, "https://pw.example.org/");
        assert_eq!(config.records_path, "/records/");
        assert_eq!(config.csrf_header, "X-CSRFToken");
    }
}
