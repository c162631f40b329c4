//! Editor configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! min_query_len = 3
//! placeholder = "None"
//!
//! [remote]
//! base_url = "https://patchwork.example.org/"
//! records_path = "/api/1.0/series/"
//! search_cache_capacity = 256
//! ```

use crate::error::LoadError;
use pw_model::PLACEHOLDER;
use pw_remote::{ConfigError, RemoteConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Remote endpoints
    pub remote: RemoteConfig,
    /// Shortest query that triggers an autocomplete request
    pub min_query_len: usize,
    /// Text shown for fields without a value
    pub placeholder: String,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With remote configuration
    #[inline]
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    /// With minimum query length
    #[inline]
    #[must_use]
    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// - `LoadError::Parse` for malformed TOML
    /// - `LoadError::Invalid` for out-of-range values
    pub fn from_toml_str(source: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// - `LoadError::Io` if the file cannot be read
    /// - otherwise as [`EditorConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check settings
    ///
    /// # Errors
    /// - `ConfigError` from the remote section, or for a zero `min_query_len`
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.remote.validate()?;
        if self.min_query_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_query_len",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            min_query_len: 3,
            placeholder: PLACEHOLDER.to_string(),
        }
    }
}
