//! Shared request context
//!
//! Built once when the editing surface is set up and only read afterwards.
//! Share it behind an `Arc`; nothing mutates it, so no locking is needed.

use crate::record::RecordId;
use std::fmt;

/// Anti-forgery token sent with every partial update
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token value
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token value for use in a request header
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Target record and credentials for field updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    record_id: RecordId,
    token: AuthToken,
}

impl RequestContext {
    /// Create context
    #[inline]
    #[must_use]
    pub fn new(record_id: RecordId, token: AuthToken) -> Self {
        Self { record_id, token }
    }

    /// Record being edited
    #[inline]
    #[must_use]
    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Anti-forgery token
    #[inline]
    #[must_use]
    pub fn token(&self) -> &AuthToken {
        &self.token
    }
}
