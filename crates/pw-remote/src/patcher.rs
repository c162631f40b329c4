//! Single-attribute partial updates
//!
//! Updates are sent as `POST {records_path}{id}/` carrying a method-override
//! header for the partial-update verb, so they pass through clients and
//! proxies that only speak GET and POST. No retry happens here; callers own
//! the retry policy.

use crate::config::RemoteConfig;
use crate::error::PatchError;
use crate::transport::{HttpRequest, Transport};
use pw_model::{AuthToken, Record, RecordId};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Verb announced through the method-override header
const PARTIAL_UPDATE_VERB: &str = "PATCH";

/// Issues partial updates against record resources
#[derive(Clone)]
pub struct RecordPatcher {
    transport: Arc<dyn Transport>,
    config: Arc<RemoteConfig>,
}

impl RecordPatcher {
    /// Create patcher
    #[inline]
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: Arc<RemoteConfig>) -> Self {
        Self { transport, config }
    }

    /// Build the request for a partial update without sending it
    ///
    /// The body carries exactly one attribute; `value` may be `null`.
    ///
    /// # Errors
    /// - `PatchError::InvalidUrl` if the resource URL cannot be built
    pub fn build_request(
        &self,
        record_id: RecordId,
        attribute: &str,
        value: Value,
        token: &AuthToken,
    ) -> Result<HttpRequest, PatchError> {
        let url = self
            .config
            .record_url(record_id)
            .map_err(|e| PatchError::InvalidUrl(e.to_string()))?;

        let mut body = Map::new();
        body.insert(attribute.to_string(), value);

        Ok(HttpRequest::post(url, Value::Object(body))
            .with_header(&self.config.method_override_header, PARTIAL_UPDATE_VERB)
            .with_header(&self.config.csrf_header, token.expose()))
    }

    /// Update one attribute of a record
    ///
    /// # Returns
    /// The full updated record; it is authoritative and must replace local state
    ///
    /// # Errors
    /// - `PatchError::Transport` if no response arrived
    /// - `PatchError::Status` for non-2xx responses
    /// - `PatchError::Decode` if a 2xx body is not a record
    pub async fn patch(
        &self,
        record_id: RecordId,
        attribute: &str,
        value: Value,
        token: &AuthToken,
    ) -> Result<Record, PatchError> {
        let request = self.build_request(record_id, attribute, value, token)?;
        debug!(%record_id, attribute, url = %request.url, "sending partial update");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(%record_id, attribute, error = %e, "partial update transport failure");
            PatchError::from(e)
        })?;

        if !response.is_success() {
            warn!(%record_id, attribute, status = response.status, "partial update rejected");
            return Err(PatchError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let value: Value = response.decode().map_err(PatchError::Decode)?;
        let record = Record::from_value(value).map_err(|e| PatchError::Decode(e.to_string()))?;
        debug!(%record_id, attribute, "partial update accepted");
        Ok(record)
    }
}

impl fmt::Debug for RecordPatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordPatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
