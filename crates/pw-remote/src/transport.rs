//! HTTP transport seam
//!
//! [`Transport`] is the only place requests leave the process. The
//! production implementation is [`ReqwestTransport`]; tests substitute
//! scripted or mocked transports.

use crate::config::RemoteConfig;
use crate::error::{ConfigError, TransportError};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
}

/// Outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method
    pub method: HttpMethod,
    /// Absolute URL including query
    pub url: Url,
    /// Extra headers
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create GET request
    #[inline]
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create POST request with a JSON body
    #[inline]
    #[must_use]
    pub fn post(url: Url, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add header
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Response as seen by the callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Raw body
    pub body: String,
}

impl HttpResponse {
    /// Create response
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create response carrying a JSON body
    #[inline]
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Check for a 2xx status
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode JSON body
    ///
    /// # Errors
    /// Returns the decoder message when the body does not match `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_str(&self.body).map_err(|e| e.to_string())
    }
}

/// Sends requests to the server
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for its response
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create transport from configuration
    ///
    /// # Errors
    /// - `ConfigError::Client` if the client cannot be built
    pub fn new(config: &RemoteConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn request_header_lookup_is_case_insensitive() {
        let request = HttpRequest::post(url("http://localhost/records/1/"), json!({"a": 1}))
            .with_header("X-CSRFToken", "abc");
        assert_eq!(request.header("x-csrftoken"), Some("abc"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn request_query_lookup() {
        let request = HttpRequest::get(url("http://localhost/complete_user/?q=ali&l=10"));
        assert_eq!(request.query_param("q").as_deref(), Some("ali"));
        assert_eq!(request.query_param("l").as_deref(), Some("10"));
        assert_eq!(request.query_param("page"), None);
    }

    #[test]
    fn response_status_classes() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn response_decode() {
        let response = HttpResponse::json(200, &json!({"id": 1}));
        let value: Value = response.decode().unwrap();
        assert_eq!(value, json!({"id": 1}));

        let broken = HttpResponse::new(200, "<html>");
        assert!(broken.decode::<Value>().is_err());
    }

    #[test]
    fn reqwest_transport_builds_from_config() {
        assert!(ReqwestTransport::new(&RemoteConfig::default()).is_ok());
    }
}
