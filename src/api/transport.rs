//! Backend transport seam and its reqwest implementation.
//!
//! DESIGN
//! ======
//! The typed client never talks to reqwest directly. It builds an
//! [`ApiRequest`] and hands it to a [`Transport`], which returns the decoded
//! JSON body. Tests swap in scripted transports; production uses
//! [`HttpTransport`].

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use super::types::{ApiError, ErrorBody};
use crate::config::HttpTimeouts;

const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

// =============================================================================
// REQUEST
// =============================================================================

/// One backend call, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Raw (unencoded) path segments, e.g. `["watchlists", "my", "anime", "Spy x Family"]`.
    pub segments: Vec<String>,
    /// Bearer token; `None` for unauthenticated endpoints.
    pub token: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self { method, segments: segments.iter().map(|s| (*s).to_owned()).collect(), token: None, body: None }
    }

    #[must_use]
    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    #[must_use]
    pub fn post(segments: &[&str]) -> Self {
        Self::new(Method::POST, segments)
    }

    #[must_use]
    pub fn put(segments: &[&str]) -> Self {
        Self::new(Method::PUT, segments)
    }

    #[must_use]
    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    #[must_use]
    pub fn bearer(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body cannot be serialized.
    pub fn json<T: serde::Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?);
        Ok(self)
    }

    /// Human-readable path (`/users/3`), used for logging and test matching.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends an [`ApiRequest`] and returns the JSON body (`Value::Null` for empty bodies).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// reqwest-backed transport against the configured REST backend.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url =
            reqwest::Url::parse(base_url).map_err(|e| ApiError::HttpClientBuild(format!("base url {base_url}: {e}")))?;
        Ok(Self { http, base_url })
    }

    fn url_for(&self, segments: &[String]) -> Result<reqwest::Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::Request(format!("base url cannot carry a path: {}", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = self.url_for(&request.segments)?;
        let mut builder = self.http.request(request.method, url);
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        parse_response(status, &text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Map a raw status + body to the transport result.
pub(crate) fn parse_response(status: u16, text: &str) -> Result<Value, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(text)
            .map(|b| b.error)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_owned());
        return Err(ApiError::Status { status, message });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
