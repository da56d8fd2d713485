//! Public anime-metadata feed (Consumet `meta/anilist` API).

use std::fmt::Write;
use std::time::Duration;

use serde_json::Value;

use crate::config::HttpTimeouts;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("content feed request failed: {0}")]
    Request(String),
    #[error("content feed responded with status {0}")]
    Status(u16),
    #[error("content feed decode failed: {0}")]
    Decode(String),
    #[error("content feed client build failed: {0}")]
    HttpClientBuild(String),
}

/// Source of loosely-shaped popular-anime pages.
#[async_trait::async_trait]
pub trait ContentFeed: Send + Sync {
    /// `GET /meta/anilist/popular?page={page}[&perPage={per_page}]`, raw JSON body.
    async fn popular(&self, page: u32, per_page: Option<u32>) -> Result<Value, ContentError>;
}

pub struct HttpContentFeed {
    http: reqwest::Client,
    base_url: String,
}

impl HttpContentFeed {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ContentError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn popular_url(&self, page: u32, per_page: Option<u32>) -> String {
        let mut url = format!("{}/meta/anilist/popular?page={page}", self.base_url);
        if let Some(per_page) = per_page {
            let _ = write!(url, "&perPage={per_page}");
        }
        url
    }
}

#[async_trait::async_trait]
impl ContentFeed for HttpContentFeed {
    async fn popular(&self, page: u32, per_page: Option<u32>) -> Result<Value, ContentError> {
        let response = self
            .http
            .get(self.popular_url(page, per_page))
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))
    }
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
