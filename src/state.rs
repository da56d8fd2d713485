//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. One
//! [`ResilientClient`] (and therefore one mock store) is shared by the session
//! and the console, so fallback writes made through either are visible to both.

use std::sync::Arc;

use crate::api::{MockStore, ResilientClient, Transport};
use crate::config::Config;
use crate::content::{ContentAdapter, ContentFeed};
use crate::dashboard::DashboardService;
use crate::services::console::AdminConsole;
use crate::session::storage::TokenStore;
use crate::session::{SessionOptions, SessionStore};

/// Clone is required by Axum; all inner fields are Arc-backed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: SessionStore,
    pub console: AdminConsole,
    pub dashboard: DashboardService,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        feed: Arc<dyn ContentFeed>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let client = ResilientClient::new(transport, MockStore::seeded());
        let session = SessionStore::new(
            client.clone(),
            tokens,
            SessionOptions {
                guest_login_enabled: config.guest_login_enabled,
                marker_max_age_secs: config.marker_max_age_secs,
            },
        );
        let console = AdminConsole::new(session.clone(), client);
        let dashboard = DashboardService::new(ContentAdapter::new(feed));
        Self { config: Arc::new(config), session, console, dashboard }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use serde_json::Value;

    use super::*;
    use crate::api::ApiRequest;
    use crate::api::types::{ApiError, Role, User};
    use crate::config::HttpTimeouts;
    use crate::content::ContentError;
    use crate::session::marker::MarkerKey;
    use crate::session::storage::MemoryTokenStore;

    type Handler = Box<dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync>;

    /// The error every "backend down" transport returns.
    pub fn unreachable() -> ApiError {
        ApiError::Request("connection refused".into())
    }

    pub fn sample_user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            profile_url: None,
            role,
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    pub fn test_config() -> Config {
        Config {
            port: 0,
            api_base_url: "http://backend.test".into(),
            content_feed_base_url: "http://feed.test".into(),
            timeouts: HttpTimeouts::default(),
            marker_key: MarkerKey::new(b"test-marker-secret").unwrap(),
            marker_max_age_secs: 600,
            cookie_secure: false,
            guest_login_enabled: true,
            session_file: None,
        }
    }

    pub fn test_state(transport: Arc<ScriptedTransport>, feed: Arc<StaticFeed>) -> AppState {
        AppState::new(test_config(), transport, feed, Arc::new(MemoryTokenStore::new()))
    }

    // -------------------------------------------------------------------------
    // http
    // -------------------------------------------------------------------------

    /// Drive one request through `app`; the body is decoded as JSON (`Null` when empty).
    pub async fn call(app: &axum::Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        use tower::ServiceExt;

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, headers, body)
    }

    pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// `name=value` of the first `Set-Cookie` header for `name`.
    pub fn set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(|v| v.split(';').next().unwrap_or_default().to_owned())
    }

    // -------------------------------------------------------------------------
    // transport
    // -------------------------------------------------------------------------

    /// Transport answering from a closure and recording every request.
    pub struct ScriptedTransport {
        handler: Handler,
        calls: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(handler: impl Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self { handler: Box::new(handler), calls: Mutex::new(Vec::new()) })
        }

        /// Backend that is never reachable.
        pub fn failing() -> Arc<Self> {
            Self::new(|_| Err(unreachable()))
        }

        pub fn calls(&self) -> Vec<ApiRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
            self.calls.lock().unwrap().push(request.clone());
            (self.handler)(&request)
        }
    }

    // -------------------------------------------------------------------------
    // content feed
    // -------------------------------------------------------------------------

    /// Feed returning a fixed body (or failure) and recording `(page, per_page)`.
    pub struct StaticFeed {
        body: Result<Value, ContentError>,
        requests: Mutex<Vec<(u32, Option<u32>)>>,
    }

    impl StaticFeed {
        pub fn new(body: Value) -> Arc<Self> {
            Arc::new(Self { body: Ok(body), requests: Mutex::new(Vec::new()) })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                body: Err(ContentError::Request("feed offline".into())),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<(u32, Option<u32>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ContentFeed for StaticFeed {
        async fn popular(&self, page: u32, per_page: Option<u32>) -> Result<Value, ContentError> {
            self.requests.lock().unwrap().push((page, per_page));
            self.body.clone()
        }
    }
}
