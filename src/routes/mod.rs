//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the gateway's JSON API and the guarded page endpoints
//! under a single Axum router. The guard middleware sees every request but
//! only acts on `/login` and `/dashboard*`.
//!
//! ERROR HANDLING
//! ==============
//! Handlers return [`RouteError`], rendered as `{"error", "code"}`. Session
//! gating maps to 401, backend rejections keep the backend's status, and
//! transport failures map to 502.

pub mod auth;
pub mod dashboard;
pub mod users;
pub mod watchlists;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::types::ApiError;
use crate::guard;
use crate::services::ErrorCode;
use crate::services::console::ConsoleError;
use crate::session::SessionError;
use crate::state::AppState;

/// Full gateway router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/login", get(login_page))
        .route("/dashboard", get(dashboard_page))
        .route("/dashboard/{*section}", get(dashboard_section_page))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/guest", post(auth::guest))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/api/auth/change-password", put(auth::change_password))
        .route("/api/auth/register", post(auth::register))
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get_one)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/api/users/{id}/watchlist", get(users::watchlist))
        .route("/api/watchlists", get(watchlists::all))
        .route("/api/watchlists/my", get(watchlists::mine))
        .route("/api/watchlists/my/anime", post(watchlists::add))
        .route(
            "/api/watchlists/my/anime/{title}",
            get(watchlists::contains).delete(watchlists::remove),
        )
        .route("/api/dashboard/analytics", get(dashboard::analytics))
        .route("/api/dashboard/activity", get(dashboard::activity))
        .route("/api/dashboard/top-anime", get(dashboard::top_anime))
        .route("/api/content/anime", get(dashboard::anime_list))
        .route("/api/content/anime/meta", get(dashboard::anime_meta))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), guard::enforce))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// PAGES
// =============================================================================

/// `GET /login`: page descriptor; the guard has already bounced signed-in users.
async fn login_page(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "page": "login",
        "guestLoginEnabled": state.config.guest_login_enabled,
    }))
}

/// `GET /dashboard`
async fn dashboard_page(State(state): State<AppState>) -> Json<serde_json::Value> {
    dashboard_descriptor(&state, "overview")
}

/// `GET /dashboard/{*section}`
async fn dashboard_section_page(State(state): State<AppState>, Path(section): Path<String>) -> Json<serde_json::Value> {
    dashboard_descriptor(&state, &section)
}

fn dashboard_descriptor(state: &AppState, section: &str) -> Json<serde_json::Value> {
    let session = state.session.snapshot();
    Json(json!({
        "page": "dashboard",
        "section": section,
        "user": session.user,
        "isGuest": session.is_guest,
    }))
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug)]
pub struct RouteError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message, "code": self.code}))).into_response()
    }
}

fn api_status(e: &ApiError) -> StatusCode {
    match e {
        ApiError::Status { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
        ApiError::Request(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
        ApiError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Backend message when it sent one; transport details stay in the logs.
fn api_message(e: &ApiError) -> String {
    match e {
        ApiError::Status { message, .. } => message.clone(),
        _ => "backend unavailable".to_owned(),
    }
}

impl From<ApiError> for RouteError {
    fn from(e: ApiError) -> Self {
        tracing::warn!(error = %e, "backend call failed");
        Self { status: api_status(&e), code: e.error_code(), message: api_message(&e) }
    }
}

impl From<ConsoleError> for RouteError {
    fn from(e: ConsoleError) -> Self {
        let code = e.error_code();
        match e {
            ConsoleError::Unauthenticated => Self {
                status: StatusCode::UNAUTHORIZED,
                code,
                message: "not authenticated".to_owned(),
            },
            ConsoleError::Api(api) => api.into(),
        }
    }
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_UNAUTHENTICATED",
            Self::GuestLoginDisabled => "E_GUEST_LOGIN_DISABLED",
            Self::LoginFailed(_) => "E_LOGIN_FAILED",
            Self::TokenRejected(_) => "E_TOKEN_REJECTED",
            Self::Api(e) => e.error_code(),
        }
    }
}

impl From<SessionError> for RouteError {
    fn from(e: SessionError) -> Self {
        let code = e.error_code();
        let (status, message) = match &e {
            SessionError::NotAuthenticated => (StatusCode::UNAUTHORIZED, e.to_string()),
            SessionError::GuestLoginDisabled => (StatusCode::FORBIDDEN, e.to_string()),
            SessionError::TokenRejected(_) => (StatusCode::UNAUTHORIZED, "session token rejected".to_owned()),
            SessionError::LoginFailed(api) | SessionError::Api(api) => (api_status(api), api_message(api)),
        };
        Self { status, code, message }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
