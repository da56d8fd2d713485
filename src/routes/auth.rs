//! Auth routes: login, guest login, logout, profile, and the marker cookie.
//!
//! Every handler that changes the session also rewrites the
//! `isAuthenticated` cookie, so the guard marker follows session state.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RouteError;
use crate::api::types::{PasswordChange, ProfileUpdate, RegisterInput, User};
use crate::guard;
use crate::session::Session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
}

/// Session as exposed to the browser. The token stays server-side.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(flatten)]
    pub session: Session,
}

fn session_view(state: &AppState) -> Json<SessionView> {
    let session = state.session.snapshot();
    Json(SessionView { authenticated: session.is_authenticated(), session })
}

fn with_marker(state: &AppState, jar: CookieJar) -> CookieJar {
    match guard::marker_cookie(&state.session, &state.config.marker_key, state.config.cookie_secure) {
        Some(cookie) => jar.add(cookie),
        None => jar.add(guard::clear_marker_cookie(state.config.cookie_secure)),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: credential login; sets the marker cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<SessionView>), RouteError> {
    state.session.login(&body.email, &body.password).await?;
    Ok((with_marker(&state, jar), session_view(&state)))
}

/// `POST /api/auth/guest`: local admin session with no backend check.
pub async fn guest(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Json<SessionView>), RouteError> {
    state.session.guest_login()?;
    Ok((with_marker(&state, jar), session_view(&state)))
}

/// `POST /api/auth/logout`: drop the session and clear the marker.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    state.session.logout();
    let jar = jar.add(guard::clear_marker_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/session`: current session snapshot.
pub async fn session(State(state): State<AppState>) -> Json<SessionView> {
    session_view(&state)
}

/// `GET /api/auth/profile`: fresh profile through the session, so a
/// rejected token signs the session out.
pub async fn profile(State(state): State<AppState>) -> Result<Json<User>, RouteError> {
    Ok(Json(state.session.refresh_profile().await?))
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, RouteError> {
    let user = state
        .session
        .update_profile(&update.username, update.profile_url)
        .await?;
    Ok(Json(user))
}

/// `PUT /api/auth/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    Json(change): Json<PasswordChange>,
) -> Result<StatusCode, RouteError> {
    state
        .session
        .change_password(&change.old_password, &change.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/register`: admin-side account creation.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), RouteError> {
    let created = state.console.register(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
