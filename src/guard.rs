//! Routing guard for the dashboard pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs as Axum middleware in front of every route. Only `/login`,
//! `/dashboard` and `/dashboard/*` are matched; everything else passes
//! untouched. A request counts as authenticated only when its
//! `isAuthenticated` marker verifies and belongs to the live session
//! (see [`SessionStore::accepts_marker`]).

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;
use tracing::debug;

use crate::session::SessionStore;
use crate::session::marker::{COOKIE_NAME, MarkerKey};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// Whether the guard applies to `path` at all.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    path == LOGIN_PATH
        || path == DASHBOARD_PATH
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Redirect decision for a request to `path`.
#[must_use]
pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if !is_guarded(path) {
        return GuardDecision::Pass;
    }
    match (path == LOGIN_PATH, authenticated) {
        (true, true) => GuardDecision::Redirect(DASHBOARD_PATH),
        (false, false) => GuardDecision::Redirect(LOGIN_PATH),
        _ => GuardDecision::Pass,
    }
}

/// Axum middleware applying [`decide`] with the marker cookie.
pub async fn enforce(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_guarded(&path) {
        return next.run(request).await;
    }

    let now = OffsetDateTime::now_utc().unix_timestamp();
    let presented = jar.get(COOKIE_NAME).map(|c| c.value().to_owned());
    let authenticated = presented
        .as_deref()
        .is_some_and(|marker| state.session.accepts_marker(&state.config.marker_key, marker, now));

    match decide(&path, authenticated) {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Redirect(target) => {
            debug!(%path, target, authenticated, "guard redirect");
            if presented.is_some() && !authenticated {
                let jar = jar.add(clear_marker_cookie(state.config.cookie_secure));
                return (jar, Redirect::temporary(target)).into_response();
            }
            Redirect::temporary(target).into_response()
        }
    }
}

// =============================================================================
// COOKIES
// =============================================================================

/// Marker cookie for the current session, or `None` when unauthenticated.
#[must_use]
pub fn marker_cookie(session: &SessionStore, key: &MarkerKey, secure: bool) -> Option<Cookie<'static>> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let marker = session.marker(key, now)?;
    Some(
        Cookie::build((COOKIE_NAME, marker))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(time::Duration::seconds(session.marker_max_age_secs()))
            .build(),
    )
}

/// Expired marker cookie, removing it from the browser.
#[must_use]
pub fn clear_marker_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
