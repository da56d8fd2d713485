//! Process-wide authentication session.
//!
//! DESIGN
//! ======
//! [`SessionStore`] is the single owner of the session lifecycle. State
//! lives in a `watch` channel so consumers can subscribe to transitions;
//! user-facing notices (toasts) go out on a `broadcast` channel. Mutation
//! only happens through the store's methods.
//!
//! The guard marker is derived from this state on demand rather than kept
//! as a second flag, and [`SessionStore::accepts_marker`] checks a presented
//! marker against the live token. There is no way for the two views to
//! disagree for longer than one request.
//!
//! GUEST LOGIN
//! ===========
//! `guest_login` fabricates an admin session with no backend verification.
//! It is a deliberate demo backdoor: gated by config, marked `is_guest`,
//! and logged at `warn` on every use.

pub mod marker;
pub mod storage;
pub mod token;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::api::mock::{DEFAULT_PROFILE_URL, now_rfc3339};
use crate::api::types::{ApiError, PasswordChange, ProfileUpdate, Role, User};
use crate::api::ResilientClient;
use marker::MarkerKey;
use storage::{StoredToken, TokenStore};

pub const GUEST_USER_ID: i64 = 999_999;
const NOTICE_CAPACITY: usize = 32;

// =============================================================================
// STATE
// =============================================================================

/// Snapshot of the session. The token is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip)]
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_guest: bool,
    pub is_loading: bool,
}

impl Session {
    /// True iff both a token and a user profile are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Token + user id handed to authenticated calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("guest login is disabled")]
    GuestLoginDisabled,
    #[error("login failed: {0}")]
    LoginFailed(ApiError),
    #[error("session token rejected: {0}")]
    TokenRejected(ApiError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub guest_login_enabled: bool,
    pub marker_max_age_secs: i64,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: ResilientClient,
    storage: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
    notices: broadcast::Sender<Notice>,
    options: SessionOptions,
}

impl SessionStore {
    #[must_use]
    pub fn new(client: ResilientClient, storage: Arc<dyn TokenStore>, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(Session::default());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { inner: Arc::new(SessionInner { client, storage, state, notices, options }) }
    }

    // -------------------------------------------------------------------------
    // observation
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// Token and user id for an authenticated call. Never touches the network.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] unless both token and user are present.
    pub fn credentials(&self) -> Result<Credentials, SessionError> {
        let state = self.inner.state.borrow();
        match (&state.token, &state.user) {
            (Some(token), Some(user)) => Ok(Credentials { token: token.clone(), user_id: user.id }),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    // -------------------------------------------------------------------------
    // guard marker
    // -------------------------------------------------------------------------

    /// Issue a guard marker for the current session, valid for the configured max age.
    ///
    /// `None` when unauthenticated, or when the max age is not positive or
    /// pushes the expiry past `i64::MAX`.
    #[must_use]
    pub fn marker(&self, key: &MarkerKey, now: i64) -> Option<String> {
        let max_age = self.inner.options.marker_max_age_secs;
        if max_age <= 0 {
            warn!(max_age, "marker max age is not positive; no marker issued");
            return None;
        }
        let expires_at = now.checked_add(max_age)?;
        let state = self.inner.state.borrow();
        if !state.is_authenticated() {
            return None;
        }
        let token = state.token.as_deref()?;
        Some(key.issue(token, expires_at))
    }

    #[must_use]
    pub fn marker_max_age_secs(&self) -> i64 {
        self.inner.options.marker_max_age_secs
    }

    /// Whether `marker` is authentic, unexpired, and issued for the live session.
    #[must_use]
    pub fn accepts_marker(&self, key: &MarkerKey, marker: &str, now: i64) -> bool {
        let Some(claims) = key.verify(marker, now) else {
            return false;
        };
        let state = self.inner.state.borrow();
        match (&state.token, state.is_authenticated()) {
            (Some(token), true) => marker::fingerprint(token) == claims.fingerprint,
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // lifecycle
    // -------------------------------------------------------------------------

    /// Resume a session from the token store (the page-load path).
    ///
    /// Guest tokens are discarded: the backend cannot verify them.
    pub async fn restore(&self) -> Option<User> {
        let stored = self.inner.storage.load()?;
        if stored.is_guest || token::is_guest_token(&stored.token) {
            info!("discarding stored guest session");
            self.inner.storage.clear();
            return None;
        }

        self.inner.state.send_modify(|s| {
            s.token = Some(stored.token.clone());
            s.user = None;
            s.is_guest = false;
        });
        match self.load_profile(&stored.token).await {
            Ok(user) => {
                info!(user_id = user.id, "session restored");
                Some(user)
            }
            Err(_) => None,
        }
    }

    /// Exchange credentials for a token, then load the profile.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LoginFailed`] if the backend rejects the
    /// credentials, or [`SessionError::TokenRejected`] if the profile fetch
    /// fails. Either way the session is left unauthenticated.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.set_loading(true);
        let token = match self.inner.client.login(email, password).await {
            Ok(resp) => resp.token,
            Err(e) => {
                self.set_loading(false);
                warn!(error = %e, "login failed");
                self.notify(NoticeLevel::Error, "Login failed", &e.to_string());
                return Err(SessionError::LoginFailed(e));
            }
        };

        self.inner.storage.save(&StoredToken { token: token.clone(), is_guest: false });
        self.inner.state.send_modify(|s| {
            s.token = Some(token.clone());
            s.user = None;
            s.is_guest = false;
        });

        match self.load_profile(&token).await {
            Ok(user) => {
                info!(user_id = user.id, "login succeeded");
                self.notify(NoticeLevel::Info, "Login successful", "Welcome back!");
                Ok(user)
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, "Login failed", &e.to_string());
                Err(e)
            }
        }
    }

    /// Fabricate a local admin session without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::GuestLoginDisabled`] when turned off in config.
    pub fn guest_login(&self) -> Result<User, SessionError> {
        if !self.inner.options.guest_login_enabled {
            self.notify(NoticeLevel::Error, "Guest login failed", "Guest login is disabled");
            return Err(SessionError::GuestLoginDisabled);
        }

        let token = token::generate_guest_token();
        let user = guest_user();
        warn!(user_id = user.id, "guest login: granting admin role without backend verification");

        self.inner.storage.save(&StoredToken { token: token.clone(), is_guest: true });
        self.inner.state.send_replace(Session {
            token: Some(token),
            user: Some(user.clone()),
            is_guest: true,
            is_loading: false,
        });
        self.notify(NoticeLevel::Info, "Guest login successful", "Welcome! You have full admin access as a guest user.");
        Ok(user)
    }

    /// Drop all session state and the stored token.
    pub fn logout(&self) {
        self.inner.storage.clear();
        self.inner.state.send_replace(Session::default());
        info!("logged out");
        self.notify(NoticeLevel::Info, "Logged out", "You have been logged out successfully");
    }

    /// Re-fetch the current user's profile (`GET /auth/profile`).
    ///
    /// Guest sessions answer with their local user; the backend cannot
    /// verify a guest token. A rejection clears the session like any other
    /// profile load.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without a network call when
    /// signed out, or [`SessionError::TokenRejected`] if the backend refuses
    /// the token.
    pub async fn refresh_profile(&self) -> Result<User, SessionError> {
        let current = self.snapshot();
        let (Some(token), Some(user)) = (current.token, current.user) else {
            return Err(SessionError::NotAuthenticated);
        };
        if current.is_guest {
            return Ok(user);
        }
        self.load_profile(&token).await
    }

    /// `PUT /auth/profile` for the current user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without a network call when
    /// there is no token, or the backend error.
    pub async fn update_profile(&self, username: &str, profile_url: Option<String>) -> Result<User, SessionError> {
        let token = self.require_token("You must be logged in to update your profile")?;
        self.set_loading(true);
        let update = ProfileUpdate { username: username.to_owned(), profile_url };
        match self.inner.client.update_profile(&token, &update).await {
            Ok(user) => {
                self.inner.state.send_if_modified(|s| {
                    if s.token.as_deref() != Some(token.as_str()) {
                        return false;
                    }
                    s.user = Some(user.clone());
                    s.is_loading = false;
                    true
                });
                self.notify(NoticeLevel::Info, "Profile updated", "Your profile has been updated successfully");
                Ok(user)
            }
            Err(e) => {
                self.set_loading(false);
                warn!(error = %e, "profile update failed");
                self.notify(NoticeLevel::Error, "Update failed", &e.to_string());
                Err(SessionError::Api(e))
            }
        }
    }

    /// `PUT /auth/change-password` for the current user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without a network call when
    /// there is no token, or the backend error.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<(), SessionError> {
        let token = self.require_token("You must be logged in to change your password")?;
        self.set_loading(true);
        let change = PasswordChange { old_password: old_password.to_owned(), new_password: new_password.to_owned() };
        let result = self.inner.client.change_password(&token, &change).await;
        self.set_loading(false);
        match result {
            Ok(()) => {
                self.notify(NoticeLevel::Info, "Password changed", "Your password has been changed successfully");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "password change failed");
                self.notify(NoticeLevel::Error, "Password change failed", &e.to_string());
                Err(SessionError::Api(e))
            }
        }
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    /// Fetch the profile for `token`. A rejection clears the token, treating
    /// it as invalid or expired. A result for a token that is no longer
    /// current (logout or a newer login raced it) is discarded.
    async fn load_profile(&self, token: &str) -> Result<User, SessionError> {
        self.set_loading(true);
        match self.inner.client.profile(token).await {
            Ok(user) => {
                let applied = self.inner.state.send_if_modified(|s| {
                    if s.token.as_deref() != Some(token) {
                        return false;
                    }
                    s.user = Some(user.clone());
                    s.is_loading = false;
                    true
                });
                if applied { Ok(user) } else { Err(SessionError::NotAuthenticated) }
            }
            Err(e) => {
                warn!(error = %e, "profile fetch rejected; clearing token");
                let cleared = self.inner.state.send_if_modified(|s| {
                    if s.token.as_deref() != Some(token) {
                        return false;
                    }
                    *s = Session::default();
                    true
                });
                if cleared {
                    self.inner.storage.clear();
                }
                Err(SessionError::TokenRejected(e))
            }
        }
    }

    fn require_token(&self, description: &str) -> Result<String, SessionError> {
        let token = self.inner.state.borrow().token.clone();
        token.ok_or_else(|| {
            self.notify(NoticeLevel::Error, "Authentication error", description);
            SessionError::NotAuthenticated
        })
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_if_modified(|s| {
            if s.is_loading == loading {
                return false;
            }
            s.is_loading = loading;
            true
        });
    }

    fn notify(&self, level: NoticeLevel, title: &str, description: &str) {
        match level {
            NoticeLevel::Info => info!(title, description, "notice"),
            NoticeLevel::Error => warn!(title, description, "notice"),
        }
        // No subscribers is fine; notices are transient.
        let _ = self.inner.notices.send(Notice {
            title: title.to_owned(),
            description: description.to_owned(),
            level,
        });
    }
}

fn guest_user() -> User {
    User {
        id: GUEST_USER_ID,
        username: "Guest Admin".to_owned(),
        email: "guest@admin.com".to_owned(),
        profile_url: Some(DEFAULT_PROFILE_URL.to_owned()),
        role: Role::Admin,
        created_at: now_rfc3339(),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
