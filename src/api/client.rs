//! Typed backend client with mock fallback.
//!
//! DESIGN
//! ======
//! Every admin operation first tries the real backend through the
//! [`Transport`]. On failure:
//!
//! - reads are served from the [`MockStore`] and tagged `Fallback`; they
//!   never return an error, except `get_user` for an id the mock store
//!   does not know either;
//! - writes apply the equivalent mutation to the mock store and are tagged
//!   `Fallback`; when the mock store cannot simulate the effect (unknown id
//!   or title) the original backend error is returned.
//!
//! Auth operations never fall back: a fabricated login would be a second,
//! silent privilege bypass.
//!
//! TRADE-OFFS
//! ==========
//! Falling back on *any* failure keeps the dashboard usable without a
//! backend but masks real backend errors. Every fallback is logged at
//! `warn` with the original error so the masking is visible in logs.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::mock::MockStore;
use super::transport::{ApiRequest, Transport};
use super::types::{
    ApiError, CreateUserInput, LoginRequest, LoginResponse, NewWatchlistEntry, PasswordChange, ProfileUpdate,
    RegisterInput, User, UserPatch, Watchlist, WatchlistCheck,
};
use crate::fetched::Fetched;

#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    mock: MockStore,
}

impl ResilientClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, mock: MockStore) -> Self {
        Self { transport, mock }
    }

    /// The mock dataset backing fallbacks.
    #[must_use]
    pub fn mock(&self) -> &MockStore {
        &self.mock
    }

    // =========================================================================
    // AUTH (no fallback)
    // =========================================================================

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        self.fetch(ApiRequest::post(&["auth", "login"]).json(&body)?)
            .await
    }

    /// `POST /auth/register`. The backend's reply is passed through untyped.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn register(&self, input: &RegisterInput) -> Result<Value, ApiError> {
        self.transport
            .send(ApiRequest::post(&["auth", "register"]).json(input)?)
            .await
    }

    /// `GET /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn profile(&self, token: &str) -> Result<User, ApiError> {
        self.fetch(ApiRequest::get(&["auth", "profile"]).bearer(token))
            .await
    }

    /// `PUT /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.fetch(ApiRequest::put(&["auth", "profile"]).bearer(token).json(update)?)
            .await
    }

    /// `PUT /auth/change-password`.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), ApiError> {
        self.transport
            .send(ApiRequest::put(&["auth", "change-password"]).bearer(token).json(change)?)
            .await?;
        Ok(())
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// `GET /users`, falling back to the mock user list.
    pub async fn list_users(&self, token: &str) -> Fetched<Vec<User>> {
        self.read_or(ApiRequest::get(&["users"]).bearer(token), MockStore::users)
            .await
    }

    /// `GET /users/:id`, falling back to the mock user with that id.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the mock store has no such user either.
    pub async fn get_user(&self, token: &str, id: i64) -> Result<Fetched<User>, ApiError> {
        let id_str = id.to_string();
        let request = ApiRequest::get(&["users", &id_str]).bearer(token);
        self.read_opt(request, |mock| mock.user(id)).await
    }

    /// `POST /users`, falling back to creating the user in the mock store.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the backend accepted the write but replied
    /// with an unexpected body.
    pub async fn create_user(&self, token: &str, input: &CreateUserInput) -> Result<Fetched<User>, ApiError> {
        let request = ApiRequest::post(&["users"]).bearer(token).json(input)?;
        self.write_or(request, decode, |mock| Some(mock.create_user(input)))
            .await
    }

    /// `PUT /users/:id`, falling back to patching the mock user.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the mock store has no such user.
    pub async fn update_user(&self, token: &str, id: i64, patch: &UserPatch) -> Result<Fetched<User>, ApiError> {
        let id_str = id.to_string();
        let request = ApiRequest::put(&["users", &id_str])
            .bearer(token)
            .json(patch)?;
        self.write_or(request, decode, |mock| mock.update_user(id, patch))
            .await
    }

    /// `DELETE /users/:id`, falling back to removing the mock user.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the mock store has no such user.
    pub async fn delete_user(&self, token: &str, id: i64) -> Result<Fetched<()>, ApiError> {
        let id_str = id.to_string();
        let request = ApiRequest::delete(&["users", &id_str]).bearer(token);
        self.write_or(request, ack, |mock| mock.delete_user(id).then_some(()))
            .await
    }

    // =========================================================================
    // WATCHLISTS
    // =========================================================================

    /// `GET /watchlists/my`. `user_id` selects the mock rows on fallback.
    pub async fn my_watchlist(&self, token: &str, user_id: i64) -> Fetched<Vec<Watchlist>> {
        self.read_or(ApiRequest::get(&["watchlists", "my"]).bearer(token), |mock| mock.watchlist_for(user_id))
            .await
    }

    /// `GET /users/:id/watchlist`.
    pub async fn user_watchlist(&self, token: &str, user_id: i64) -> Fetched<Vec<Watchlist>> {
        let id_str = user_id.to_string();
        self.read_or(ApiRequest::get(&["users", &id_str, "watchlist"]).bearer(token), |mock| {
            mock.watchlist_for(user_id)
        })
        .await
    }

    /// `GET /watchlists` (admin view of every entry).
    pub async fn all_watchlists(&self, token: &str) -> Fetched<Vec<Watchlist>> {
        self.read_or(ApiRequest::get(&["watchlists"]).bearer(token), MockStore::all_watchlists)
            .await
    }

    /// `POST /watchlists/my/anime`.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the backend accepted the write but replied
    /// with an unexpected body.
    pub async fn add_to_watchlist(
        &self,
        token: &str,
        user_id: i64,
        entry: &NewWatchlistEntry,
    ) -> Result<Fetched<Watchlist>, ApiError> {
        let request = ApiRequest::post(&["watchlists", "my", "anime"])
            .bearer(token)
            .json(entry)?;
        self.write_or(request, decode, |mock| Some(mock.add_watchlist(user_id, entry)))
            .await
    }

    /// `DELETE /watchlists/my/anime/:title`.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the mock store has no such entry.
    pub async fn remove_from_watchlist(
        &self,
        token: &str,
        user_id: i64,
        anime_title: &str,
    ) -> Result<Fetched<()>, ApiError> {
        let request = ApiRequest::delete(&["watchlists", "my", "anime", anime_title]).bearer(token);
        self.write_or(request, ack, |mock| mock.remove_watchlist(user_id, anime_title).then_some(()))
            .await
    }

    /// `GET /watchlists/my/anime/:title`.
    pub async fn watchlist_contains(&self, token: &str, user_id: i64, anime_title: &str) -> Fetched<bool> {
        let request = ApiRequest::get(&["watchlists", "my", "anime", anime_title]).bearer(token);
        self.read_or(request, |mock| WatchlistCheck { exists: mock.watchlist_contains(user_id, anime_title) })
            .await
            .map(|check| check.exists)
    }

    // =========================================================================
    // FALLBACK PLUMBING
    // =========================================================================

    async fn read_or<T, F>(&self, request: ApiRequest, fallback: F) -> Fetched<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&MockStore) -> T,
    {
        let path = request.path();
        match self.fetch(request).await {
            Ok(payload) => Fetched::Real(payload),
            Err(e) => {
                warn!(error = %e, %path, "backend read failed; serving mock data");
                Fetched::Fallback(fallback(&self.mock))
            }
        }
    }

    /// Like [`Self::read_or`], for lookups the mock store may not satisfy.
    async fn read_opt<T, F>(&self, request: ApiRequest, fallback: F) -> Result<Fetched<T>, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(&MockStore) -> Option<T>,
    {
        let path = request.path();
        match self.fetch(request).await {
            Ok(payload) => Ok(Fetched::Real(payload)),
            Err(e) => match fallback(&self.mock) {
                Some(payload) => {
                    warn!(error = %e, %path, "backend read failed; serving mock data");
                    Ok(Fetched::Fallback(payload))
                }
                None => {
                    warn!(error = %e, %path, "backend read failed; no mock equivalent");
                    Err(e)
                }
            },
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let value = self.transport.send(request).await?;
        decode(value)
    }

    /// Transport failures trigger the mock fallback; a successful call with
    /// an undecodable body does not, since the backend may have applied it.
    async fn write_or<T, D, F>(&self, request: ApiRequest, decode: D, fallback: F) -> Result<Fetched<T>, ApiError>
    where
        D: FnOnce(Value) -> Result<T, ApiError>,
        F: FnOnce(&MockStore) -> Option<T>,
    {
        let path = request.path();
        let method = request.method.clone();
        match self.transport.send(request).await {
            Ok(value) => decode(value).map(Fetched::Real),
            Err(e) => match fallback(&self.mock) {
                Some(payload) => {
                    warn!(error = %e, %method, %path, "backend call failed; applied to mock store");
                    Ok(Fetched::Fallback(payload))
                }
                None => {
                    warn!(error = %e, %method, %path, "backend call failed; mock store cannot simulate it");
                    Err(e)
                }
            },
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[allow(clippy::unnecessary_wraps)]
fn ack(_: Value) -> Result<(), ApiError> {
    Ok(())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
