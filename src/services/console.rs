//! Admin console: session-gated access to users and watchlists.
//!
//! DESIGN
//! ======
//! Every operation resolves [`Credentials`] from the [`SessionStore`] first.
//! A logged-out console fails with [`ConsoleError::Unauthenticated`] before
//! any request is built, so there is no network attempt and no fallback.
//! Once credentials exist, the [`ResilientClient`] fallback policy applies
//! unchanged, and "my watchlist" mock fallbacks act on the session user.

use serde_json::Value;

use super::ErrorCode;
use crate::api::ResilientClient;
use crate::api::types::{ApiError, CreateUserInput, NewWatchlistEntry, RegisterInput, User, UserPatch, Watchlist};
use crate::fetched::Fetched;
use crate::session::{Credentials, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ErrorCode for ConsoleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::Api(e) => e.error_code(),
        }
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_BACKEND_UNREACHABLE",
            Self::Status { .. } => "E_BACKEND_REJECTED",
            Self::Decode(_) => "E_BACKEND_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT",
        }
    }
}

#[derive(Clone)]
pub struct AdminConsole {
    session: SessionStore,
    client: ResilientClient,
}

impl AdminConsole {
    #[must_use]
    pub fn new(session: SessionStore, client: ResilientClient) -> Self {
        Self { session, client }
    }

    fn credentials(&self) -> Result<Credentials, ConsoleError> {
        self.session
            .credentials()
            .map_err(|_| ConsoleError::Unauthenticated)
    }

    // -------------------------------------------------------------------------
    // account
    // -------------------------------------------------------------------------

    /// Register a new account from the admin console. No fallback.
    ///
    /// # Errors
    ///
    /// Unauthenticated, or the backend error.
    pub async fn register(&self, input: &RegisterInput) -> Result<Value, ConsoleError> {
        self.credentials()?;
        Ok(self.client.register(input).await?)
    }

    // -------------------------------------------------------------------------
    // users
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Unauthenticated only; backend failures fall back to mock users.
    pub async fn list_users(&self) -> Result<Fetched<Vec<User>>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.list_users(&creds.token).await)
    }

    /// # Errors
    ///
    /// Unauthenticated, or the backend error when no mock user has `id`.
    pub async fn get_user(&self, id: i64) -> Result<Fetched<User>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.get_user(&creds.token, id).await?)
    }

    /// # Errors
    ///
    /// Unauthenticated, or a decode error on a malformed backend reply.
    pub async fn create_user(&self, input: &CreateUserInput) -> Result<Fetched<User>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.create_user(&creds.token, input).await?)
    }

    /// # Errors
    ///
    /// Unauthenticated, or the backend error when the mock store cannot apply the patch.
    pub async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Fetched<User>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.update_user(&creds.token, id, patch).await?)
    }

    /// # Errors
    ///
    /// Unauthenticated, or the backend error when the mock store has no such user.
    pub async fn delete_user(&self, id: i64) -> Result<Fetched<()>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.delete_user(&creds.token, id).await?)
    }

    // -------------------------------------------------------------------------
    // watchlists
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Unauthenticated only.
    pub async fn my_watchlist(&self) -> Result<Fetched<Vec<Watchlist>>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.my_watchlist(&creds.token, creds.user_id).await)
    }

    /// # Errors
    ///
    /// Unauthenticated only.
    pub async fn user_watchlist(&self, user_id: i64) -> Result<Fetched<Vec<Watchlist>>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.user_watchlist(&creds.token, user_id).await)
    }

    /// # Errors
    ///
    /// Unauthenticated only.
    pub async fn all_watchlists(&self) -> Result<Fetched<Vec<Watchlist>>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self.client.all_watchlists(&creds.token).await)
    }

    /// # Errors
    ///
    /// Unauthenticated, or a decode error on a malformed backend reply.
    pub async fn add_to_watchlist(&self, entry: &NewWatchlistEntry) -> Result<Fetched<Watchlist>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self
            .client
            .add_to_watchlist(&creds.token, creds.user_id, entry)
            .await?)
    }

    /// # Errors
    ///
    /// Unauthenticated, or the backend error when the title is not on the mock list.
    pub async fn remove_from_watchlist(&self, anime_title: &str) -> Result<Fetched<()>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self
            .client
            .remove_from_watchlist(&creds.token, creds.user_id, anime_title)
            .await?)
    }

    /// # Errors
    ///
    /// Unauthenticated only.
    pub async fn watchlist_contains(&self, anime_title: &str) -> Result<Fetched<bool>, ConsoleError> {
        let creds = self.credentials()?;
        Ok(self
            .client
            .watchlist_contains(&creds.token, creds.user_id, anime_title)
            .await)
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
