//! In-memory mock dataset used when the REST backend is unreachable.
//!
//! DESIGN
//! ======
//! The store is seeded with a fixed set of users and watchlist entries and
//! then mutated by the client's write fallbacks, so the dashboard stays
//! consistent with itself for the lifetime of the process. Nothing is
//! persisted; a restart reseeds.
//!
//! The mutex is only ever held for synchronous work, never across an await.

use std::sync::{Arc, Mutex, MutexGuard};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::types::{CreateUserInput, NewWatchlistEntry, Role, User, UserPatch, Watchlist};

/// First id handed out to a mock-created user is `MOCK_USER_ID_FLOOR + 1`.
pub const MOCK_USER_ID_FLOOR: i64 = 1000;
pub const DEFAULT_PROFILE_URL: &str = "/placeholder-user.jpg";

/// Cheap-to-clone handle over the shared mock dataset.
#[derive(Clone)]
pub struct MockStore {
    inner: Arc<Mutex<MockData>>,
}

struct MockData {
    users: Vec<User>,
    watchlists: Vec<Watchlist>,
    last_user_id: i64,
}

impl MockStore {
    /// Store seeded with the default dataset.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_data(seed_users(), seed_watchlists())
    }

    #[must_use]
    pub fn with_data(users: Vec<User>, watchlists: Vec<Watchlist>) -> Self {
        let last_user_id = users
            .iter()
            .map(|u| u.id)
            .max()
            .unwrap_or(0)
            .max(MOCK_USER_ID_FLOOR);
        Self { inner: Arc::new(Mutex::new(MockData { users, watchlists, last_user_id })) }
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // users
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    #[must_use]
    pub fn user(&self, id: i64) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == id).cloned()
    }

    /// Insert a user built from `input`. The password is dropped.
    pub fn create_user(&self, input: &CreateUserInput) -> User {
        let mut data = self.lock();
        data.last_user_id += 1;
        let user = User {
            id: data.last_user_id,
            username: input.username.clone(),
            email: input.email.clone(),
            profile_url: Some(
                input
                    .profile_url
                    .clone()
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| DEFAULT_PROFILE_URL.to_owned()),
            ),
            created_at: now_rfc3339(),
            role: input.role,
        };
        data.users.push(user.clone());
        user
    }

    /// Apply `patch` to the user with `id`. `None` if no such user.
    pub fn update_user(&self, id: i64, patch: &UserPatch) -> Option<User> {
        let mut data = self.lock();
        let user = data.users.iter_mut().find(|u| u.id == id)?;
        patch.apply(user);
        Some(user.clone())
    }

    /// Remove the user with `id`. Returns whether a user was removed.
    pub fn delete_user(&self, id: i64) -> bool {
        let mut data = self.lock();
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        data.users.len() != before
    }

    // -------------------------------------------------------------------------
    // watchlists
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn all_watchlists(&self) -> Vec<Watchlist> {
        self.lock().watchlists.clone()
    }

    #[must_use]
    pub fn watchlist_for(&self, user_id: i64) -> Vec<Watchlist> {
        self.lock()
            .watchlists
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn add_watchlist(&self, user_id: i64, entry: &NewWatchlistEntry) -> Watchlist {
        let mut data = self.lock();
        let next_id = data.watchlists.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let row = Watchlist {
            id: next_id,
            user_id,
            anime_title: entry.anime_title.clone(),
            img_url: entry.img_url.clone(),
            anime_type: entry.anime_type.clone(),
        };
        data.watchlists.push(row.clone());
        row
    }

    /// Remove the first entry matching `user_id` + `anime_title`.
    pub fn remove_watchlist(&self, user_id: i64, anime_title: &str) -> bool {
        let mut data = self.lock();
        let Some(idx) = data
            .watchlists
            .iter()
            .position(|w| w.user_id == user_id && w.anime_title == anime_title)
        else {
            return false;
        };
        data.watchlists.remove(idx);
        true
    }

    #[must_use]
    pub fn watchlist_contains(&self, user_id: i64, anime_title: &str) -> bool {
        self.lock()
            .watchlists
            .iter()
            .any(|w| w.user_id == user_id && w.anime_title == anime_title)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::seeded()
    }
}

// =============================================================================
// SEED DATA
// =============================================================================

fn seed_user(id: i64, username: &str, email: &str, role: Role, created_at: &str) -> User {
    User {
        id,
        username: username.to_owned(),
        email: email.to_owned(),
        profile_url: Some(DEFAULT_PROFILE_URL.to_owned()),
        role,
        created_at: created_at.to_owned(),
    }
}

fn seed_users() -> Vec<User> {
    vec![
        seed_user(1, "admin", "admin@example.com", Role::Admin, "2024-01-01T00:00:00Z"),
        seed_user(2, "johndoe", "john@example.com", Role::User, "2024-03-01T00:00:00Z"),
        seed_user(3, "janedoe", "jane@example.com", Role::User, "2024-03-31T00:00:00Z"),
    ]
}

fn seed_watchlists() -> Vec<Watchlist> {
    let row = |id, user_id, title: &str, img: &str| Watchlist {
        id,
        user_id,
        anime_title: title.to_owned(),
        img_url: img.to_owned(),
        anime_type: "TV".to_owned(),
    };
    vec![
        row(1, 2, "Attack on Titan", "/armored-titan-battle.png"),
        row(2, 2, "Demon Slayer", "/demon-slayer-inspired.png"),
        row(3, 3, "Jujutsu Kaisen", "/jujutsu-kaisen-inspired.png"),
    ]
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
