//! Token persistence: the gateway's stand-in for browser local storage.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures are never fatal. An unreadable or corrupt file is logged
//! and treated as "no stored token"; a failed write is logged and the
//! in-process session carries on without persistence.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub is_guest: bool,
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<StoredToken>;
    fn save(&self, stored: &StoredToken);
    fn clear(&self);
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `stored`, as if a previous run had saved it.
    #[must_use]
    pub fn with_token(stored: StoredToken) -> Self {
        Self { slot: Mutex::new(Some(stored)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<StoredToken> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn save(&self, stored: &StoredToken) {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(stored.clone());
    }

    fn clear(&self) {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON file holding a single [`StoredToken`].
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<StoredToken> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "session file unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "session file corrupt; ignoring");
                None
            }
        }
    }

    fn save(&self, stored: &StoredToken) {
        let result = serde_json::to_string(stored)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(&self.path, json));
        if let Err(e) = result {
            warn!(error = %e, path = %self.path.display(), "failed to persist session token");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %self.path.display(), "failed to remove session file"),
        }
    }
}
