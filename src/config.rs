//! Gateway configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (when present) and then builds a typed [`Config`]
//! once at startup. Everything downstream receives plain values, so tests
//! can construct a `Config` directly without touching the environment.

use std::path::PathBuf;

use rand::Rng;

use crate::session::marker::MarkerKey;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_CONTENT_FEED_BASE_URL: &str = "https://api-consumet-nu.vercel.app";
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MARKER_MAX_AGE_SECS: i64 = 86_400;
pub const MAX_MARKER_MAX_AGE_SECS: i64 = 30 * 86_400;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("unusable MARKER_SECRET: {0}")]
    MarkerKey(#[from] hmac::digest::InvalidLength),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub api_base_url: String,
    pub content_feed_base_url: String,
    pub timeouts: HttpTimeouts,
    pub marker_key: MarkerKey,
    pub marker_max_age_secs: i64,
    pub cookie_secure: bool,
    /// Local-only admin bypass. Kept for demos; every use is logged.
    pub guest_login_enabled: bool,
    /// Token file standing in for browser local storage. `None` keeps the
    /// token in memory only.
    pub session_file: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("api_base_url", &self.api_base_url)
            .field("content_feed_base_url", &self.content_feed_base_url)
            .field("timeouts", &self.timeouts)
            .field("marker_max_age_secs", &self.marker_max_age_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("guest_login_enabled", &self.guest_login_enabled)
            .field("session_file", &self.session_file)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `API_BASE_URL`: REST backend, default `http://localhost:3001`
    /// - `CONTENT_FEED_BASE_URL`: anime metadata feed
    /// - `HTTP_REQUEST_TIMEOUT_SECS` / `HTTP_CONNECT_TIMEOUT_SECS`: at most 600
    /// - `MARKER_SECRET`: HMAC key for the guard cookie; random per process when absent
    /// - `MARKER_MAX_AGE_SECS`: default 86400, at most 30 days
    /// - `COOKIE_SECURE`, `GUEST_LOGIN_ENABLED`: booleans
    /// - `SESSION_FILE`: path of the persisted token
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT`, a duration, or a boolean flag is present
    /// but malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let marker_key = match std::env::var("MARKER_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => MarkerKey::new(secret.as_bytes())?,
            _ => {
                tracing::warn!("MARKER_SECRET not set; using a per-process random key (markers die on restart)");
                let bytes: [u8; 32] = rand::rng().random();
                MarkerKey::new(&bytes)?
            }
        };

        Ok(Self {
            port,
            api_base_url: base_url_from_env("API_BASE_URL", DEFAULT_API_BASE_URL),
            content_feed_base_url: base_url_from_env("CONTENT_FEED_BASE_URL", DEFAULT_CONTENT_FEED_BASE_URL),
            timeouts: HttpTimeouts {
                request_secs: env_secs("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS)?,
                connect_secs: env_secs("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS)?,
            },
            marker_key,
            marker_max_age_secs: env_secs("MARKER_MAX_AGE_SECS", DEFAULT_MARKER_MAX_AGE_SECS, MAX_MARKER_MAX_AGE_SECS)?,
            cookie_secure: env_flag("COOKIE_SECURE", false)?,
            guest_login_enabled: env_flag("GUEST_LOGIN_ENABLED", true)?,
            session_file: std::env::var("SESSION_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|raw| parse_bool(&raw))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => env_bool(key).ok_or(ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// A positive number of seconds no greater than `max`; `default` when unset.
fn env_secs<T>(key: &'static str, default: T, max: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
{
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(secs) if secs >= T::from(1) && secs <= max => Ok(secs),
        _ => Err(ConfigError::Invalid { var: key, value: raw }),
    }
}

fn base_url_from_env(key: &str, default: &str) -> String {
    normalize_base_url(&std::env::var(key).unwrap_or_else(|_| default.to_owned()))
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
