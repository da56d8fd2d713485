//! Signed authentication marker read by the routing guard.
//!
//! FORMAT
//! ======
//! `{fingerprint}.{expires_unix}.{mac_hex}` where `fingerprint` is the first
//! 16 hex chars of SHA-256(token) and `mac_hex` is HMAC-SHA256 over
//! `{fingerprint}.{expires_unix}`. The token itself never leaves the process.
//!
//! The marker is only a claim. The guard additionally compares the
//! fingerprint with the live session, so logging out invalidates every
//! marker issued before it.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::token::bytes_to_hex;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "isAuthenticated";
const FINGERPRINT_LEN: usize = 16;

/// Claims carried by a verified marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClaims {
    pub fingerprint: String,
    pub expires_at: i64,
}

/// HMAC key for issuing and verifying markers. Keyed once; each use clones the keyed state.
#[derive(Clone)]
pub struct MarkerKey {
    mac: HmacSha256,
}

impl MarkerKey {
    /// # Errors
    ///
    /// Returns [`InvalidLength`] if the HMAC implementation rejects the key.
    pub fn new(secret: &[u8]) -> Result<Self, InvalidLength> {
        Ok(Self { mac: HmacSha256::new_from_slice(secret)? })
    }

    /// Issue a marker for `token`, valid until `expires_at` (unix seconds).
    #[must_use]
    pub fn issue(&self, token: &str, expires_at: i64) -> String {
        let payload = format!("{}.{expires_at}", fingerprint(token));
        let mac = self.sign(&payload);
        format!("{payload}.{mac}")
    }

    /// Verify signature and expiry. `None` for anything malformed, forged, or stale.
    #[must_use]
    pub fn verify(&self, marker: &str, now: i64) -> Option<MarkerClaims> {
        let (payload, mac_hex) = marker.rsplit_once('.')?;
        let (fp, expires) = payload.split_once('.')?;
        if fp.len() != FINGERPRINT_LEN || !fp.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expires_at = expires.parse::<i64>().ok()?;

        let mac_bytes = hex_to_bytes(mac_hex)?;
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&mac_bytes).ok()?;

        if expires_at <= now {
            return None;
        }
        Some(MarkerClaims { fingerprint: fp.to_owned(), expires_at })
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        bytes_to_hex(&mac.finalize().into_bytes())
    }
}

/// Short, non-reversible token identifier embedded in markers.
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = bytes_to_hex(&digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
#[path = "marker_test.rs"]
mod tests;
