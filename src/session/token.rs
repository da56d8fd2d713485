//! Random token generation.

use std::fmt::Write;

use rand::Rng;

pub const GUEST_TOKEN_PREFIX: &str = "guest-";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 16-byte hex token carrying the guest prefix.
#[must_use]
pub fn generate_guest_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    format!("{GUEST_TOKEN_PREFIX}{}", bytes_to_hex(&bytes))
}

#[must_use]
pub fn is_guest_token(token: &str) -> bool {
    token.starts_with(GUEST_TOKEN_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_hex_leading_zero() {
        assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
    }

    #[test]
    fn bytes_to_hex_empty() {
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn guest_token_has_prefix_and_random_tail() {
        let a = generate_guest_token();
        let b = generate_guest_token();
        assert!(is_guest_token(&a));
        assert_eq!(a.len(), GUEST_TOKEN_PREFIX.len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn backend_tokens_are_not_guest() {
        assert!(!is_guest_token("eyJhbGciOi.payload.sig"));
    }
}
