//! Cryptographic utilities for reset-token generation and hashing.
//!
//! Password-reset tokens are random, URL-safe strings. Only the SHA-256 hash
//! of a token is persisted; the plaintext is delivered to the user once.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a reset token (32 bytes = 256 bits).
const RESET_TOKEN_BYTES: usize = 32;

/// Generates a random URL-safe reset token.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Computes the SHA-256 hash of the input and returns it as a hex string.
///
/// Used to store reset tokens without keeping the plaintext.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reset_token_is_url_safe() {
        let token = generate_reset_token();
        assert!(!token.is_empty());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_reset_token_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        // SHA-256 of empty string
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("token"), sha256_hex("token"));
        assert_ne!(sha256_hex("token-a"), sha256_hex("token-b"));
    }
}
