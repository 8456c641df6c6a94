//! Credential hashing. Invoked by the services whenever a password is set
//! or changed, never by route handlers, and never skipped.
//!
//! Plaintext length limits are enforced upstream by user validation; this
//! module only hashes and verifies.

use anyhow::{anyhow, Result};
use bcrypt::DEFAULT_COST;

/// One-way, salted hash of a plaintext password.
pub fn hash(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, DEFAULT_COST).map_err(|e| anyhow!("password hashing failed: {}", e))
}

/// Check a plaintext candidate against a stored digest. A digest that fails
/// to parse counts as a non-match, not an error.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_never_equals_plaintext() {
        let digest = hash("Secret1x").unwrap();
        assert_ne!(digest, "Secret1x");
        assert!(digest.starts_with("$2"));
    }

    #[test]
    fn verify_accepts_the_original_password() {
        let digest = hash("Secret1x").unwrap();
        assert!(verify("Secret1x", &digest));
    }

    #[test]
    fn verify_rejects_a_wrong_password() {
        let digest = hash("Secret1x").unwrap();
        assert!(!verify("secret1x", &digest));
        assert!(!verify("", &digest));
    }

    #[test]
    fn verify_rejects_a_garbage_digest() {
        assert!(!verify("Secret1x", "not-a-bcrypt-digest"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash("Secret1x").unwrap();
        let b = hash("Secret1x").unwrap();
        assert_ne!(a, b);
        assert!(verify("Secret1x", &a) && verify("Secret1x", &b));
    }
}
