//! Password hashing and verification.
//!
//! Stored hashes use the format `salt$digest`, where both parts are
//! hex-encoded and the digest is SHA-256 over `salt || password`.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;

/// Hashes a password with a freshly generated random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

/// Verifies a password against a stored `salt$digest` hash.
///
/// Returns `false` for malformed stored hashes; the comparison itself is
/// constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    let actual = digest_with_salt(&salt, password);
    actual.ct_eq(expected.as_slice()).into()
}

fn digest_with_salt(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_unique_salts() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }

    #[test]
    fn test_malformed_stored_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", "zz$zz"));
        assert!(!verify_password("anything", ""));
    }
}
