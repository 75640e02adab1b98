//! Password hashing
//!
//! Each user gets a random 16-byte salt. The stored hash is SHA-256 applied
//! `HASH_ROUNDS` times over `salt || password`, rendered as 64 hex
//! characters. Both salt and hash are stored in the `users` table.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of SHA-256 iterations
pub const HASH_ROUNDS: u32 = 10_000;

/// Salt length in bytes (32 hex characters when stored)
pub const SALT_LEN: usize = 16;

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Generate a fresh random salt as hex
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Hash a password with the given hex salt
///
/// # Examples
/// ```
/// use anicolle_common::password::{hash_password, verify_password};
///
/// let hash = hash_password("correct horse", "00112233445566778899aabbccddeeff");
/// assert_eq!(hash.len(), 64);
/// assert!(verify_password("correct horse", "00112233445566778899aabbccddeeff", &hash));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

/// Check a candidate password against a stored salt and hash
///
/// Empty stored hashes (unusable passwords) never match.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }
    let calculated = hash_password(password, salt);
    constant_time_eq(calculated.as_bytes(), stored_hash.as_bytes())
}

/// Validate a new password and its confirmation copy
pub fn validate_new_password(password1: &str, password2: &str) -> Result<(), String> {
    if password1 != password2 {
        return Err("the two password fields didn't match".to_string());
    }
    if password1.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must contain at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        return Err("password can't be entirely numeric".to_string());
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_random_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), SALT_LEN * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_deterministic_per_salt() {
        let salt = generate_salt();
        assert_eq!(hash_password("pw-12345", &salt), hash_password("pw-12345", &salt));
        assert_ne!(hash_password("pw-12345", &salt), hash_password("pw-12345", &generate_salt()));
    }

    #[test]
    fn test_verify() {
        let salt = generate_salt();
        let hash = hash_password("secret-pass", &salt);
        assert!(verify_password("secret-pass", &salt, &hash));
        assert!(!verify_password("secret-pasS", &salt, &hash));
        assert!(!verify_password("", &salt, ""));
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password("abcdefgh", "abcdefgh").is_ok());
        assert!(validate_new_password("abcdefgh", "abcdefgi").is_err());
        assert!(validate_new_password("short", "short").is_err());
        assert!(validate_new_password("12345678", "12345678").is_err());
    }
}
