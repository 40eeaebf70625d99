//! Password hashing (Argon2id, PHC string format).
//!
//! The hash is an opaque one-way function as far as the rest of the server
//! is concerned: [`hash`] at registration, [`verify`] at login, and the
//! stored string never leaves the database layer.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash `password` with a freshly generated random salt.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a stored PHC hash string.
///
/// An unparseable hash verifies as `false` rather than erroring: from the
/// caller's point of view a corrupt stored hash is just a failed login.
pub fn verify(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip_verifies() {
        let hashed = hash("hunter2").unwrap();
        assert!(verify("hunter2", &hashed));
    }

    #[test]
    fn wrong_password_fails() {
        let hashed = hash("hunter2").unwrap();
        assert!(!verify("hunter3", &hashed));
    }

    #[test]
    fn salts_are_unique() {
        assert_ne!(hash("hunter2").unwrap(), hash("hunter2").unwrap());
    }

    #[test]
    fn corrupt_hash_fails_closed() {
        assert!(!verify("hunter2", "not-a-phc-string"));
    }
}
