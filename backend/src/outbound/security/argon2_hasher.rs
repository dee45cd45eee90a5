//! Argon2 implementation of the password hashing port.

use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher as _};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher producing self-describing PHC strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| PasswordHashError::hash(format!("stored hash unreadable: {err}")))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("secret1").expect("hash succeeds");
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("secret1", &hash).expect("verify succeeds"));
        assert!(!hasher.verify("other", &hash).expect("verify succeeds"));
    }

    #[test]
    fn garbage_hashes_error_rather_than_match() {
        let hasher = Argon2PasswordHasher;
        let err = hasher
            .verify("secret1", "not-a-phc-string")
            .expect_err("unreadable hash fails");
        assert!(err.to_string().contains("stored hash unreadable"));
    }
}
