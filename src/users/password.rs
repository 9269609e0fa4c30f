//! Password storage. Only the PHC string (algorithm, params, salt and digest)
//! is ever persisted.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::ApiError;

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(hash_failure)
}

/// `Ok(false)` on a wrong password. Errors only when `stored` is not a
/// usable PHC string.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored).map_err(hash_failure)?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hash_failure(e)),
    }
}

fn hash_failure(e: password_hash::Error) -> ApiError {
    error!(error = %e, "argon2 failure");
    ApiError::Hash(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_is_phc_and_verifies() {
        let stored = hash_password("secret").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("secret"));
        assert!(verify_password("secret", &stored).unwrap());
    }

    #[test]
    fn each_hash_gets_its_own_salt() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_an_error() {
        let stored = hash_password("correct-horse").unwrap();
        assert!(!verify_password("battery-staple", &stored).unwrap());
    }

    #[test]
    fn garbage_hash_is_a_hash_error() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, ApiError::Hash(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
