use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_LEN: usize = 8;
const DUMMY_PASSWORD: &str = "prefab-directory-dummy";

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

/// Hashes with Argon2id defaults and returns the PHC string stored in the user table.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError(err.to_string()))
}

/// Malformed stored hashes verify as `false` rather than erroring.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Runs a full verification against a throwaway hash so unknown emails cost as much as
/// wrong passwords.
pub fn verify_against_dummy(password: &str) {
    let _ = verify_password(password, dummy_hash());
}

fn dummy_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(DUMMY_PASSWORD).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_salt_differs() {
        let first = hash_password("prefab-admin-1").expect("hash");
        let second = hash_password("prefab-admin-1").expect("hash");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("prefab-admin-1", &first));
        assert!(!verify_password("prefab-admin-2", &first));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn unknown_email_path_runs_a_real_verification() {
        assert!(dummy_hash().starts_with("$argon2id$"));
        assert!(verify_password(DUMMY_PASSWORD, dummy_hash()));
        verify_against_dummy("anything");
    }
}
