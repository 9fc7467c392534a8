//! Argon2 password hashing

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

/// Hash a plain-text password into a PHC string
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a plain-text password against a stored PHC string
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_only_original_password() {
        let hash = hash_password("testpass").unwrap();

        assert_ne!(hash, "testpass");
        assert!(verify_password("testpass", &hash));
        assert!(!verify_password("wrongpass", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        assert_ne!(
            hash_password("testpass").unwrap(),
            hash_password("testpass").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("testpass", "not-a-phc-string"));
    }
}
