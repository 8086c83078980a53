use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hash a raw password into a PHC string; salt and parameters travel inside
/// the stored hash.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
}

/// Compare a raw password against a stored hash. Any malformed stored hash
/// counts as a mismatch rather than an error, so callers stay on the single
/// generic failure path.
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_succeeds() {
        let hashed = hash("hunter2!").unwrap();
        assert!(verify("hunter2!", &hashed));
    }

    #[test]
    fn wrong_password_fails() {
        let hashed = hash("hunter2!").unwrap();
        assert!(!verify("hunter3!", &hashed));
    }

    #[test]
    fn two_hashes_of_same_password_differ() {
        // salts are random, so hashes are not comparable directly
        assert_ne!(hash("same").unwrap(), hash("same").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        assert!(!verify("anything", "definitely-not-a-phc-string"));
    }
}
