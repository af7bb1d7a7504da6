use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use bg_core::{BgError, InternalFault};

/// Hashes a plaintext password with a fresh random salt. The plaintext is
/// never logged or persisted.
pub fn hash(plaintext: &str) -> Result<String, BgError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| BgError::Internal(InternalFault::Database(format!("password hash: {e}"))))
}

/// Verifies a plaintext password against a stored hash.
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default().verify_password(plaintext.as_bytes(), &parsed).is_ok()
}

/// Username rule from §6: 3..20 alphanumeric characters plus underscore.
pub fn username_is_valid(username: &str) -> bool {
    let len = username.chars().count();
    (3..=20).contains(&len) && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Password rule from §6: at least 8 characters, at least one letter and
/// one digit.
pub fn password_is_valid(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hashed = hash("correcthorsebattery1").unwrap();
        assert!(verify("correcthorsebattery1", &hashed));
        assert!(!verify("wrongpassword1", &hashed));
    }

    #[test]
    fn username_validation_rejects_bad_input() {
        assert!(username_is_valid("alice_99"));
        assert!(!username_is_valid("ab"));
        assert!(!username_is_valid("has space"));
        assert!(!username_is_valid(&"x".repeat(21)));
    }

    #[test]
    fn password_validation_requires_letter_and_digit() {
        assert!(password_is_valid("abcdefg1"));
        assert!(!password_is_valid("onlyletters"));
        assert!(!password_is_valid("1234567"));
        assert!(!password_is_valid("short1"));
    }
}
