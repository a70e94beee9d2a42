//! Argon2 password hashing behind the credential-service port.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use quill_core::ports::{AuthError, PasswordService};

/// Hashes passwords with Argon2id and a fresh random salt per call. The
/// resulting PHC string is stored as an opaque hash; nothing else in the
/// system ever inspects it.
#[derive(Default)]
pub struct Argon2PasswordService;

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use quill_core::ports::PasswordService;

    use super::Argon2PasswordService;

    #[test]
    fn verify_accepts_only_the_original_password() {
        let service = Argon2PasswordService::new();
        let hash = service.hash("correct horse").unwrap();

        assert!(service.verify("correct horse", &hash).unwrap());
        assert!(!service.verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let service = Argon2PasswordService::new();
        assert_ne!(
            service.hash("same password").unwrap(),
            service.hash("same password").unwrap()
        );
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let service = Argon2PasswordService::new();
        assert!(service.verify("pw", "not-a-phc-string").is_err());
    }
}
