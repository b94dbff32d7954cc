//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`), so the parameters
//! travel with each hash and verification keeps working after the
//! configured cost changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::ServiceError;

/// Argon2id hasher with configured cost.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with `memory_kib` memory cost and `iterations` passes.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, ServiceError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| ServiceError::internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(PasswordHasher { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password into a PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| ServiceError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// A malformed stored hash verifies as `false`.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(8, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("deldeldel").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("deldeldel", &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn test_salted() {
        let hasher = hasher();
        assert_ne!(hasher.hash("deldeldel").unwrap(), hasher.hash("deldeldel").unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(!hasher().verify("deldeldel", "not-a-hash"));
    }

    #[test]
    fn test_verifies_hash_made_with_other_cost() {
        let old = PasswordHasher::new(16, 2).unwrap();
        let hash = old.hash("deldeldel").unwrap();
        assert!(hasher().verify("deldeldel", &hash));
    }

    #[test]
    fn test_invalid_params() {
        assert!(PasswordHasher::new(0, 0).is_err());
    }
}
