//! Credential Hashing
//!
//! Argon2id password hashing with cost parameters injected from
//! configuration, and constant-time verification.

use crate::config::AppConfig;
use crate::error::AuthError;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};

/// Salted one-way hasher for account passwords
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Build a hasher from configured cost parameters.
    ///
    /// Parameter validation failures are configuration errors: an account
    /// must never be created with a weaker-than-configured hash.
    pub fn new(config: &AppConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|err| AuthError::Config(format!("Invalid Argon2 parameters: {err}")))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored digest.
    ///
    /// Any mismatch, including a malformed digest, is `false`; verification
    /// never errors for a normal mismatch.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(hash) => hash,
            Err(_) => return false,
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
