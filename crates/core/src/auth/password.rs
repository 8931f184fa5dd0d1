//! Argon2id hashing and verification of user secrets.
//!
//! Every hash uses a fresh random salt from [`OsRng`] and is stored in PHC
//! string format, so the algorithm parameters and salt travel with the hash.
//! The PHC string is kept as raw bytes because the `users.password_hash` and
//! `user_sessions.token_hash` columns are `BYTEA`.
//!
//! Hashing is deliberately slow. Async callers should use
//! [`PasswordHasher::hash_blocking`] / [`PasswordHasher::verify_blocking`],
//! which move the work onto the tokio blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::CoreError;

/// One-way adaptive hasher for passwords and refresh-token digests.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Argon2id with the crate's default cost parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash `secret` with a random salt, returning the PHC string as bytes.
    pub fn hash(&self, secret: &[u8]) -> Result<Vec<u8>, CoreError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(secret, &salt)
            .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;
        Ok(hash.to_string().into_bytes())
    }

    /// Verify `secret` against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch. A stored value that does not parse as
    /// a PHC string is a data-integrity problem and returns
    /// [`CoreError::Internal`].
    pub fn verify(&self, secret: &[u8], stored: &[u8]) -> Result<bool, CoreError> {
        let encoded = std::str::from_utf8(stored)
            .map_err(|_| CoreError::Internal("Stored hash is not valid UTF-8".into()))?;
        let parsed = PasswordHash::new(encoded)
            .map_err(|e| CoreError::Internal(format!("Malformed stored hash: {e}")))?;

        match self.argon2.verify_password(secret, &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CoreError::Internal(format!(
                "Password verification error: {e}"
            ))),
        }
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, secret: Vec<u8>) -> Result<Vec<u8>, CoreError> {
        let hasher = self.clone();
        run_blocking(move || hasher.hash(&secret)).await
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(
        &self,
        secret: Vec<u8>,
        stored: Vec<u8>,
    ) -> Result<bool, CoreError> {
        let hasher = self.clone();
        run_blocking(move || hasher.verify(&secret, &stored)).await
    }
}

/// Run a CPU-bound closure on the tokio blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, CoreError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::Internal(format!("Blocking task failed: {e}")))?
}
