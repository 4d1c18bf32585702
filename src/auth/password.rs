//! Password hashing and verification (Argon2id).
//!
//! Hashes carry an embedded random salt, so two hashes of the same password
//! never compare equal; verification re-derives from the PHC string. Both
//! operations are deliberately slow and CPU-bound, so the async wrappers run
//! them on `tokio::task::spawn_blocking` instead of the request scheduler.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, PasswordHasher as _, Version,
};
use tokio::task;

/// Default Argon2 time cost (iterations), the tunable work factor.
pub const DEFAULT_WORK_FACTOR: u32 = 2;

#[derive(Clone)]
pub struct PasswordHasher {
    work_factor: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_FACTOR)
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new(work_factor: u32) -> Self {
        Self {
            work_factor: work_factor.max(1),
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        // Memory and parallelism stay at the crate defaults; the work factor
        // only tunes the iteration count.
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.work_factor,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| anyhow!("invalid argon2 params: {e}"))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a plaintext password into a PHC-format string.
    ///
    /// Any string is valid input; this only fails on internal error.
    ///
    /// # Errors
    /// Returns an error if the hashing backend fails.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Returns `false` for any mismatch, including a malformed stored hash;
    /// it never errors. Timing of the comparison is owned by the argon2
    /// crate's verifier.
    #[must_use]
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Hash on a blocking worker so the slow KDF stays off the async scheduler.
    ///
    /// # Errors
    /// Returns an error if the hashing backend fails or the worker is cancelled.
    pub async fn hash_blocking(&self, plaintext: &str) -> Result<String> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .context("password hashing task failed")?
    }

    /// Verify on a blocking worker; see [`Self::verify`].
    ///
    /// # Errors
    /// Returns an error only if the worker is cancelled.
    pub async fn verify_blocking(&self, plaintext: &str, stored: &str) -> Result<bool> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        let stored = stored.to_string();
        task::spawn_blocking(move || hasher.verify(&plaintext, &stored))
            .await
            .context("password verification task failed")
    }
}
