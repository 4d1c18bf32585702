//! Single-use, time-bounded password-reset tokens.
//!
//! The plaintext secret (32 random bytes, base64 url-safe) is returned to the
//! caller exactly once at issuance; only its SHA-256 hash and an expiry are
//! persisted on the account. SHA-256 is fine here (unlike for passwords): the
//! input space is a high-entropy random value, so reversal is not a concern.
//! Redemption is an atomic match-and-clear at the store boundary, which makes
//! a token permanently invalid after its first successful use.

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use super::error::AuthError;
use crate::store::{Account, CredentialStore};

/// Default reset-token lifetime: 15 minutes.
pub const DEFAULT_RESET_TTL_MINUTES: i64 = 15;

/// Generate a fresh reset secret. Only ever handed to the caller; the store
/// sees nothing but the hash.
///
/// # Errors
/// Returns an error if the system RNG fails.
pub fn generate_secret() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate reset token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a reset secret for storage and lookup.
#[must_use]
pub fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

pub struct ResetTokenManager {
    store: Arc<dyn CredentialStore>,
    ttl: Duration,
}

impl ResetTokenManager {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, ttl_minutes: i64) -> Self {
        Self {
            store,
            ttl: Duration::minutes(ttl_minutes.max(1)),
        }
    }

    /// Issue a new reset token for the account, superseding any prior
    /// unredeemed token, and return the plaintext secret for out-of-band
    /// delivery.
    ///
    /// # Errors
    /// Returns `Internal` if the secret cannot be generated or persisted.
    pub async fn issue(&self, account_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(account_id, Utc::now()).await
    }

    /// Issue with an explicit clock. Used by tests to simulate expiry.
    ///
    /// # Errors
    /// Returns `Internal` if the secret cannot be generated or persisted.
    pub async fn issue_at(
        &self,
        account_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let secret = generate_secret()?;
        let expires_at = now + self.ttl;
        self.store
            .set_reset_token(account_id, hash_secret(&secret), expires_at)
            .await?;
        Ok(secret)
    }

    /// Redeem a reset secret: find the account whose stored hash matches and
    /// whose expiry is still in the future, install the new password hash,
    /// and clear the token fields in the same atomic update.
    ///
    /// Wrong secret, no pending token, and expired token all fail with
    /// `TokenInvalidOrExpired`; the caller cannot tell which.
    ///
    /// # Errors
    /// Returns `TokenInvalidOrExpired` or `Internal`.
    pub async fn redeem(
        &self,
        secret: &str,
        new_password_hash: String,
    ) -> Result<Account, AuthError> {
        self.redeem_at(secret, new_password_hash, Utc::now()).await
    }

    /// Redeem with an explicit clock. Used by tests to simulate expiry.
    ///
    /// # Errors
    /// Returns `TokenInvalidOrExpired` or `Internal`.
    pub async fn redeem_at(
        &self,
        secret: &str,
        new_password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        let account = self
            .store
            .redeem_reset_token(&hash_secret(secret), new_password_hash, now)
            .await?;
        account.ok_or(AuthError::TokenInvalidOrExpired)
    }
}
