//! Stateless session tokens (HS256).
//!
//! A session token is a signed claim set `{sub, iat, exp}` verified purely by
//! signature and expiry; no server-side record exists. Logout therefore only
//! clears the client cookie, and a token stays valid until its natural
//! expiry. The signing secret is loaded once at startup and not rotated at
//! runtime.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionVerifyError {
    /// Token structure could not be parsed.
    Malformed,
    /// Signature does not validate against the current secret.
    SignatureInvalid,
    /// Embedded expiry has passed.
    Expired,
}

impl std::fmt::Display for SessionVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed session token"),
            Self::SignatureInvalid => write!(f, "invalid session token signature"),
            Self::Expired => write!(f, "expired session token"),
        }
    }
}

impl std::error::Error for SessionVerifyError {}

pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionTokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl: Duration::seconds(ttl_seconds.max(1)),
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a signed token for the account, expiring after the configured TTL.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, account_id: Uuid) -> Result<String> {
        self.issue_at(account_id, Utc::now())
    }

    /// Issue with an explicit clock. Used by tests to simulate expiry.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_at(&self, account_id: Uuid, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign session token")
    }

    /// Verify a token string and return the embedded account id.
    ///
    /// # Errors
    /// Returns `Malformed`, `SignatureInvalid`, or `Expired`.
    pub fn verify(&self, token: &str) -> Result<Uuid, SessionVerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => Err(match err.kind() {
                ErrorKind::ExpiredSignature => SessionVerifyError::Expired,
                ErrorKind::InvalidSignature => SessionVerifyError::SignatureInvalid,
                _ => SessionVerifyError::Malformed,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str, ttl: i64) -> SessionTokenIssuer {
        SessionTokenIssuer::new(&SecretString::from(secret.to_string()), ttl)
    }

    #[test]
    fn verify_returns_account_id_after_issue() {
        let issuer = issuer("top-secret", DEFAULT_SESSION_TTL_SECONDS);
        let id = Uuid::new_v4();
        let token = issuer.issue(id).unwrap();
        assert_eq!(issuer.verify(&token), Ok(id));
    }

    #[test]
    fn verify_rejects_token_past_ttl() {
        let issuer = issuer("top-secret", 60);
        let id = Uuid::new_v4();
        // Issue in the simulated past so the expiry has already elapsed.
        let issued_at = Utc::now() - Duration::seconds(120);
        let token = issuer.issue_at(id, issued_at).unwrap();
        assert_eq!(issuer.verify(&token), Err(SessionVerifyError::Expired));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let id = Uuid::new_v4();
        let token = issuer("secret-a", 60).issue(id).unwrap();
        assert_eq!(
            issuer("secret-b", 60).verify(&token),
            Err(SessionVerifyError::SignatureInvalid)
        );
    }

    #[test]
    fn verify_rejects_garbage() {
        let issuer = issuer("top-secret", 60);
        assert_eq!(
            issuer.verify("not-a-token"),
            Err(SessionVerifyError::Malformed)
        );
        assert_eq!(issuer.verify(""), Err(SessionVerifyError::Malformed));
    }

    #[test]
    fn ttl_is_clamped_to_at_least_one_second() {
        let issuer = issuer("top-secret", 0);
        assert_eq!(issuer.ttl_seconds(), 1);
    }
}
