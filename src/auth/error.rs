//! Failure taxonomy for the credential core.
//!
//! Every core operation returns one of these kinds; nothing opaque crosses
//! the module boundary. The transport layer owns the mapping to status codes.

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum AuthError {
    /// Request input failed validation (name/email/password shape).
    Validation(String),
    /// Another account already holds the normalized email.
    DuplicateEmail,
    /// Unknown email or wrong password. Intentionally indistinguishable.
    InvalidCredentials,
    /// Missing, malformed, or expired session.
    Unauthorized,
    /// Valid session but insufficient role.
    Forbidden,
    /// No account matches the lookup.
    AccountNotFound,
    /// Reset token unknown, already redeemed, or past its expiry.
    /// The cases are indistinguishable to the caller by design.
    TokenInvalidOrExpired,
    /// Too many login attempts from one identifier in the current window.
    RateLimited { retry_after: Duration },
    /// Persistence or hashing failure. Unreachable in normal operation.
    Internal(anyhow::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::DuplicateEmail => write!(f, "Email already registered"),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::Unauthorized => write!(f, "Not authorized"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::AccountNotFound => write!(f, "Account not found"),
            Self::TokenInvalidOrExpired => write!(f, "Token invalid or expired"),
            Self::RateLimited { retry_after } => {
                write!(f, "Too many attempts, retry in {}s", retry_after.as_secs())
            }
            Self::Internal(err) => write!(f, "Internal error: {err}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<crate::store::StoreError> for AuthError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::DuplicateEmail => Self::DuplicateEmail,
            crate::store::StoreError::Backend(err) => Self::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_generic_messages() {
        // Login failures must not reveal which check failed.
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(
            AuthError::TokenInvalidOrExpired.to_string(),
            "Token invalid or expired"
        );
    }

    #[test]
    fn rate_limited_reports_retry_after() {
        let err = AuthError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert!(err.to_string().contains("42s"));
    }

    #[test]
    fn duplicate_email_converts_from_store_error() {
        let err: AuthError = crate::store::StoreError::DuplicateEmail.into();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }
}
