//! Role resolution and authorization checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::AuthError;
use crate::store::{Account, CredentialStore};

/// Closed role set. Kept as a tagged variant rather than a free-form string
/// so role checks are exhaustively matched at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

pub struct AuthorizationGate {
    store: Arc<dyn CredentialStore>,
}

impl AuthorizationGate {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolve a verified session's account id into an account.
    ///
    /// # Errors
    /// Returns `Unauthorized` if the account no longer exists (deleted after
    /// token issuance), `Internal` on store failure.
    pub async fn resolve(&self, account_id: Uuid) -> Result<Account, AuthError> {
        let account = self.store.find_by_id(account_id).await?;
        account.ok_or(AuthError::Unauthorized)
    }

    /// Check the account's role against the allowed set.
    ///
    /// # Errors
    /// Returns `Forbidden` if the role is not in `allowed`.
    pub fn authorize(&self, account: &Account, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&account.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}
