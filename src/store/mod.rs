//! Account persistence boundary.
//!
//! The credential core talks to a `CredentialStore` capability instead of a
//! process-wide connection. Two implementations ship: `postgres` for the
//! server and `memory` for tests and local development. Email uniqueness and
//! reset-token redemption are atomic check-and-write operations here, so the
//! exactly-once guarantees hold under concurrent requests regardless of the
//! backend.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Stored identity record. The password hash never crosses the API boundary;
/// handlers serialize [`AccountView`] instead.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Normalized (trimmed, lowercased) and unique.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Present only between reset-token issue and redeem/expiry,
    /// always paired with `reset_token_expires_at`.
    pub reset_token_hash: Option<Vec<u8>>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of an [`Account`], safe to serialize in responses.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

/// Fields needed to create an account. The id and timestamps are assigned by
/// the store.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug)]
pub enum StoreError {
    /// Another account already holds the normalized email.
    DuplicateEmail,
    Backend(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail => write!(f, "email already registered"),
            Self::Backend(err) => write!(f, "store backend error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Backend(err)
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Create an account. The uniqueness check and the insert are atomic:
    /// of two concurrent inserts with the same email, exactly one succeeds
    /// and the other fails `DuplicateEmail`.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Install a reset-token hash and expiry, overwriting any prior pending
    /// token (supersession).
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Atomic compare-and-clear: if an account holds `token_hash` with an
    /// expiry after `now`, install `new_password_hash` and clear both reset
    /// fields in the same update, returning the updated account. Of two
    /// concurrent redemptions of the same token, exactly one gets `Some`.
    async fn redeem_reset_token(
        &self,
        token_hash: &[u8],
        new_password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError>;

    /// Replace the password hash outside the reset flow.
    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), StoreError>;

    /// All accounts, for the admin listing.
    async fn list(&self) -> Result<Vec<Account>, StoreError>;
}
