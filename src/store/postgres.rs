//! Postgres-backed `CredentialStore` (sqlx).
//!
//! Email uniqueness rides on the unique index over `email` (SQLSTATE 23505
//! maps to `DuplicateEmail`), and reset redemption is a single conditional
//! `UPDATE ... RETURNING`, so both invariants hold without explicit locking.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name TEXT NOT NULL,
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     role TEXT NOT NULL DEFAULT 'user',
//!     reset_token_hash BYTEA,
//!     reset_token_expires_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, StoreError};
use crate::auth::Role;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, \
     reset_token_hash, reset_token_expires_at, created_at, updated_at";

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn backend(err: sqlx::Error, what: &str) -> StoreError {
    StoreError::Backend(anyhow::Error::new(err).context(what.to_string()))
}

fn row_to_account(row: &PgRow) -> Result<Account, StoreError> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|e| StoreError::Backend(anyhow::anyhow!(e)))?;
    Ok(Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        reset_token_hash: row.get("reset_token_hash"),
        reset_token_expires_at: row.get("reset_token_expires_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .map_err(|e| backend(e, "failed to lookup account by email"))?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .map_err(|e| backend(e, "failed to lookup account by id"))?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let query = format!(
            "INSERT INTO accounts (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await;
        match row {
            Ok(row) => row_to_account(&row),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateEmail),
            Err(err) => Err(backend(err, "failed to insert account")),
        }
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // Overwrites any prior pending token: supersession.
        let query = "UPDATE accounts \
             SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW() \
             WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .bind(token_hash)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .map_err(|e| backend(e, "failed to set reset token"))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "no such account: {id}"
            )));
        }
        Ok(())
    }

    async fn redeem_reset_token(
        &self,
        token_hash: &[u8],
        new_password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        // Single conditional UPDATE: of two concurrent redemptions, the row
        // predicate matches for exactly one.
        let query = format!(
            "UPDATE accounts \
             SET password_hash = $2, reset_token_hash = NULL, \
                 reset_token_expires_at = NULL, updated_at = NOW() \
             WHERE reset_token_hash = $1 AND reset_token_expires_at > $3 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(token_hash)
            .bind(&new_password_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", &query))
            .await
            .map_err(|e| backend(e, "failed to redeem reset token"))?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), StoreError> {
        let query = "UPDATE accounts \
             SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .bind(&password_hash)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .map_err(|e| backend(e, "failed to update password"))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .map_err(|e| backend(e, "failed to list accounts"))?;
        rows.iter().map(row_to_account).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_matches_sqlstate_only() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
