//! In-memory `CredentialStore` for tests and local development.
//!
//! A single mutex around the map gives the same atomicity the Postgres
//! backend gets from its unique index and conditional `UPDATE`: check and
//! write happen under one critical section.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, StoreError};

#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Account>> {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.lock();
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.lock();
        // Uniqueness check and insert share the critical section.
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = Utc::now();
        let stored = Account {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut accounts = self.lock();
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("no such account: {id}")))?;
        account.reset_token_hash = Some(token_hash);
        account.reset_token_expires_at = Some(expires_at);
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn redeem_reset_token(
        &self,
        token_hash: &[u8],
        new_password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.lock();
        let matched = accounts.values_mut().find(|a| {
            a.reset_token_hash.as_deref() == Some(token_hash)
                && a.reset_token_expires_at.is_some_and(|exp| exp > now)
        });
        let Some(account) = matched else {
            return Ok(None);
        };
        // Password install and token clear commit together.
        account.password_hash = new_password_hash;
        account.reset_token_hash = None;
        account.reset_token_expires_at = None;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), StoreError> {
        let mut accounts = self.lock();
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("no such account: {id}")))?;
        account.password_hash = password_hash;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.lock().values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(accounts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use std::sync::Arc;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryCredentialStore::new();
        let account = store.insert(new_account("a@x.com")).await.unwrap();
        assert_eq!(
            store
                .find_by_email("a@x.com")
                .await
                .unwrap()
                .unwrap()
                .id,
            account.id
        );
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
        assert_eq!(store.find_by_id(account.id).await.unwrap().unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryCredentialStore::new();
        store.insert(new_account("a@x.com")).await.unwrap();
        let err = store.insert(new_account("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn concurrent_duplicate_inserts_yield_one_success() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert(new_account("race@x.com")).await.is_ok()
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn concurrent_redemptions_yield_one_success() {
        let store = Arc::new(MemoryCredentialStore::new());
        let account = store.insert(new_account("a@x.com")).await.unwrap();
        let expires = Utc::now() + chrono::Duration::minutes(15);
        store
            .set_reset_token(account.id, vec![1, 2, 3], expires)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .redeem_reset_token(&[1, 2, 3], "$argon2id$new".to_string(), Utc::now())
                    .await
                    .unwrap()
                    .is_some()
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn update_password_replaces_hash() {
        let store = MemoryCredentialStore::new();
        let account = store.insert(new_account("a@x.com")).await.unwrap();

        store
            .update_password(account.id, "$argon2id$replacement".to_string())
            .await
            .unwrap();
        let found = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "$argon2id$replacement");
        assert!(found.updated_at >= account.updated_at);

        let err = store
            .update_password(Uuid::new_v4(), "$argon2id$other".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn list_orders_by_creation() {
        let store = MemoryCredentialStore::new();
        store.insert(new_account("a@x.com")).await.unwrap();
        store.insert(new_account("b@x.com")).await.unwrap();
        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
    }
}
