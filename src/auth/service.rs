//! Orchestration of the credential lifecycle.
//!
//! `AuthService` owns the leaf components and the injected collaborators
//! (store, notifier). Hashing is always an explicit step here, before any
//! persistence write, never a side effect of saving a record.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{error, warn};
use uuid::Uuid;

use super::authz::{AuthorizationGate, Role};
use super::error::AuthError;
use super::notify::Notifier;
use super::password::{PasswordHasher, DEFAULT_WORK_FACTOR};
use super::reset::{ResetTokenManager, DEFAULT_RESET_TTL_MINUTES};
use super::session::{SessionTokenIssuer, DEFAULT_SESSION_TTL_SECONDS};
use super::throttle::{LoginThrottle, DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECONDS};
use crate::store::{Account, CredentialStore, NewAccount};

#[derive(Clone, Debug)]
pub struct AuthServiceConfig {
    session_secret: SecretString,
    session_ttl_seconds: i64,
    reset_ttl_minutes: i64,
    login_window_seconds: u64,
    login_max_attempts: u32,
    work_factor: u32,
    frontend_base_url: String,
}

impl AuthServiceConfig {
    #[must_use]
    pub fn new(session_secret: SecretString, frontend_base_url: String) -> Self {
        Self {
            session_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            reset_ttl_minutes: DEFAULT_RESET_TTL_MINUTES,
            login_window_seconds: DEFAULT_WINDOW_SECONDS,
            login_max_attempts: DEFAULT_MAX_ATTEMPTS,
            work_factor: DEFAULT_WORK_FACTOR,
            frontend_base_url,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_ttl_minutes(mut self, minutes: i64) -> Self {
        self.reset_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_login_window_seconds(mut self, seconds: u64) -> Self {
        self.login_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_login_max_attempts(mut self, attempts: u32) -> Self {
        self.login_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_work_factor(mut self, work_factor: u32) -> Self {
        self.work_factor = work_factor;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    hasher: PasswordHasher,
    sessions: SessionTokenIssuer,
    resets: ResetTokenManager,
    throttle: LoginThrottle,
    gate: AuthorizationGate,
    frontend_base_url: String,
}

impl AuthService {
    #[must_use]
    pub fn new(
        config: &AuthServiceConfig,
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            hasher: PasswordHasher::new(config.work_factor),
            sessions: SessionTokenIssuer::new(
                &config.session_secret,
                config.session_ttl_seconds,
            ),
            resets: ResetTokenManager::new(Arc::clone(&store), config.reset_ttl_minutes),
            throttle: LoginThrottle::new(
                Duration::from_secs(config.login_window_seconds),
                config.login_max_attempts,
            ),
            gate: AuthorizationGate::new(Arc::clone(&store)),
            frontend_base_url: config.frontend_base_url.clone(),
            store,
            notifier,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionTokenIssuer {
        &self.sessions
    }

    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Create an account and log it straight in.
    ///
    /// # Errors
    /// Returns `DuplicateEmail` or `Internal`.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(Account, String), AuthError> {
        // Hash first: the store only ever sees the digest.
        let password_hash = self.hasher.hash_blocking(password).await?;
        let account = self
            .store
            .insert(NewAccount {
                name: name.trim().to_string(),
                email: normalize_email(email),
                password_hash,
                role,
            })
            .await?;
        let token = self.sessions.issue(account.id)?;
        Ok((account, token))
    }

    /// Authenticate a login attempt.
    ///
    /// The throttle counts every attempt for `client_id` before any
    /// credential work, success or failure alike. Unknown email and wrong
    /// password are indistinguishable to the caller.
    ///
    /// # Errors
    /// Returns `RateLimited`, `InvalidCredentials`, or `Internal`.
    pub async fn login(
        &self,
        client_id: &str,
        email: &str,
        password: &str,
    ) -> Result<(Account, String), AuthError> {
        if let Err(retry_after) = self.throttle.check(client_id) {
            return Err(AuthError::RateLimited { retry_after });
        }

        let account = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .hasher
            .verify_blocking(password, &account.password_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.sessions.issue(account.id)?;
        Ok((account, token))
    }

    /// Issue a reset token and hand the link to the notifier.
    ///
    /// Token issuance commits before delivery is attempted; a delivery
    /// failure is logged, not rolled back.
    ///
    /// # Errors
    /// Returns `AccountNotFound` or `Internal`.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let account = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let secret = self.resets.issue(account.id).await?;
        let reset_url = format!(
            "{}/reset-password/{secret}",
            self.frontend_base_url.trim_end_matches('/')
        );
        if let Err(err) = self.notifier.send(&account.email, &reset_url) {
            warn!(email = %account.email, "failed to deliver reset link: {err}");
        }
        Ok(())
    }

    /// Redeem a reset token, install the new password, and log the account in.
    ///
    /// # Errors
    /// Returns `TokenInvalidOrExpired` or `Internal`.
    pub async fn reset_password(
        &self,
        secret: &str,
        new_password: &str,
    ) -> Result<(Account, String), AuthError> {
        let password_hash = self.hasher.hash_blocking(new_password).await?;
        let account = self.resets.redeem(secret, password_hash).await?;
        let token = self.sessions.issue(account.id)?;
        Ok((account, token))
    }

    /// Verify a session token and resolve its account.
    ///
    /// # Errors
    /// Returns `Unauthorized` for any verification failure or a vanished
    /// account, `Internal` on store failure.
    pub async fn resolve_session(&self, token: &str) -> Result<Account, AuthError> {
        let account_id = self.verify_session(token)?;
        self.gate.resolve(account_id).await
    }

    /// Verify a session token without touching the store.
    ///
    /// # Errors
    /// Returns `Unauthorized` for malformed, forged, or expired tokens.
    pub fn verify_session(&self, token: &str) -> Result<Uuid, AuthError> {
        self.sessions.verify(token).map_err(|err| {
            error!("session verification failed: {err}");
            AuthError::Unauthorized
        })
    }

    /// Admin listing of all accounts.
    ///
    /// # Errors
    /// Returns `Internal` on store failure.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.store.list().await?)
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
