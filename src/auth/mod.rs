//! Credential and token lifecycle core.
//!
//! Each submodule owns one concern: password hashing, stateless session
//! tokens, single-use reset tokens, login throttling, and role checks.
//! `service` wires them together behind explicit dependencies (store and
//! notifier are injected, never process-wide globals).

pub mod authz;
pub mod error;
pub mod notify;
pub mod password;
pub mod reset;
pub mod service;
pub mod session;
pub mod throttle;

pub use authz::{AuthorizationGate, Role};
pub use error::AuthError;
pub use notify::{LogNotifier, Notifier};
pub use password::PasswordHasher;
pub use reset::ResetTokenManager;
pub use service::{AuthService, AuthServiceConfig};
pub use session::{SessionTokenIssuer, SessionVerifyError};
pub use throttle::LoginThrottle;
