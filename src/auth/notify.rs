//! Reset-link delivery abstraction.
//!
//! The core persists the reset token before calling the notifier and does not
//! roll back on delivery failure: the token stays valid so an operator or
//! fallback channel can still hand out the link. The default sender for local
//! dev logs the link instead of sending real email.

use anyhow::Result;
use tracing::info;

/// Out-of-band delivery of the password-reset link.
pub trait Notifier: Send + Sync {
    /// Deliver the reset URL to the address or return an error.
    ///
    /// # Errors
    /// Returns an error when delivery fails; the caller treats this as
    /// non-fatal.
    fn send(&self, email: &str, reset_url: &str) -> Result<()>;
}

/// Local dev sender that logs the reset link instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, email: &str, reset_url: &str) -> Result<()> {
        info!(email = %email, reset_url = %reset_url, "password reset link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_always_succeeds() {
        assert!(LogNotifier.send("a@x.com", "http://localhost/reset").is_ok());
    }
}
