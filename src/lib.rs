//! # Warden (Credential & Token Lifecycle)
//!
//! `warden` issues and verifies identity credentials for a web client
//! population: account signup, login, stateless session tokens, single-use
//! password-reset tokens, role checks, and login throttling.
//!
//! ## Passwords
//!
//! Passwords are hashed with Argon2id (random salt, configurable work factor)
//! and verified off the async scheduler on a blocking worker, so a burst of
//! logins cannot starve unrelated requests.
//!
//! ## Sessions
//!
//! Sessions are stateless HS256 tokens carrying the account id and an expiry.
//! There is no server-side revocation list: logout clears the client cookie
//! and a token stays valid until its natural expiry.
//!
//! ## Reset tokens
//!
//! Reset tokens are 32 random bytes handed to the caller exactly once; only
//! their SHA-256 hash is persisted. Redemption is an atomic match-and-clear
//! at the store boundary, so a token can be redeemed at most once even under
//! concurrent requests.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
