//! Auth handlers: signup, login/logout, password reset, profile, admin.
//!
//! Handlers validate request shape, call into `AuthService`, and translate
//! `AuthError` kinds into status codes. Generic messages for credential
//! failures are deliberate: the response never reveals which check failed.

pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod profile;
pub(crate) mod signup;
pub(crate) mod types;
mod utils;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::auth::AuthError;

/// Map a core failure kind onto a transport status + body.
pub(crate) fn error_response(err: &AuthError) -> Response {
    match err {
        AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()).into_response(),
        AuthError::DuplicateEmail => {
            (StatusCode::BAD_REQUEST, "Email already registered".to_string()).into_response()
        }
        AuthError::InvalidCredentials | AuthError::TokenInvalidOrExpired => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        AuthError::Unauthorized => {
            (StatusCode::UNAUTHORIZED, "Not authorized".to_string()).into_response()
        }
        AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()).into_response(),
        AuthError::AccountNotFound => {
            (StatusCode::NOT_FOUND, "User not found".to_string()).into_response()
        }
        AuthError::RateLimited { retry_after } => {
            let mut headers = axum::http::HeaderMap::new();
            if let Ok(value) = retry_after.as_secs().to_string().parse() {
                headers.insert(axum::http::header::RETRY_AFTER, value);
            }
            (
                StatusCode::TOO_MANY_REQUESTS,
                headers,
                "Too many attempts".to_string(),
            )
                .into_response()
        }
        AuthError::Internal(inner) => {
            error!("internal error: {inner}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
    }
}
