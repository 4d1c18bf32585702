//! Password-reset flow: forgot (issue + deliver) and reset (redeem).

use axum::{
    extract::{Extension, Path},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{
    error_response,
    types::{AccountResponse, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest},
    utils::{session_cookie, valid_email, valid_password},
};
use crate::api::AppContext;
use crate::auth::{service::normalize_email, AuthError};
use crate::store::AccountView;

#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link issued", body = MessageResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 404, description = "Unknown email", body = String)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    context: Extension<Arc<AppContext>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let request: ForgotPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return error_response(&AuthError::Validation("Missing payload".to_string()));
        }
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return error_response(&AuthError::Validation("Valid email required".to_string()));
    }

    match context.auth.forgot_password(&email).await {
        Ok(()) => {
            let body = MessageResponse {
                message: "Password reset link sent".to_string(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/auth/reset-password/{token}",
    request_body = ResetPasswordRequest,
    params(
        ("token" = String, Path, description = "Reset secret from the emailed link")
    ),
    responses(
        (status = 200, description = "Password reset, session issued", body = AccountResponse),
        (status = 400, description = "Validation error or token invalid/expired", body = String)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    Path(token): Path<String>,
    context: Extension<Arc<AppContext>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return error_response(&AuthError::Validation("Missing payload".to_string()));
        }
    };

    if !valid_password(&request.password) {
        return error_response(&AuthError::Validation("Password min 6 chars".to_string()));
    }

    match context.auth.reset_password(&token, &request.password).await {
        Ok((account, session_token)) => {
            let mut headers = HeaderMap::new();
            if let Ok(cookie) = session_cookie(&context, &session_token) {
                headers.insert(SET_COOKIE, cookie);
            }
            let body = AccountResponse {
                message: "Password reset successful".to_string(),
                user: AccountView::from(&account),
            };
            (StatusCode::OK, headers, Json(body)).into_response()
        }
        Err(err) => error_response(&err),
    }
}
