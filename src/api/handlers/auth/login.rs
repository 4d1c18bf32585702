//! Login and logout.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{
    error_response,
    types::{AccountResponse, LoginRequest, MessageResponse},
    utils::{clear_session_cookie, extract_client_ip, session_cookie, valid_email},
};
use crate::api::AppContext;
use crate::auth::{service::normalize_email, AuthError};
use crate::store::AccountView;

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AccountResponse),
        (status = 400, description = "Validation error or invalid credentials", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    context: Extension<Arc<AppContext>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return error_response(&AuthError::Validation("Missing payload".to_string()));
        }
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return error_response(&AuthError::Validation("Valid email required".to_string()));
    }
    if request.password.is_empty() {
        return error_response(&AuthError::Validation("Password required".to_string()));
    }

    // The throttle keys on the client address; unknown clients share a bucket.
    let client_id = extract_client_ip(&headers).unwrap_or_else(|| "unknown".to_string());

    match context.auth.login(&client_id, &email, &request.password).await {
        Ok((account, token)) => {
            let mut response_headers = HeaderMap::new();
            if let Ok(cookie) = session_cookie(&context, &token) {
                response_headers.insert(SET_COOKIE, cookie);
            }
            let body = AccountResponse {
                message: "Logged in".to_string(),
                user: AccountView::from(&account),
            };
            (StatusCode::OK, response_headers, Json(body)).into_response()
        }
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout(context: Extension<Arc<AppContext>>) -> impl IntoResponse {
    // No server-side state to drop; clearing the cookie is all logout does.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(&context) {
        headers.insert(SET_COOKIE, cookie);
    }
    let body = MessageResponse {
        message: "Logged out".to_string(),
    };
    (StatusCode::OK, headers, Json(body)).into_response()
}
