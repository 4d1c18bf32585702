//! Account creation.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{
    error_response,
    types::{AccountResponse, SignupRequest},
    utils::{session_cookie, valid_email, valid_name, valid_password},
};
use crate::api::AppContext;
use crate::auth::{service::normalize_email, AuthError};
use crate::store::AccountView;

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error or duplicate email", body = String)
    ),
    tag = "auth"
)]
pub async fn signup(
    context: Extension<Arc<AppContext>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return error_response(&AuthError::Validation("Missing payload".to_string()));
        }
    };

    if !valid_name(&request.name) {
        return error_response(&AuthError::Validation("Name required".to_string()));
    }
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return error_response(&AuthError::Validation("Valid email required".to_string()));
    }
    if !valid_password(&request.password) {
        return error_response(&AuthError::Validation("Password min 6 chars".to_string()));
    }

    let role = request.role.unwrap_or_default();
    match context
        .auth
        .signup(&request.name, &email, &request.password, role)
        .await
    {
        Ok((account, token)) => {
            let mut headers = HeaderMap::new();
            if let Ok(cookie) = session_cookie(&context, &token) {
                headers.insert(SET_COOKIE, cookie);
            }
            let body = AccountResponse {
                message: "User created".to_string(),
                user: AccountView::from(&account),
            };
            (StatusCode::CREATED, headers, Json(body)).into_response()
        }
        Err(err) => error_response(&err),
    }
}
