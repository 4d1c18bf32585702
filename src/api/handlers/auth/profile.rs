//! Session-protected endpoints: profile and the admin account listing.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{
    error_response,
    types::{ProfileResponse, UsersResponse},
    utils::extract_session_token,
};
use crate::api::AppContext;
use crate::auth::{AuthError, Role};
use crate::store::{Account, AccountView};

/// Resolve the request's session into an account, or fail `Unauthorized`.
async fn authenticate(headers: &HeaderMap, context: &AppContext) -> Result<Account, AuthError> {
    let token = extract_session_token(headers, &context.cookie_name)
        .ok_or(AuthError::Unauthorized)?;
    context.auth.resolve_session(&token).await
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Current account", body = ProfileResponse),
        (status = 401, description = "Missing, invalid, or expired session", body = String)
    ),
    tag = "auth"
)]
pub async fn profile(
    headers: HeaderMap,
    context: Extension<Arc<AppContext>>,
) -> impl IntoResponse {
    match authenticate(&headers, &context).await {
        Ok(account) => {
            let body = ProfileResponse {
                user: AccountView::from(&account),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/auth/admin/users",
    responses(
        (status = 200, description = "All accounts", body = UsersResponse),
        (status = 401, description = "Missing, invalid, or expired session", body = String),
        (status = 403, description = "Insufficient role", body = String)
    ),
    tag = "auth"
)]
pub async fn admin_users(
    headers: HeaderMap,
    context: Extension<Arc<AppContext>>,
) -> impl IntoResponse {
    let account = match authenticate(&headers, &context).await {
        Ok(account) => account,
        Err(err) => return error_response(&err),
    };
    if let Err(err) = context.auth.gate().authorize(&account, &[Role::Admin]) {
        return error_response(&err);
    }

    match context.auth.list_accounts().await {
        Ok(accounts) => {
            let body = UsersResponse {
                users: accounts.iter().map(AccountView::from).collect(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => error_response(&err),
    }
}
