pub mod auth;
pub mod health;

use axum::response::{IntoResponse, Json};

// axum handler for the root route
pub async fn root() -> impl IntoResponse {
    env!("CARGO_PKG_NAME")
}

// serve the generated OpenAPI document
pub async fn openapi_json() -> impl IntoResponse {
    Json(crate::api::openapi())
}
