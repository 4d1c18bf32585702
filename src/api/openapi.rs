//! OpenAPI document assembly.
//!
//! Add new endpoints to the `paths(...)` list so the served document stays in
//! step with the router in `api::router`.

use utoipa::OpenApi;

use crate::api::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "warden",
        description = "Credential and session token lifecycle service"
    ),
    paths(
        handlers::health::health,
        handlers::auth::signup::signup,
        handlers::auth::login::login,
        handlers::auth::login::logout,
        handlers::auth::password::forgot_password,
        handlers::auth::password::reset_password,
        handlers::auth::profile::profile,
        handlers::auth::profile::admin_users,
    ),
    tags(
        (name = "auth", description = "Credential and session lifecycle"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_auth_route() {
        let doc = openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/health",
            "/auth/signup",
            "/auth/login",
            "/auth/logout",
            "/auth/forgot-password",
            "/auth/reset-password/{token}",
            "/auth/profile",
            "/auth/admin/users",
        ] {
            assert!(paths.contains_key(path), "missing path: {path}");
        }
    }
}
