//! HTTP surface and server wiring.
//!
//! The transport layer owns exactly two jobs: mapping requests into core
//! operations and mapping `AuthError` kinds onto status codes. All
//! credential logic lives in `crate::auth`.

use crate::auth::{AuthService, AuthServiceConfig, Notifier};
use crate::store::CredentialStore;
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

/// Shared per-request context: the assembled service plus cookie policy.
pub struct AppContext {
    pub auth: AuthService,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub session_ttl_seconds: i64,
}

/// Build the application router. Extracted from [`new`] so tests can drive
/// the full surface without binding a socket.
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(handlers::openapi_json))
        .route("/auth/signup", post(handlers::auth::signup::signup))
        .route("/auth/login", post(handlers::auth::login::login))
        .route("/auth/logout", post(handlers::auth::login::logout))
        .route(
            "/auth/forgot-password",
            post(handlers::auth::password::forgot_password),
        )
        .route(
            "/auth/reset-password/:token",
            post(handlers::auth::password::reset_password),
        )
        .route("/auth/profile", get(handlers::auth::profile::profile))
        .route(
            "/auth/admin/users",
            get(handlers::auth::profile::admin_users),
        )
        .layer(Extension(context))
}

/// Start the server.
///
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(
    port: u16,
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    auth_config: AuthServiceConfig,
    cookie_name: String,
) -> Result<()> {
    let frontend_origin = frontend_origin(auth_config.frontend_base_url())?;
    let cookie_secure = auth_config.frontend_base_url().starts_with("https://");
    let session_ttl_seconds = auth_config.session_ttl_seconds();

    let context = Arc::new(AppContext {
        auth: AuthService::new(&auth_config, store, notifier),
        cookie_name,
        cookie_secure,
        session_ttl_seconds,
    });

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let app = router(context).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::frontend_origin;

    #[test]
    fn frontend_origin_strips_path_and_keeps_port() {
        let origin = frontend_origin("http://localhost:3000/app/").unwrap();
        assert_eq!(origin, "http://localhost:3000");
    }

    #[test]
    fn frontend_origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
    }
}
