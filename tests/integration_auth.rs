//! End-to-end tests driving the HTTP surface against the in-memory store.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use warden::api::{router, AppContext};
use warden::auth::{AuthService, AuthServiceConfig, Notifier};
use warden::store::MemoryCredentialStore;

/// Captures reset links instead of delivering them, so tests can follow the
/// emailed URL.
#[derive(Default)]
struct CapturingNotifier {
    urls: Mutex<Vec<String>>,
}

impl Notifier for CapturingNotifier {
    fn send(&self, _email: &str, reset_url: &str) -> Result<()> {
        self.urls
            .lock()
            .expect("notifier mutex poisoned")
            .push(reset_url.to_string());
        Ok(())
    }
}

impl CapturingNotifier {
    fn last_secret(&self) -> Option<String> {
        self.urls
            .lock()
            .expect("notifier mutex poisoned")
            .last()
            .and_then(|url| url.rsplit('/').next().map(str::to_string))
    }
}

fn test_app() -> (Router, Arc<CapturingNotifier>) {
    test_app_with_config(
        AuthServiceConfig::new(
            SecretString::from("integration-test-secret"),
            "http://localhost:3000".to_string(),
        )
        .with_work_factor(1),
    )
}

fn test_app_with_config(config: AuthServiceConfig) -> (Router, Arc<CapturingNotifier>) {
    let notifier = Arc::new(CapturingNotifier::default());
    let context = Arc::new(AppContext {
        auth: AuthService::new(
            &config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        ),
        cookie_name: "token".to_string(),
        cookie_secure: false,
        session_ttl_seconds: 86400,
    });
    (router(context), notifier)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request build")
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request build")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Pull the token value out of a `Set-Cookie: token=...; Path=/...` header.
fn cookie_token(response: &axum::response::Response) -> Option<String> {
    let cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = cookie.split(';').next()?;
    pair.strip_prefix("token=").map(str::to_string)
}

fn signup_body(name: &str, email: &str, password: &str) -> Value {
    json!({ "name": name, "email": email, "password": password })
}

#[tokio::test]
async fn signup_sets_cookie_and_returns_account() {
    let (app, _) = test_app();

    let response = app
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice", "alice@example.com", "secret1"),
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let token = cookie_token(&response).expect("session cookie");
    assert!(!token.is_empty());

    let body = body_json(response).await;
    assert_eq!(body["message"], "User created");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn signup_rejects_duplicate_email_case_insensitively() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice", "alice@example.com", "secret1"),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice Again", "  ALICE@Example.Com ", "secret2"),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_validates_input() {
    let (app, _) = test_app();

    for body in [
        signup_body("A", "a@example.com", "secret1"),
        signup_body("Alice", "not-an-email", "secret1"),
        signup_body("Alice", "a@example.com", "short"),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/auth/signup", &body))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn login_validation_failures_are_bad_requests_with_reason() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "not-an-email", "password": "secret1" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"Valid email required");

    let response = app
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "alice@example.com", "password": "" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"Password required");
}

#[tokio::test]
async fn login_round_trip_and_wrong_password() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice", "alice@example.com", "secret1"),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "alice@example.com", "password": "wrong-password" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown email gets the same response as a wrong password.
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "nobody@example.com", "password": "secret1" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "alice@example.com", "password": "secret1" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookie_token(&response).is_some());
    let body = body_json(response).await;
    assert_eq!(body["message"], "Logged in");
}

#[tokio::test]
async fn login_is_throttled_per_client() {
    let config = AuthServiceConfig::new(
        SecretString::from("integration-test-secret"),
        "http://localhost:3000".to_string(),
    )
    .with_work_factor(1)
    .with_login_max_attempts(3);
    let (app, _) = test_app_with_config(config);

    // All requests share the "unknown" client bucket; the fourth attempt in
    // the window must be rejected before credentials are even checked.
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                &json!({ "email": "alice@example.com", "password": "wrong" }),
            ))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn profile_requires_a_valid_session() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/auth/profile")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get_with_token("/auth/profile", "not-a-token"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let signup = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice", "alice@example.com", "secret1"),
        ))
        .await
        .expect("request");
    let token = cookie_token(&signup).expect("session cookie");

    let response = app
        .oneshot(get_with_token("/auth/profile", &token))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["name"], "Alice");
}

#[tokio::test]
async fn admin_listing_enforces_role() {
    let (app, _) = test_app();

    let signup = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice", "alice@example.com", "secret1"),
        ))
        .await
        .expect("request");
    let user_token = cookie_token(&signup).expect("session cookie");

    let response = app
        .clone()
        .oneshot(get_with_token("/auth/admin/users", &user_token))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let signup = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            &json!({
                "name": "Root",
                "email": "root@example.com",
                "password": "secret1",
                "role": "admin"
            }),
        ))
        .await
        .expect("request");
    let admin_token = cookie_token(&signup).expect("session cookie");

    let response = app
        .oneshot(get_with_token("/auth/admin/users", &admin_token))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let users = body["users"].as_array().expect("users array");
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn forgot_password_unknown_email_is_not_found() {
    let (app, _) = test_app();

    let response = app
        .oneshot(post_json(
            "/auth/forgot-password",
            &json!({ "email": "nobody@example.com" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn password_reset_flow_is_single_use() {
    let (app, notifier) = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            &signup_body("Alice", "alice@example.com", "secret1"),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/forgot-password",
            &json!({ "email": "alice@example.com" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let secret = notifier.last_secret().expect("captured reset link");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/auth/reset-password/{secret}"),
            &json!({ "password": "new-secret" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookie_token(&response).is_some());

    // The same link again must fail.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/auth/reset-password/{secret}"),
            &json!({ "password": "another-secret" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Old password is gone, new one works.
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "alice@example.com", "password": "secret1" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/auth/login",
            &json!({ "email": "alice@example.com", "password": "new-secret" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reset_password_rejects_garbage_token() {
    let (app, _) = test_app();

    let response = app
        .oneshot(post_json(
            "/auth/reset-password/bm90LWEtcmVhbC10b2tlbg",
            &json!({ "password": "new-secret" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let (app, _) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("set-cookie header");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let (app, _) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/auth/login"].is_object());
}
