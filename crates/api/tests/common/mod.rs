//! Shared helpers for HTTP-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, Method, Request};
use axum::response::Response;
use axum::Router;
use gatehouse_api::config::ServerConfig;
use gatehouse_api::router::build_app_router;
use gatehouse_api::state::AppState;
use gatehouse_core::auth::password::PasswordHasher;
use gatehouse_core::auth::service::AuthenticationService;
use gatehouse_core::auth::token::{TokenCodec, TokenConfig};
use gatehouse_db::PgSessionStore;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const ACCESS_SECRET: &str = "api-test-access-secret";
pub const REFRESH_SECRET: &str = "api-test-refresh-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        cookie_secure: true,
        database_url: String::new(),
        tokens: TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET),
    }
}

/// Argon2 with minimal cost so tests stay fast.
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(1024, 1, 1, None).expect("valid params"))
}

/// Codec matching the keys in [`test_config`].
pub fn test_codec() -> TokenCodec {
    TokenCodec::with_hasher(&TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET), fast_hasher())
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let auth = AuthenticationService::new(
        PgSessionStore::new(pool.clone()),
        TokenCodec::with_hasher(&config.tokens, fast_hasher()),
        fast_hasher(),
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        auth: Arc::new(auth),
    };
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET with an access token in the `at` cookie.
pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// GET with an `Authorization: Bearer` header.
pub async fn get_bearer(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with no body and the given `Cookie` header.
pub async fn post_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Every `Set-Cookie` header on the response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Full `Set-Cookie` line for the cookie called `name`.
pub fn set_cookie_line(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
}

/// Value of the cookie called `name` as set by the response.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    let line = set_cookie_line(response, name)?;
    let pair = line.split(';').next()?;
    pair.split_once('=').map(|(_, v)| v.to_string())
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

pub async fn signup(app: Router, email: &str, password: &str) -> Response {
    post_json(
        app,
        "/api/v1/auth/signup",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await
}

pub async fn signin(app: Router, email: &str, password: &str) -> Response {
    post_json(
        app,
        "/api/v1/auth/signin",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await
}

/// Sign up and sign in; returns `(access_token, refresh_token)`.
pub async fn signed_in_user(pool: &PgPool, email: &str, password: &str) -> (String, String) {
    let response = signup(build_test_app(pool.clone()), email, password).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let response = signin(build_test_app(pool.clone()), email, password).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let access = cookie_value(&response, "at").expect("signin must set at");
    let refresh = cookie_value(&response, "rt").expect("signin must set rt");
    (access, refresh)
}
