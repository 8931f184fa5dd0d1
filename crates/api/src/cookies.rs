//! Token delivery through `HttpOnly` cookies.
//!
//! Signin sets two cookies: `at` (access token, sent on every request) and
//! `rt` (refresh token, scoped to the refresh endpoint so it is never sent
//! anywhere else). Logout clears both with the same attributes.

use axum::http::header::{InvalidHeaderValue, AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use gatehouse_core::auth::token::TokenKind;

/// Cookie carrying the access token.
pub const ACCESS_COOKIE: &str = "at";
/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "rt";
/// The refresh cookie is only sent to this path.
pub const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/refresh";

fn name_and_path(kind: TokenKind) -> (&'static str, &'static str) {
    match kind {
        TokenKind::Access => (ACCESS_COOKIE, "/"),
        TokenKind::Refresh => (REFRESH_COOKIE, REFRESH_COOKIE_PATH),
    }
}

fn build(kind: TokenKind, value: &str, max_age_secs: i64, secure: bool) -> String {
    let (name, path) = name_and_path(kind);
    let mut cookie =
        format!("{name}={value}; Path={path}; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value delivering `token`.
pub fn token_cookie(
    kind: TokenKind,
    token: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&build(kind, token, max_age_secs, secure))
}

/// `Set-Cookie` value that expires the cookie for `kind` immediately.
pub fn clear_cookie(kind: TokenKind, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&build(kind, "", 0, secure))
}

/// Value of the cookie called `name`, if present and non-empty.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
