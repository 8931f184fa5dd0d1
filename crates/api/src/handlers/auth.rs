//! Handlers for the `/auth` resource (signup, signin, refresh, logout).
//!
//! Tokens never appear in response bodies; they travel only in `HttpOnly`
//! cookies set here.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use gatehouse_core::auth::credentials::Credentials;
use gatehouse_core::auth::token::{IssuedToken, TokenKind};
use gatehouse_core::error::CoreError;

use crate::cookies::{clear_cookie, read_cookie, token_cookie, REFRESH_COOKIE};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

type Message = Json<DataResponse<&'static str>>;

fn ok() -> Message {
    Json(DataResponse { data: "OK" })
}

/// Append a `Set-Cookie` header delivering `issued`.
fn set_token_cookie(
    headers: &mut HeaderMap,
    state: &AppState,
    issued: &IssuedToken,
) -> AppResult<()> {
    let tokens = &state.config.tokens;
    let max_age = match issued.kind {
        TokenKind::Access => tokens.access_ttl(),
        TokenKind::Refresh => tokens.refresh_ttl(),
    };
    let cookie = token_cookie(
        issued.kind,
        &issued.token,
        max_age.num_seconds(),
        state.config.cookie_secure,
    )
    .map_err(|e| AppError::InternalError(format!("Cookie header: {e}")))?;
    headers.append(SET_COOKIE, cookie);
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an account. Returns 201; signing in is a separate step.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<(StatusCode, Message)> {
    input.check()?;
    state.auth.register(&input.email, &input.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: "User successfully registered",
        }),
    ))
}

/// POST /api/v1/auth/signin
///
/// Verify credentials and set the `rt` and `at` cookies. Any session the
/// user already had is revoked.
pub async fn signin(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<(HeaderMap, Message)> {
    input.check()?;
    let pair = state
        .auth
        .authenticate(&input.email, &input.password)
        .await?;

    let mut headers = HeaderMap::new();
    set_token_cookie(&mut headers, &state, &pair.refresh)?;
    set_token_cookie(&mut headers, &state, &pair.access)?;
    Ok((headers, ok()))
}

/// POST /api/v1/auth/refresh
///
/// Exchange the `rt` cookie for a fresh `at` cookie. The refresh token itself
/// is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    request_headers: HeaderMap,
) -> AppResult<(HeaderMap, Message)> {
    let refresh_token = read_cookie(&request_headers, REFRESH_COOKIE)
        .ok_or(CoreError::InvalidToken(TokenKind::Refresh))?;

    let access = state.auth.refresh(&refresh_token).await?;

    let mut headers = HeaderMap::new();
    set_token_cookie(&mut headers, &state, &access)?;
    Ok((headers, ok()))
}

/// POST /api/v1/auth/logout
///
/// Revoke the caller's session and clear both cookies. Calling it again
/// with a still-valid access token is not an error.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<(HeaderMap, Message)> {
    state.auth.logout(&auth.user).await?;

    let secure = state.config.cookie_secure;
    let mut headers = HeaderMap::new();
    for kind in [TokenKind::Refresh, TokenKind::Access] {
        let cookie = clear_cookie(kind, secure)
            .map_err(|e| AppError::InternalError(format!("Cookie header: {e}")))?;
        headers.append(SET_COOKIE, cookie);
    }
    Ok((headers, ok()))
}
