pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup          create account (public)
/// /auth/signin          sign in, sets `rt` + `at` cookies (public)
/// /auth/refresh         new `at` cookie from `rt` (public)
/// /auth/logout          revoke session, clear cookies (requires auth)
///
/// /users/me             current user (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
}
