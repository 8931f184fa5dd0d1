//! Access-token extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gatehouse_core::auth::store::User;
use gatehouse_core::auth::token::TokenKind;
use gatehouse_core::error::CoreError;

use crate::cookies::{bearer_token, read_cookie, ACCESS_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in user behind the current request.
///
/// The access token is taken from the `at` cookie, falling back to an
/// `Authorization: Bearer` header for non-browser clients:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, ACCESS_COOKIE)
            .or_else(|| bearer_token(&parts.headers))
            .ok_or(CoreError::InvalidToken(TokenKind::Access))?;

        let user = state.auth.current_user(&token).await?;
        Ok(AuthUser { user })
    }
}
