use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_core::auth::token::TokenKind;
use gatehouse_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for engine outcomes and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An outcome from `gatehouse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an engine outcome to an HTTP status, error code, and message.
///
/// Authentication failures are all 401 but keep distinct codes so clients
/// can tell "sign in again" from "refresh first".
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::DuplicateUser => (
            StatusCode::CONFLICT,
            "USER_ALREADY_EXISTS",
            err.to_string(),
        ),
        CoreError::UserNotFound => (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND", err.to_string()),
        CoreError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            err.to_string(),
        ),
        CoreError::InvalidToken(TokenKind::Access) => (
            StatusCode::UNAUTHORIZED,
            "INVALID_ACCESS_TOKEN",
            err.to_string(),
        ),
        CoreError::InvalidToken(TokenKind::Refresh) => (
            StatusCode::UNAUTHORIZED,
            "INVALID_REFRESH_TOKEN",
            err.to_string(),
        ),
        CoreError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            "NOT_AUTHENTICATED",
            err.to_string(),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
