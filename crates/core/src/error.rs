use crate::auth::store::StoreError;
use crate::auth::token::TokenKind;

/// Outcome kinds of every authentication operation.
///
/// Business failures carry no internal detail so they can be shown to
/// callers verbatim. `Internal` is the opaque fatal bucket: its message is
/// for logs only.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("The user already exists")]
    DuplicateUser,

    // TODO: merging this with InvalidCredentials would stop email-existence
    // probing; kept separate until the boundary contract changes.
    #[error("User does not exist")]
    UserNotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or missing {0} token")]
    InvalidToken(TokenKind),

    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUser => CoreError::DuplicateUser,
            StoreError::UnknownUser(_) => CoreError::UserNotFound,
            StoreError::Backend(msg) => CoreError::Internal(format!("Storage error: {msg}")),
        }
    }
}
