//! Identity derivation for protected resources.
//!
//! Every endpoint outside the auth flow asks the [`AccessGuard`] who is
//! calling. Only access tokens are accepted, and the subject must be a
//! positive integer user id.

use std::sync::Arc;

use crate::auth::store::{SessionStore, User};
use crate::auth::token::{TokenCodec, TokenKind};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::types::DbId;

#[derive(Clone)]
pub struct AccessGuard {
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl AccessGuard {
    pub fn new(codec: TokenCodec, clock: Arc<dyn Clock>) -> Self {
        Self { codec, clock }
    }

    /// Resolve an access token to the caller's user id.
    ///
    /// Any signature, shape, expiry, or kind failure, and any subject that is
    /// missing, non-numeric, or non-positive, yields
    /// `InvalidToken(Access)`.
    pub fn authorize(&self, access_token: &str) -> Result<DbId, CoreError> {
        let claims = self
            .codec
            .verify_at(access_token, TokenKind::Access, self.clock.now())
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                CoreError::InvalidToken(TokenKind::Access)
            })?;

        claims.user_id().ok_or_else(|| {
            tracing::debug!(sub = %claims.sub, "Access token subject is not a user id");
            CoreError::InvalidToken(TokenKind::Access)
        })
    }

    /// Resolve an access token to the caller's user row.
    ///
    /// Fails with `UserNotFound` when the token is valid but the account no
    /// longer exists.
    pub async fn current_user<S>(&self, store: &S, access_token: &str) -> Result<User, CoreError>
    where
        S: SessionStore + ?Sized,
    {
        let user_id = self.authorize(access_token)?;
        store
            .find_user_by_id(user_id)
            .await?
            .ok_or(CoreError::UserNotFound)
    }
}
