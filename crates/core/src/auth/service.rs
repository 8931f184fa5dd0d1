//! Signup, signin, refresh, and logout.
//!
//! The service keeps no mutable state between calls; every operation is a
//! short sequence of store calls. Argon2 work (password checks and
//! refresh-token fingerprints) runs on the blocking pool.
//!
//! Session lifecycle: a session is created `Active` on signin and moves to
//! `Revoked` exactly once, either when the same user signs in again or on
//! logout. Expiry is never stored; it is the `expires_at > now` check made by
//! the store at read time.
//!
//! Refresh does not rotate the refresh token. A session therefore lives at
//! most one refresh-token lifetime (7 days by default), however often the
//! access token is renewed.

use std::sync::Arc;

use crate::auth::credentials::Credentials;
use crate::auth::guard::AccessGuard;
use crate::auth::password::PasswordHasher;
use crate::auth::store::{NewSession, SessionStore, User};
use crate::auth::token::{IssuedToken, TokenCodec, TokenKind};
use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::types::DbId;

/// Tokens handed out by a successful signin.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

pub struct AuthenticationService<S> {
    store: S,
    codec: TokenCodec,
    hasher: PasswordHasher,
    guard: AccessGuard,
    clock: Arc<dyn Clock>,
}

impl<S: SessionStore> AuthenticationService<S> {
    pub fn new(store: S, codec: TokenCodec, hasher: PasswordHasher) -> Self {
        Self::with_clock(store, codec, hasher, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: S,
        codec: TokenCodec,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let guard = AccessGuard::new(codec.clone(), Arc::clone(&clock));
        Self {
            store,
            codec,
            hasher,
            guard,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Create an account. Fails with `Validation` on malformed input and
    /// `DuplicateUser` if the email is taken.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, CoreError> {
        Credentials::new(email, password).check()?;

        let password_hash = self
            .hasher
            .hash_blocking(password.as_bytes().to_vec())
            .await?;

        let user = self.store.create_user(email, &password_hash).await?;
        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// Any session the user already has is revoked, so a new signin silently
    /// ends sessions on other devices.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, CoreError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(CoreError::UserNotFound)?;

        let password_valid = self
            .hasher
            .verify_blocking(password.as_bytes().to_vec(), user.password_hash.clone())
            .await?;
        if !password_valid {
            tracing::info!(user_id = user.id, "Sign-in rejected: wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        let now = self.clock.now();
        let subject = user.id.to_string();
        let access = self.codec.issue(&subject, TokenKind::Access, now)?;
        let refresh = self.codec.issue(&subject, TokenKind::Refresh, now)?;

        let token_hash = self.codec.fingerprint_blocking(&refresh.token).await?;
        let new_session = NewSession {
            user_id: user.id,
            token_hash,
            expires_at: refresh.expires_at,
        };
        let session = self
            .store
            .replace_active_session(&new_session, now)
            .await?;

        tracing::info!(user_id = user.id, session_id = session.id, "User signed in");
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token must verify as a refresh token *and* match the
    /// fingerprint of the user's active session. A token from a revoked or
    /// superseded session fails even while its own signature and expiry are
    /// still good.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, CoreError> {
        let now = self.clock.now();
        let claims = self
            .codec
            .verify_at(refresh_token, TokenKind::Refresh, now)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected refresh token");
                CoreError::InvalidToken(TokenKind::Refresh)
            })?;
        let user_id = claims
            .user_id()
            .ok_or(CoreError::InvalidToken(TokenKind::Refresh))?;

        let session = self
            .store
            .find_active_session(user_id, now)
            .await?
            .ok_or(CoreError::NotAuthenticated)?;

        let matches = self
            .codec
            .matches_fingerprint_blocking(refresh_token, session.token_hash.clone())
            .await?;
        if !matches {
            tracing::info!(
                user_id,
                session_id = session.id,
                "Refresh token does not belong to the active session"
            );
            return Err(CoreError::InvalidToken(TokenKind::Refresh));
        }

        let access = self.codec.issue(&claims.sub, TokenKind::Access, now)?;
        tracing::debug!(user_id, session_id = session.id, "Access token refreshed");
        Ok(access)
    }

    /// Revoke the user's active session. No-op when there is none.
    pub async fn logout(&self, user: &User) -> Result<(), CoreError> {
        let now = self.clock.now();
        match self.store.find_active_session(user.id, now).await? {
            Some(session) => {
                self.store.revoke(&session, now).await?;
                tracing::info!(user_id = user.id, session_id = session.id, "User logged out");
            }
            None => {
                tracing::debug!(user_id = user.id, "Logout with no active session");
            }
        }
        Ok(())
    }

    /// See [`AccessGuard::authorize`].
    pub fn authorize(&self, access_token: &str) -> Result<DbId, CoreError> {
        self.guard.authorize(access_token)
    }

    /// See [`AccessGuard::current_user`].
    pub async fn current_user(&self, access_token: &str) -> Result<User, CoreError> {
        self.guard.current_user(&self.store, access_token).await
    }
}
