//! Persistence contract consumed by the authentication engine.
//!
//! The engine never talks to a database directly. A store implementation
//! (PostgreSQL in `gatehouse-db`, in-memory in tests) provides the handful of
//! user and session operations declared by [`SessionStore`].

use async_trait::async_trait;

use crate::types::{DbId, Timestamp};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: DbId,
    /// Unique, compared case-sensitively as stored.
    pub email: String,
    /// Argon2id PHC string as bytes. Never sent to clients.
    pub password_hash: Vec<u8>,
    pub created_at: Timestamp,
}

/// One refresh-token lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    /// Refresh-token fingerprint, see [`crate::auth::token`].
    pub token_hash: Vec<u8>,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Session {
    /// Not revoked and not yet expired at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Input for a new session row.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub token_hash: Vec<u8>,
    pub expires_at: Timestamp,
}

/// Failures a store may report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The email is already registered.
    #[error("a user with this email already exists")]
    DuplicateUser,

    /// A session was requested for a user row that does not exist.
    #[error("user {0} does not exist")]
    UnknownUser(DbId),

    /// Anything else; treated as fatal by the engine.
    #[error("{0}")]
    Backend(String),
}

/// User and session storage.
///
/// "Active" always means `revoked_at IS NULL AND expires_at > now`, evaluated
/// when the read happens; there is no background expiry sweep.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::DuplicateUser`] if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &[u8]) -> Result<User, StoreError>;

    async fn find_active_session(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Session>, StoreError>;

    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError>;

    /// Stamp `revoked_at = now`. No-op if the session is already revoked.
    async fn revoke(&self, session: &Session, now: Timestamp) -> Result<(), StoreError>;

    /// Stamp `revoked_at = now` on every unrevoked session of the user,
    /// expired or not. Returns how many rows changed.
    async fn revoke_all_for_user(&self, user_id: DbId, now: Timestamp) -> Result<u64, StoreError>;

    /// Revoke the user's sessions and create `input` in their place,
    /// returning the new session.
    ///
    /// Expired rows are revoked too: an expired but unrevoked session still
    /// occupies the one-unrevoked-session slot at the schema level.
    ///
    /// The default composes the primitives above and is **not** atomic: two
    /// concurrent callers can both insert. Stores with transactions should
    /// override it so the pair runs as one unit.
    async fn replace_active_session(
        &self,
        input: &NewSession,
        now: Timestamp,
    ) -> Result<Session, StoreError> {
        let revoked = self.revoke_all_for_user(input.user_id, now).await?;
        if revoked > 0 {
            tracing::debug!(user_id = input.user_id, revoked, "Revoked previous sessions");
        }
        self.create_session(input).await
    }
}
