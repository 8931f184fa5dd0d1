//! [`SessionStore`] backed by PostgreSQL.

use async_trait::async_trait;
use gatehouse_core::auth::store::{NewSession, Session, SessionStore, StoreError, User};
use gatehouse_core::types::{DbId, Timestamp};

use crate::models::user::CreateUser;
use crate::repositories::{SessionRepo, UserRepo};
use crate::DbPool;

/// Unique constraint on `users.email`.
const UQ_USERS_EMAIL: &str = "uq_users_email";

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Session store over a shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a sqlx error into a [`StoreError`].
///
/// Only a unique violation on the email constraint is a business outcome;
/// everything else is logged here and surfaces as an opaque backend failure.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
            && db_err.constraint() == Some(UQ_USERS_EMAIL)
        {
            return StoreError::DuplicateUser;
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(classify)?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        let row = UserRepo::find_by_id(&self.pool, id).await.map_err(classify)?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, email: &str, password_hash: &[u8]) -> Result<User, StoreError> {
        let input = CreateUser {
            email,
            password_hash,
        };
        let row = UserRepo::create(&self.pool, &input)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn find_active_session(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Session>, StoreError> {
        let row = SessionRepo::find_active_for_user(&self.pool, user_id, now)
            .await
            .map_err(classify)?;
        Ok(row.map(Session::from))
    }

    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        let row = SessionRepo::create(&self.pool, input)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn revoke(&self, session: &Session, now: Timestamp) -> Result<(), StoreError> {
        if session.revoked_at.is_some() {
            return Ok(());
        }
        SessionRepo::revoke(&self.pool, session.id, now)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: DbId, now: Timestamp) -> Result<u64, StoreError> {
        SessionRepo::revoke_all_for_user(&self.pool, user_id, now)
            .await
            .map_err(classify)
    }

    /// Revoke-then-insert in one transaction.
    ///
    /// The user row is locked first so concurrent signins for the same
    /// account queue behind each other; `uq_user_sessions_active` backs this
    /// up at the schema level.
    async fn replace_active_session(
        &self,
        input: &NewSession,
        now: Timestamp,
    ) -> Result<Session, StoreError> {
        let mut tx = self.pool.begin().await.map_err(classify)?;

        let exists = UserRepo::lock_for_update(&mut *tx, input.user_id)
            .await
            .map_err(classify)?;
        if !exists {
            // Dropping `tx` rolls it back.
            return Err(StoreError::UnknownUser(input.user_id));
        }
        let revoked = SessionRepo::revoke_all_for_user(&mut *tx, input.user_id, now)
            .await
            .map_err(classify)?;
        let row = SessionRepo::create(&mut *tx, input)
            .await
            .map_err(classify)?;

        tx.commit().await.map_err(classify)?;

        if revoked > 0 {
            tracing::debug!(user_id = input.user_id, revoked, "Revoked previous sessions");
        }
        Ok(row.into())
    }
}
