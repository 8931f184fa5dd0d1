//! Repository for the `user_sessions` table.

use gatehouse_core::auth::store::NewSession;
use gatehouse_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::session::UserSessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, revoked_at, created_at";

/// Provides session create, lookup, and revoke operations.
///
/// Rows are never deleted; revoked sessions stay as an audit trail.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &NewSession) -> Result<UserSessionRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSessionRow>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Find the user's session that is neither revoked nor expired at `now`.
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<UserSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE user_id = $1
               AND revoked_at IS NULL
               AND expires_at > $2
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, UserSessionRow>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// List every session for a user, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions WHERE user_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, UserSessionRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every unrevoked session for a user, expired ones included.
    /// Returns the count of revoked sessions.
    pub async fn revoke_all_for_user<'e, E>(
        executor: E,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = $2
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
