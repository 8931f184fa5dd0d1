//! User session row model.

use gatehouse_core::auth::store::Session;
use gatehouse_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A user session row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSessionRow {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: Vec<u8>,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<UserSessionRow> for Session {
    fn from(row: UserSessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}
