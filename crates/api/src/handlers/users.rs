//! Handlers for the `/users` resource.

use axum::Json;
use gatehouse_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub created_at: Timestamp,
}

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser) -> AppResult<Json<DataResponse<UserInfo>>> {
    let user = auth.user;
    Ok(Json(DataResponse {
        data: UserInfo {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        },
    }))
}
