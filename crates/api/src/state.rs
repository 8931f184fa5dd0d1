use std::sync::Arc;

use gatehouse_core::auth::service::AuthenticationService;
use gatehouse_db::PgSessionStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gatehouse_db::DbPool,
    /// Server configuration (cookie flags and token lifetimes).
    pub config: Arc<ServerConfig>,
    /// The authentication engine over the PostgreSQL session store.
    pub auth: Arc<AuthenticationService<PgSessionStore>>,
}
