//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query functions.
//! Functions that must also run inside a transaction take any
//! [`sqlx::PgExecutor`] instead of `&PgPool`.

pub mod session_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
