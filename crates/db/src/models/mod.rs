//! Row structs for the auth tables.
//!
//! Each row derives `FromRow` and converts into the storage-agnostic type
//! from `gatehouse_core::auth::store`.

pub mod session;
pub mod user;
