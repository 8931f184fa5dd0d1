//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- resolves the caller from the access token.

pub mod auth;
