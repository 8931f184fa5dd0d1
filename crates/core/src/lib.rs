//! Credential and session-authentication engine.
//!
//! This crate has no knowledge of HTTP or SQL. It owns the cryptography
//! (password hashing, signed tokens, refresh-token fingerprints), the session
//! lifecycle, and the [`auth::store::SessionStore`] seam that persistence
//! layers implement.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod types;
