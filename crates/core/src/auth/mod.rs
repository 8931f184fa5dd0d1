//! Authentication and session primitives.
//!
//! - [`password`] -- Argon2id hashing and verification of user secrets.
//! - [`token`] -- signed access/refresh tokens and refresh-token fingerprints.
//! - [`store`] -- the persistence contract the engine consumes.
//! - [`service`] -- signup, signin, refresh, and logout orchestration.
//! - [`guard`] -- identity derivation from a presented access token.
//! - [`credentials`] -- input rules for email/password pairs.

pub mod credentials;
pub mod guard;
pub mod password;
pub mod service;
pub mod store;
pub mod token;
