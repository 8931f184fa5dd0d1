//! Signed access/refresh tokens and refresh-token fingerprints.
//!
//! Both token kinds are HS256 JWTs carrying exactly `{sub, type, exp}`. Each
//! kind is signed with its own secret, and verification additionally insists
//! that the `type` claim matches the kind the caller asked for, so a refresh
//! token can never stand in for an access token (or the reverse) even when
//! the keys are misconfigured to be equal.
//!
//! Refresh tokens are long-lived bearer secrets. Sessions store only a
//! *fingerprint*: the SHA-256 digest of the raw token, run through the same
//! Argon2id hasher used for passwords. Pre-digesting gives the slow hash a
//! fixed 32-byte input regardless of token length.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::password::{run_blocking, PasswordHasher};
use crate::config::{parsed_var, required_var, ConfigError};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default access token expiry in minutes.
pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
pub const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;
/// Upper bound accepted for `JWT_ACCESS_EXPIRY_MINS` (one day).
pub const MAX_ACCESS_EXPIRY_MINS: i64 = 24 * 60;
/// Upper bound accepted for `JWT_REFRESH_EXPIRY_DAYS`.
pub const MAX_REFRESH_EXPIRY_DAYS: i64 = 365;

/// The two token kinds the engine issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload. Any other shape is rejected at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject -- the user's id in string form.
    pub sub: String,
    /// Which kind of token this is.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// The subject as a user id, if it is a positive integer.
    pub fn user_id(&self) -> Option<DbId> {
        self.sub.parse::<DbId>().ok().filter(|id| *id > 0)
    }
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("expected a {expected} token, got a {found} token")]
    WrongKind {
        expected: TokenKind,
        found: TokenKind,
    },
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub expires_at: Timestamp,
}

/// Configuration for token signing and lifetimes.
#[derive(Debug)]
pub struct TokenConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: SecretString,
    /// HMAC-SHA256 secret for refresh tokens.
    pub refresh_secret: SecretString,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

impl TokenConfig {
    /// Config with the default lifetimes.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: SecretString::from(access_secret.into()),
            refresh_secret: SecretString::from(refresh_secret.into()),
            access_token_expiry_mins: DEFAULT_ACCESS_EXPIRY_MINS,
            refresh_token_expiry_days: DEFAULT_REFRESH_EXPIRY_DAYS,
        }
    }

    /// Load token configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `JWT_ACCESS_SECRET_KEY`   | **yes**  | --      |
    /// | `JWT_REFRESH_SECRET_KEY`  | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | no       | `7`     |
    ///
    /// The two secrets must differ, and both lifetimes must pass
    /// [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        let access = required_var("JWT_ACCESS_SECRET_KEY")?;
        let refresh = required_var("JWT_REFRESH_SECRET_KEY")?;
        if access == refresh {
            return Err(ConfigError::Invalid {
                var: "JWT_REFRESH_SECRET_KEY",
                reason: "must differ from JWT_ACCESS_SECRET_KEY".into(),
            });
        }

        let access_token_expiry_mins =
            parsed_var("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?;
        let refresh_token_expiry_days =
            parsed_var("JWT_REFRESH_EXPIRY_DAYS", DEFAULT_REFRESH_EXPIRY_DAYS)?;

        let config = Self {
            access_token_expiry_mins,
            refresh_token_expiry_days,
            ..Self::new(access, refresh)
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that both lifetimes are positive and within their upper bounds.
    ///
    /// A zero or negative lifetime would make every token expire as it is
    /// issued.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_lifetime(
            "JWT_ACCESS_EXPIRY_MINS",
            self.access_token_expiry_mins,
            MAX_ACCESS_EXPIRY_MINS,
        )?;
        check_lifetime(
            "JWT_REFRESH_EXPIRY_DAYS",
            self.refresh_token_expiry_days,
            MAX_REFRESH_EXPIRY_DAYS,
        )
    }

    /// Saturates at `Duration::MAX`; [`TokenCodec::issue`] reports the
    /// resulting overflow as an error.
    pub fn access_ttl(&self) -> Duration {
        Duration::try_minutes(self.access_token_expiry_mins).unwrap_or(Duration::MAX)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::try_days(self.refresh_token_expiry_days).unwrap_or(Duration::MAX)
    }
}

fn check_lifetime(var: &'static str, value: i64, max: i64) -> Result<(), ConfigError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            var,
            reason: format!("must be between 1 and {max}, got {value}"),
        })
    }
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }
}

/// Issues and verifies both token kinds.
///
/// Cheap to clone; holds only derived keys, lifetimes, and a hasher.
#[derive(Clone)]
pub struct TokenCodec {
    access_keys: SigningKeys,
    refresh_keys: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
    hasher: PasswordHasher,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        Self::with_hasher(config, PasswordHasher::new())
    }

    /// Use `hasher` for refresh-token fingerprints.
    pub fn with_hasher(config: &TokenConfig, hasher: PasswordHasher) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access_keys: SigningKeys::from_secret(&config.access_secret),
            refresh_keys: SigningKeys::from_secret(&config.refresh_secret),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
            validation,
            hasher,
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        }
    }

    /// Sign a token of `kind` for `subject`, expiring `ttl(kind)` after `now`.
    ///
    /// `expires_at` is truncated to whole seconds so it equals the `exp`
    /// claim exactly.
    pub fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        now: Timestamp,
    ) -> Result<IssuedToken, CoreError> {
        let exp = now
            .checked_add_signed(self.ttl(kind))
            .ok_or_else(|| CoreError::Internal(format!("{kind} token lifetime overflows")))?
            .timestamp();
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| CoreError::Internal(format!("Token expiry out of range: {exp}")))?;

        let claims = Claims {
            sub: subject.to_string(),
            kind,
            exp,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(kind).encoding,
        )
        .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))?;

        Ok(IssuedToken {
            token,
            kind,
            expires_at,
        })
    }

    /// Verify `token` as `expected` against the wall clock.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// Verify signature, shape, and expiry, then require `type == expected`.
    ///
    /// A token is expired once `now` reaches its `exp`.
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: Timestamp,
    ) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.keys(expected).decoding, &self.validation)?;
        let claims = data.claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.kind,
            });
        }
        Ok(claims)
    }

    /// Storable fingerprint of a refresh token: `argon2(sha256(token))`.
    pub fn fingerprint_refresh_token(&self, token: &str) -> Result<Vec<u8>, CoreError> {
        self.hasher.hash(&digest(token))
    }

    /// Whether `token` produced `fingerprint`. Never compares raw tokens.
    pub fn matches_fingerprint(&self, token: &str, fingerprint: &[u8]) -> Result<bool, CoreError> {
        self.hasher.verify(&digest(token), fingerprint)
    }

    /// [`fingerprint_refresh_token`](Self::fingerprint_refresh_token) on the blocking pool.
    pub async fn fingerprint_blocking(&self, token: &str) -> Result<Vec<u8>, CoreError> {
        let hasher = self.hasher.clone();
        let digest = digest(token);
        run_blocking(move || hasher.hash(&digest)).await
    }

    /// [`matches_fingerprint`](Self::matches_fingerprint) on the blocking pool.
    pub async fn matches_fingerprint_blocking(
        &self,
        token: &str,
        fingerprint: Vec<u8>,
    ) -> Result<bool, CoreError> {
        let hasher = self.hasher.clone();
        let digest = digest(token);
        run_blocking(move || hasher.verify(&digest, &fingerprint)).await
    }
}

fn digest(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}
