use axum::http::HeaderValue;
use gatehouse_core::auth::token::TokenConfig;
use gatehouse_core::config::{parsed_var, required_var, ConfigError};

/// Server configuration loaded from environment variables.
///
/// Everything except the database URL and the token secrets has a default
/// suitable for local development.
#[derive(Debug)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Whether auth cookies carry the `Secure` attribute (default: `true`).
    pub cookie_secure: bool,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Token secrets and lifetimes.
    pub tokens: TokenConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `COOKIE_SECURE`        | `true`                     |
    /// | `DATABASE_URL`         | required                   |
    ///
    /// Token settings are read by [`TokenConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parsed_var("PORT", 3000u16)?;

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        )?;

        let request_timeout_secs = parsed_var("REQUEST_TIMEOUT_SECS", 30u64)?;
        let cookie_secure = parsed_var("COOKIE_SECURE", true)?;
        let database_url = required_var("DATABASE_URL")?;
        let tokens = TokenConfig::from_env()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cookie_secure,
            database_url,
            tokens,
        })
    }
}

/// Split a comma-separated origin list, skipping blanks.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                reason: format!("{origin:?}: {e}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        let origins = parse_origins(" http://a.test , ,https://b.test,").unwrap();
        assert_eq!(origins, vec!["http://a.test", "https://b.test"]);
    }

    #[test]
    fn unparsable_origin_is_a_config_error() {
        match parse_origins("http://ok.test,http://bad\n.test") {
            Err(ConfigError::Invalid { var, reason }) => {
                assert_eq!(var, "CORS_ORIGINS");
                assert!(reason.contains("bad"));
            }
            other => panic!("expected invalid CORS_ORIGINS, got {other:?}"),
        }
    }
}
