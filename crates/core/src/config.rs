//! Environment-variable helpers shared by every configuration struct.
//!
//! Configuration is read once at process start and then passed around as
//! plain values; nothing in the engine reads the environment on its own.

use std::fmt::Display;
use std::str::FromStr;

/// Why a configuration value could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Read a variable that must be present and non-empty.
pub fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(ConfigError::Invalid {
            var: name,
            reason: "must not be empty".into(),
        }),
        Err(_) => Err(ConfigError::Missing(name)),
    }
}

/// Read and parse an optional variable, falling back to `default` when unset.
pub fn parsed_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name so they can run in parallel.

    #[test]
    fn required_var_missing_and_empty() {
        std::env::remove_var("GATEHOUSE_TEST_REQUIRED_MISSING");
        assert!(matches!(
            required_var("GATEHOUSE_TEST_REQUIRED_MISSING"),
            Err(ConfigError::Missing(_))
        ));

        std::env::set_var("GATEHOUSE_TEST_REQUIRED_EMPTY", "  ");
        assert!(matches!(
            required_var("GATEHOUSE_TEST_REQUIRED_EMPTY"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn parsed_var_default_and_invalid() {
        std::env::remove_var("GATEHOUSE_TEST_PARSED_UNSET");
        assert_eq!(parsed_var("GATEHOUSE_TEST_PARSED_UNSET", 15i64).unwrap(), 15);

        std::env::set_var("GATEHOUSE_TEST_PARSED_SET", " 30 ");
        assert_eq!(parsed_var("GATEHOUSE_TEST_PARSED_SET", 15i64).unwrap(), 30);

        std::env::set_var("GATEHOUSE_TEST_PARSED_BAD", "soon");
        match parsed_var("GATEHOUSE_TEST_PARSED_BAD", 15i64) {
            Err(ConfigError::Invalid { var, .. }) => assert_eq!(var, "GATEHOUSE_TEST_PARSED_BAD"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
