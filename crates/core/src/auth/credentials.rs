//! Email/password input accepted by signup and signin.

use serde::Deserialize;
use validator::Validate;

use crate::error::CoreError;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: u64 = 6;
/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: u64 = 32;
/// Maximum email length in characters (matches the column width).
pub const MAX_EMAIL_LENGTH: u64 = 255;

/// Credentials as submitted by a client.
///
/// Checked at the HTTP boundary and again by
/// [`AuthenticationService::register`](crate::auth::service::AuthenticationService::register).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email, length(max = MAX_EMAIL_LENGTH))]
    pub email: String,
    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Run the field rules, flattening failures into [`CoreError::Validation`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|errors| CoreError::Validation(describe(&errors)))
    }
}

fn describe(errors: &validator::ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
    fields.sort_unstable();
    fields
        .into_iter()
        .map(|field| match field {
            "email" => {
                format!("email must be a valid address of at most {MAX_EMAIL_LENGTH} characters")
            }
            "password" => format!(
                "password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters"
            ),
            other => format!("{other} is invalid"),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_valid_pair() {
        assert!(creds("a@x.com", "secret1").check().is_ok());
    }

    #[test]
    fn password_length_boundaries() {
        assert!(creds("a@x.com", "12345").check().is_err());
        assert!(creds("a@x.com", "123456").check().is_ok());
        assert!(creds("a@x.com", &"x".repeat(32)).check().is_ok());
        assert!(creds("a@x.com", &"x".repeat(33)).check().is_err());
    }

    #[test]
    fn email_length_limit() {
        let local = "a".repeat(64);
        let label = "b".repeat(63);
        let within_limit = format!("{local}@{label}.{label}.com");
        assert!(within_limit.len() <= MAX_EMAIL_LENGTH as usize);
        assert!(creds(&within_limit, "secret1").check().is_ok());

        // Well-formed address, but longer than the column allows.
        let over = format!("{local}@{label}.{label}.{label}.com");
        assert!(over.len() > MAX_EMAIL_LENGTH as usize);
        match creds(&over, "secret1").check() {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("255")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_email_with_message() {
        match creds("not-an-email", "secret1").check() {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("email")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn reports_every_failing_field() {
        match creds("nope", "123").check() {
            Err(CoreError::Validation(msg)) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("password"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
