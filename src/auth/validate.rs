use crate::errors::AuthError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    // local@domain.tld, exactly one @, at least one domain dot, TLD of two
    // or more letters.
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$").unwrap();
}

/// Minimum-length thresholds, injected at construction so environments can
/// override them without global state.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub username_min_len: usize,
    pub password_min_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            username_min_len: 2,
            password_min_len: 6,
        }
    }
}

/// Registration request. Constructed by the caller, sanitized in place,
/// validated, then discarded once a `User` exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterInput {
    /// Trims username and email, lowercases email. Idempotent.
    pub fn sanitize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }
}

/// Login request; same lifecycle as `RegisterInput`, no confirmation field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn sanitize(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }
}

/// Checks sanitized input against the structural rules. The first failing
/// rule wins; failures are never aggregated.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate_register(&self, input: &RegisterInput) -> Result<(), AuthError> {
        if input.username.chars().count() < self.config.username_min_len {
            return Err(AuthError::Validation(format!(
                "username not long enough, ({}) characters at least",
                self.config.username_min_len
            )));
        }

        if !EMAIL_RE.is_match(&input.email) {
            return Err(AuthError::Validation(
                "not a valid email structure".to_string(),
            ));
        }

        if input.password.chars().count() < self.config.password_min_len {
            return Err(AuthError::Validation(format!(
                "password not long enough, ({}) characters at least",
                self.config.password_min_len
            )));
        }

        if input.password != input.confirm_password {
            return Err(AuthError::Validation(
                "password does not match confirmation".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_login(&self, input: &LoginInput) -> Result<(), AuthError> {
        if input.email.is_empty() {
            return Err(AuthError::Validation("email must not be empty".to_string()));
        }

        if input.password.is_empty() {
            return Err(AuthError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
