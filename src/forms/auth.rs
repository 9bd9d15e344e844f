use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Admin credentials posted to the login endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFormPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum LoginFormError {
    #[error("Please enter both username and password")]
    MissingCredentials,
}

impl From<ValidationErrors> for LoginFormError {
    fn from(_: ValidationErrors) -> Self {
        Self::MissingCredentials
    }
}

impl TryFrom<LoginForm> for LoginFormPayload {
    type Error = LoginFormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        value.validate()?;
        // Passwords are compared verbatim; only the username is trimmed.
        let username = value.username.trim().to_string();
        if username.is_empty() {
            return Err(LoginFormError::MissingCredentials);
        }
        Ok(Self {
            username,
            password: value.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_fields() {
        let form = LoginForm {
            username: "admin".to_string(),
            password: String::new(),
        };
        let err = LoginFormPayload::try_from(form).unwrap_err();
        assert_eq!(err.to_string(), "Please enter both username and password");
    }

    #[test]
    fn trims_username_only() {
        let form = LoginForm {
            username: " admin ".to_string(),
            password: " pw ".to_string(),
        };
        let payload = LoginFormPayload::try_from(form).unwrap();
        assert_eq!(payload.username, "admin");
        assert_eq!(payload.password, " pw ");
    }
}
