use serde::Serialize;

use crate::auth::{issue_token, verify_password};
use crate::forms::auth::LoginFormPayload;
use crate::models::config::ServerConfig;

use super::{ServiceError, ServiceResult};

/// Response body of `POST /api/admin/login`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
}

/// Check the submitted credentials against the configured admin and issue a
/// bearer token.
pub fn login(payload: LoginFormPayload, config: &ServerConfig) -> ServiceResult<LoginResponse> {
    // The hash is checked even for an unknown username so both rejections
    // take the same time.
    let known_user = payload.username == config.admin.username;
    let password_ok = match verify_password(&payload.password, &config.admin.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            log::error!("Failed to verify admin password: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if !(known_user && password_ok) {
        log::warn!("Rejected login for {}", payload.username);
        return Err(ServiceError::Unauthorized);
    }

    match issue_token(&payload.username, &config.secret, config.token_ttl_hours) {
        Ok(token) => {
            log::info!("{} logged in", payload.username);
            Ok(LoginResponse {
                token,
                token_type: "bearer",
            })
        }
        Err(e) => {
            log::error!("Failed to issue token: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_token;
    use crate::models::config::AdminConfig;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    fn config(password_hash: String) -> ServerConfig {
        ServerConfig {
            address: "127.0.0.1".into(),
            port: 8080,
            database_url: ":memory:".into(),
            secret: "test-secret".into(),
            templates_dir: "templates/**/*".into(),
            upload_dir: "uploads".into(),
            token_ttl_hours: 24,
            admin: AdminConfig {
                username: "admin".into(),
                password_hash,
            },
        }
    }

    fn hashed(password: &str) -> String {
        let salt = SaltString::from_b64("c29tZXNhbHRzb21lc2FsdA").unwrap();
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn payload(username: &str, password: &str) -> LoginFormPayload {
        LoginFormPayload {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn issues_bearer_token_for_valid_credentials() {
        let config = config(hashed("admin123"));

        let response = login(payload("admin", "admin123"), &config).unwrap();

        assert_eq!(response.token_type, "bearer");
        let claims = verify_token(&response.token, &config.secret).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn rejects_wrong_username_or_password() {
        let config = config(hashed("admin123"));

        assert_eq!(
            login(payload("root", "admin123"), &config).unwrap_err(),
            ServiceError::Unauthorized
        );
        assert_eq!(
            login(payload("admin", "admin1234"), &config).unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[test]
    fn unknown_username_still_checks_the_hash() {
        let config = config("plain-text".into());
        assert_eq!(
            login(payload("root", "admin123"), &config).unwrap_err(),
            ServiceError::Internal
        );
    }

    #[test]
    fn malformed_hash_is_internal() {
        let config = config("plain-text".into());
        assert_eq!(
            login(payload("admin", "admin123"), &config).unwrap_err(),
            ServiceError::Internal
        );
    }
}
