//! Bearer-token authentication for the admin surface.
//!
//! Tokens are HS256 JWTs signed with the server secret. API clients send
//! them in the `Authorization: Bearer` header; the HTML admin keeps the same
//! token as its session identity.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::config::ServerConfig;
use crate::routes::ErrorDetail;

/// Claims carried by an admin bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminClaims {
    /// Admin username.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("Token does not belong to the configured admin")]
    UnknownSubject,
    #[error("Server configuration is not available")]
    MissingConfig,
    #[error("Stored password hash is malformed")]
    MalformedPasswordHash,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingConfig | AuthError::MalformedPasswordHash => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
            .json(ErrorDetail::new(self.to_string()))
    }
}

/// Sign a token for `username` valid for `ttl_hours`.
pub fn issue_token(username: &str, secret: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = AdminClaims {
        sub: username.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };
    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Check the signature and expiry of `token`.
pub fn verify_token(token: &str, secret: &str) -> Result<AdminClaims, AuthError> {
    let data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Check `password` against an Argon2 PHC string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| AuthError::MalformedPasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// An authenticated administrator.
///
/// Extraction fails with `401` when neither a bearer header nor a session
/// identity carries a valid token. Wrap it in `Option` to handle the
/// unauthenticated case in the handler instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub username: String,
    pub token: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}

fn session_token(req: &HttpRequest) -> Option<String> {
    req.get_identity().ok()?.id().ok()
}

fn authenticate(req: &HttpRequest) -> Result<AdminUser, AuthError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or(AuthError::MissingConfig)?;

    let token = bearer_token(req)
        .or_else(|| session_token(req))
        .ok_or(AuthError::MissingToken)?;

    let claims = verify_token(&token, &config.secret)?;
    if claims.sub != config.admin.username {
        return Err(AuthError::UnknownSubject);
    }

    Ok(AdminUser {
        username: claims.sub,
        token,
    })
}

impl FromRequest for AdminUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = authenticate(req);
        if let Err(AuthError::MissingConfig) = &result {
            log::error!("ServerConfig is not registered as app data");
        }
        ready(result)
    }
}
