use serde::Deserialize;

/// Credentials of the single administrator account.
#[derive(Clone, Debug, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2 PHC string, see the `hash-password` binary.
    pub password_hash: String,
}

/// Configuration options of the CouponDeck service.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Signs bearer tokens and session cookies. At least 64 bytes.
    pub secret: String,
    pub templates_dir: String,
    /// Directory uploaded logos are written to and served from `/uploads`.
    pub upload_dir: String,
    pub token_ttl_hours: i64,
    pub admin: AdminConfig,
}
