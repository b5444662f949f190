//! Environment-driven configuration.
//!
//! Call `dotenvy::dotenv()` before [`Config::from_env`] to pick up a local
//! `.env` file; every variable is documented in `.env.example`.

#![allow(missing_docs)]

use crate::types::{AppError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file; `:memory:` for an ephemeral database.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token validity window in seconds.
    pub token_expiry_secs: i64,
    /// Optional bootstrap credentials; when both are set and the email is
    /// unused, an admin account is created at startup.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid PORT: {}", e)))?,
            },
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "shoprate.db".to_string()),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| AppError::Internal("JWT_SECRET must be set".to_string()))?,
                token_expiry_secs: env::var("TOKEN_EXPIRY_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .map_err(|e| {
                        AppError::Internal(format!("Invalid TOKEN_EXPIRY_SECS: {}", e))
                    })?,
                admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
                admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            },
        })
    }
}
