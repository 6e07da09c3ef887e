//! Environment-driven server configuration.

use std::env;
use tracing::warn;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

/// Runtime settings, all overridable through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    /// Read settings from the environment, falling back to dev defaults.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "ratehub.db".to_string());
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️ JWT_SECRET not set, using development default");
            DEFAULT_JWT_SECRET.to_string()
        });
        let admin_email =
            env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@ratehub.local".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin@123".to_string());

        Self {
            port,
            database_path,
            jwt_secret,
            admin_email,
            admin_password,
        }
    }
}
