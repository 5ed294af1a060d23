use std::path::PathBuf;

use anyhow::Context;

/// Runtime configuration read from the environment (`.env` supported via
/// dotenvy in `main.rs`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Required.
    pub database_url: String,
    /// HMAC secret for bearer tokens.
    pub jwt_secret: String,
    /// External base URL used when building attachment URLs.
    pub app_url: String,
    /// Socket address the server binds to.
    pub bind_addr: String,
    /// Root directory served under `/public` and used for uploads.
    pub public_dir: PathBuf,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let public_dir =
            PathBuf::from(std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()));

        let token_ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(60);

        Ok(Self {
            database_url,
            jwt_secret,
            app_url,
            bind_addr,
            public_dir,
            token_ttl_minutes,
        })
    }
}
