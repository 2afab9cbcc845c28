use anyhow::{Context, Result};

/// Base URL of the hosted identity provider when `IDENTITY_API_URL` is not
/// set, per environment (`APP_ENV`).
const IDENTITY_API_PROD: &str = "https://identity.example.com/api";
const IDENTITY_API_DEV: &str = "http://localhost:9090/api";

/// Application configuration loaded from environment variables.
/// Startup fails with context if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub auth_secret: String,
    pub identity_api_url: String,
    pub identity_service_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let identity_fallback = if app_env == "production" {
            IDENTITY_API_PROD
        } else {
            IDENTITY_API_DEV
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            auth_secret: require_env("AUTH_SECRET")?,
            identity_api_url: std::env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| identity_fallback.to_string()),
            identity_service_key: require_env("IDENTITY_SERVICE_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
