use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Missing `TG_TOKEN` or `AI_API_KEY` aborts startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub tg_token: String,
    pub ai_api_key: String,
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            tg_token: require_env("TG_TOKEN")?,
            ai_api_key: require_env("AI_API_KEY")?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:kwork_bot.db?mode=rwc".to_string()),
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
