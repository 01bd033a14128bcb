use std::env;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub session_ttl: Duration,
}

impl Config {
    /// Reads configuration from the environment; `main` loads `.env` first.
    pub fn from_env() -> Config {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:warbler.db".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8000);

        let ttl_hours = env::var("WARBLER_SESSION_TTL_HOURS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(24);

        Config {
            database_url,
            port,
            session_ttl: Duration::hours(ttl_hours),
        }
    }
}
