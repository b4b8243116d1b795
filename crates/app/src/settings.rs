//! Handles settings for the application. Configuration is written in
//! `settings.toml`, and every key can be overridden from the environment
//! with the `FINPLAN__` prefix (e.g. `FINPLAN__SERVER__PORT=8080`).
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub session_ttl_minutes: Option<i64>,
    pub database: Database,
}

impl Server {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            self.session_ttl_minutes
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .add_source(Environment::with_prefix("FINPLAN").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
