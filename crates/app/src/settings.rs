//! Settings for the `rewards` binary.
//!
//! Read from an optional `settings.toml` in the working directory, then
//! overridden by `REWARDS__`-prefixed environment variables, e.g.
//! `REWARDS__SERVER__PORT=9000`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Postgres(String),
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    pub search_ttl_secs: u64,
}

/// Gemini credentials; recommendations use the fallback rules without them.
#[derive(Debug, Deserialize)]
pub struct Ai {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub endpoint: Option<String>,
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_ai_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub cache: Cache,
    pub ai: Option<Ai>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.request_timeout_secs", 10)?
            .set_default("database", "memory")?
            .set_default("cache.search_ttl_secs", 300)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("REWARDS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
