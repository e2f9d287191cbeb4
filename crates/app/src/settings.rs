//! Handles settings for the application. Configuration is written in
//! `settings.toml`; any key can be overridden from the environment with the
//! `HOUSEHOLD_` prefix, e.g. `HOUSEHOLD_SERVER__PORT=8080`.
//!
//! See `settings.toml` for an example.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub port: u16,
    pub bind: Option<String>,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Household {
    pub user1: String,
    pub user2: String,
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    pub base_url: String,
    pub client_id: String,
    pub secret: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_page_size() -> usize {
    500
}

fn default_max_records() -> usize {
    5_000
}

impl Feed {
    pub fn client_config(&self) -> bank_feed::FeedConfig {
        bank_feed::FeedConfig {
            base_url: self.base_url.clone(),
            client_id: self.client_id.clone(),
            secret: self.secret.clone(),
        }
    }

    pub fn sync_limits(&self) -> engine::SyncLimits {
        engine::SyncLimits {
            page_size: self.page_size,
            max_records: self.max_records,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub household: Household,
    pub feed: Feed,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("HOUSEHOLD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if settings.feed.page_size == 0 || settings.feed.max_records == 0 {
            return Err(ConfigError::Message(
                "feed.page_size and feed.max_records must be positive".to_string(),
            ));
        }
        Ok(settings)
    }
}
