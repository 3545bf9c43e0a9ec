//! Handles settings for the application. Configuration is written in
//! `gasolio.toml`; every key has a default, so the file itself is optional.
//! Environment variables with the `GASOLIO` prefix override the file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level for the env filter (`trace`..`error`).
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Store {
    pub path: String,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            path: "./gasolio.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Report {
    /// Timezone the month and year report windows are anchored in.
    pub timezone: String,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            timezone: "Europe/Rome".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub store: Store,
    pub server: Server,
    pub report: Report,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("gasolio").required(false))
            .add_source(Environment::with_prefix("GASOLIO").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
