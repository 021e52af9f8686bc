//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// File locations for the three persistence backends. The load chain tries
/// them in the order database, JSON, XML.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub database_path: String,
    pub books_json: String,
    pub readers_json: String,
    pub books_xml: String,
    pub readers_xml: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub output_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LECTORIUM_)
            .add_source(
                Environment::with_prefix("LECTORIUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "library.db".to_string(),
            books_json: "books.json".to_string(),
            readers_json: "readers.json".to_string(),
            books_xml: "books.xml".to_string(),
            readers_xml: "readers.xml".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "library_report.html".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
