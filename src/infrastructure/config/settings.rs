use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend type: "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// How long a processed notification id is remembered for duplicate detection
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: u64,
    /// Cleanup task interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Maximum number of envelopes processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_backend() -> String {
    "memory".to_string()
}

fn default_retention_seconds() -> u64 {
    604_800 // 7 days
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_concurrency() -> usize {
    4
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .set_default("store.backend", "memory")?
            .set_default("store.retention_seconds", 604_800)?
            .set_default("store.cleanup_interval_seconds", 300)?
            .set_default("worker.concurrency", 4)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // LOG__LEVEL, STORE__RETENTION_SECONDS, WORKER__CONCURRENCY, etc.
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            store: StoreConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            retention_seconds: default_retention_seconds(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.store.retention_seconds, 604_800);
        assert_eq!(settings.worker.concurrency, 4);
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
