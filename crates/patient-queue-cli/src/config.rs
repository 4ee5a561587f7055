//! Application configuration.
//!
//! Layers, lowest first: built-in defaults, an optional TOML file, then
//! `PATIENT_QUEUE__*` environment variables. Command-line flags are applied
//! on top by `main`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use patient_queue_core::QueueConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_DATABASE_PATH: &str = "patient_queue.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const ENV_PREFIX: &str = "PATIENT_QUEUE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// `tracing` filter directive
    pub log_level: String,
    pub queue: QueueConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            queue: QueueConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the layered configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_queue_core::WaitTimeMetric;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.queue, QueueConfig::default());
        assert_eq!(AppConfig::default().database_path, PathBuf::from("patient_queue.db"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
database_path = "/var/lib/queue/front-desk.db"

[queue]
estimated_service_minutes = 20
wait_time_metric = "until_completion"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/queue/front-desk.db")
        );
        assert_eq!(config.queue.estimated_service_minutes, 20);
        assert_eq!(config.queue.wait_time_metric, WaitTimeMetric::UntilCompletion);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }
}
