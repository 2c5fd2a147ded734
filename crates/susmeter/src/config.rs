//! Configuration management for susmeter.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::survey::ValidationMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "susmeter";

/// Default JSON history file name.
const HISTORY_FILE_NAME: &str = "sus_results.json";

/// Default `SQLite` database file name.
const DATABASE_FILE_NAME: &str = "sus_results.db";

/// Default CSV mirror file name.
const EXPORT_FILE_NAME: &str = "sus_results.csv";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SUSMETER_`)
/// 2. TOML config file at `~/.config/susmeter/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Survey configuration.
    pub survey: SurveyConfig,
}

/// Which durable store holds the result history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// A JSON array file, rewritten under a lock file on every append.
    #[default]
    Json,
    /// A `SQLite` database.
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// History backend.
    pub backend: StorageBackend,
    /// Directory holding the history, database and CSV mirror.
    /// Defaults to `~/.local/share/susmeter`
    pub data_dir: Option<PathBuf>,
    /// JSON history file, relative to `data_dir` unless absolute.
    pub history_file: PathBuf,
    /// `SQLite` database file, relative to `data_dir` unless absolute.
    pub database_file: PathBuf,
    /// CSV mirror file, relative to `data_dir` unless absolute.
    pub export_file: PathBuf,
    /// Regenerate the CSV mirror after every submission.
    pub csv_mirror: bool,
    /// How long a writer waits for the history lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

/// Survey-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Reject submissions with missing or out-of-range answers.
    /// When false, missing answers count as 0.
    pub strict_validation: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: None, // Will be resolved to default at runtime
            history_file: PathBuf::from(HISTORY_FILE_NAME),
            database_file: PathBuf::from(DATABASE_FILE_NAME),
            export_file: PathBuf::from(EXPORT_FILE_NAME),
            csv_mirror: true,
            lock_timeout_ms: 5_000,
        }
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            strict_validation: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `SUSMETER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("SUSMETER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "lock_timeout_ms must be greater than 0".to_string(),
            });
        }

        for (name, path) in [
            ("history_file", &self.storage.history_file),
            ("database_file", &self.storage.database_file),
            ("export_file", &self.storage.export_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        if self.storage.csv_mirror {
            let export = self.export_path();
            for (name, path) in [
                ("history_file", self.history_path()),
                ("database_file", self.database_path()),
            ] {
                if export == path {
                    return Err(Error::ConfigValidation {
                        message: format!("export_file must differ from {name}"),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the JSON history path.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.resolve(&self.storage.history_file)
    }

    /// Get the `SQLite` database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.storage.database_file)
    }

    /// Get the CSV mirror path.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.resolve(&self.storage.export_file)
    }

    /// Path of the durable history for the configured backend.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        match self.storage.backend {
            StorageBackend::Json => self.history_path(),
            StorageBackend::Sqlite => self.database_path(),
        }
    }

    /// Get the lock timeout as a Duration.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.lock_timeout_ms)
    }

    /// Validation mode for submitted answers.
    #[must_use]
    pub fn validation_mode(&self) -> ValidationMode {
        if self.survey.strict_validation {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir().join(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert!(config.storage.csv_mirror);
        assert!(config.survey.strict_validation);
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.data_dir.is_none());
        assert_eq!(storage.history_file, PathBuf::from("sus_results.json"));
        assert_eq!(storage.database_file, PathBuf::from("sus_results.db"));
        assert_eq!(storage.export_file, PathBuf::from("sus_results.csv"));
        assert_eq!(storage.lock_timeout_ms, 5_000);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_lock_timeout() {
        let mut config = Config::default();
        config.storage.lock_timeout_ms = 0;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("lock_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_file_name() {
        let mut config = Config::default();
        config.storage.export_file = PathBuf::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("export_file"));
    }

    #[test]
    fn test_validate_mirror_overwrites_history() {
        let mut config = Config::default();
        config.storage.export_file = PathBuf::from("sus_results.json");

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must differ"));

        config.storage.csv_mirror = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_mirror_overwrites_database() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.export_file = PathBuf::from("sus_results.db");
        assert_eq!(config.export_path(), config.store_path());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("export_file must differ from database_file"));

        config.storage.csv_mirror = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_mirror_checks_inactive_backend_file() {
        let mut config = Config::default();
        config.storage.export_file = PathBuf::from("sus_results.db");

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database_file"));
    }

    #[test]
    fn test_paths_resolve_against_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/sus"));

        assert_eq!(config.history_path(), PathBuf::from("/srv/sus/sus_results.json"));
        assert_eq!(config.database_path(), PathBuf::from("/srv/sus/sus_results.db"));
        assert_eq!(config.export_path(), PathBuf::from("/srv/sus/sus_results.csv"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/sus"));
        config.storage.export_file = PathBuf::from("/var/www/export.csv");

        assert_eq!(config.export_path(), PathBuf::from("/var/www/export.csv"));
    }

    #[test]
    fn test_store_path_follows_backend() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/sus"));
        assert!(config.store_path().ends_with("sus_results.json"));

        config.storage.backend = StorageBackend::Sqlite;
        assert!(config.store_path().ends_with("sus_results.db"));
    }

    #[test]
    fn test_data_dir_default() {
        let config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("susmeter"));
    }

    #[test]
    fn test_lock_timeout() {
        let config = Config::default();
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validation_mode() {
        let mut config = Config::default();
        assert_eq!(config.validation_mode(), ValidationMode::Strict);

        config.survey.strict_validation = false;
        assert_eq!(config.validation_mode(), ValidationMode::Lenient);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("susmeter"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\nbackend = \"sqlite\"\ncsv_mirror = false\n\n[survey]\nstrict_validation = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(!config.storage.csv_mirror);
        assert!(!config.survey.strict_validation);
        assert_eq!(config.storage.lock_timeout_ms, 5_000);
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nlock_timeout_ms = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_backend_serialize() {
        assert_eq!(
            serde_json::to_string(&StorageBackend::Sqlite).unwrap(),
            "\"sqlite\""
        );
        assert_eq!(StorageBackend::Json.to_string(), "json");
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"backend": "sqlite", "lock_timeout_ms": 750}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.backend, StorageBackend::Sqlite);
        assert_eq!(storage.lock_timeout_ms, 750);
        assert!(storage.csv_mirror);
    }
}
