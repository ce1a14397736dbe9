//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub local: LocalConfig,
    pub sheets: SheetsConfig,
}

/// Which storage backend holds the ledgers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// CSV files in a local data directory.
    #[default]
    Local,
    /// Google Sheets spreadsheets.
    Sheets,
}

/// Storage backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: Backend,
}

/// Local CSV backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    pub data_dir: PathBuf,
}

/// Google Sheets backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Path to the service-account key JSON file.
    pub credentials_path: PathBuf,
    pub attendance_spreadsheet_id: String,
    pub employees_spreadsheet_id: String,
    /// TTL for cached month reads, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    30
}

impl AppConfig {
    /// Get config file path (platform config directory).
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "timecard")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Default data directory for ledgers and logs.
    pub fn default_data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "timecard")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("timecard-data"))
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    ///
    /// Sheets settings are only required when the sheets backend is
    /// selected; missing credentials must fail here, once, at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("Data directory cannot be empty".to_string()));
        }

        if self.storage.backend == Backend::Sheets {
            if self.sheets.credentials_path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "Service account key path is required for the sheets backend".to_string(),
                ));
            }
            if self.sheets.attendance_spreadsheet_id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Attendance spreadsheet id is required for the sheets backend".to_string(),
                ));
            }
            if self.sheets.employees_spreadsheet_id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Employees spreadsheet id is required for the sheets backend".to_string(),
                ));
            }
            if self.sheets.cache_ttl_secs < 1 {
                return Err(ConfigError::Validation(
                    "Cache TTL must be at least 1 second".to_string(),
                ));
            }
            if self.sheets.cache_ttl_secs > 3600 {
                return Err(ConfigError::Validation(
                    "Cache TTL cannot exceed 1 hour".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            data_dir: AppConfig::default_data_dir(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("service_account.json"),
            attendance_spreadsheet_id: String::new(),
            employees_spreadsheet_id: String::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}
