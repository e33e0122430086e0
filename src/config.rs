//! Configuration for the epiwear pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the pipeline.
///
/// The API bearer token is deliberately not stored here; it comes from the
/// `EPIWEAR_API_TOKEN` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the research platform API
    pub api_base_url: String,

    /// Sensor channels to synchronize and extract features from
    pub sensors: Vec<String>,

    /// Preictal horizon before seizure onset, in minutes
    pub preictal_minutes: i64,

    /// Fixed window size override (ms); defaults to the shortest annotated
    /// seizure duration when unset
    pub window_ms: Option<i64>,

    /// Apply min-max normalization before windowing
    pub normalize: bool,

    /// Path for exported feature tables
    pub export_path: PathBuf,

    /// Path for state storage
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("epiwear");

        Self {
            api_base_url: "https://api.research-platform.example".to_string(),
            sensors: vec![
                "Acc Mag".to_string(),
                "TEMP".to_string(),
                "EDA".to_string(),
            ],
            preictal_minutes: 30,
            window_ms: None,
            normalize: false,
            export_path: data_dir.join("exports"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("epiwear")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Preictal horizon in milliseconds.
    pub fn preictal_ms(&self) -> i64 {
        self.preictal_minutes * 60 * 1000
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
