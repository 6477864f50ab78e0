use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::ScanOutcome;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub initial_files_scanned: u64,
    pub initial_last_scan: String,
    pub scan_duration_ms: u64,
    pub toast_ttl_ms: u64,
    /// Scripted scan results, used in order and then repeated.
    pub outcomes: Vec<ScanOutcome>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_files_scanned: 12547,
            initial_last_scan: "2 hours ago".to_string(),
            scan_duration_ms: 3000,
            toast_ttl_ms: 4000,
            outcomes: vec![
                ScanOutcome { threats: 2, files: 1543 },
                ScanOutcome { threats: 0, files: 1289 },
                ScanOutcome { threats: 3, files: 2210 },
            ],
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outcomes.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one scan outcome is required".to_string(),
            ));
        }
        if self.toast_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "toast_ttl_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_millis(self.scan_duration_ms)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }
}
