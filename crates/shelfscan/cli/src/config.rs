//! CLI configuration

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Backend endpoint
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,

    /// Directory holding the durable storage and cookie files
    pub data_dir: Option<PathBuf>,

    /// Refuse to run when the device identity cannot be stored
    pub require_persistence: Option<bool>,

    /// How long API calls wait for the device identity, in milliseconds
    pub ready_wait_ms: Option<u64>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => match Self::default_config_path() {
                Ok(path) => path,
                Err(_) => return Ok(CliConfig::default()),
            },
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Profile directory: explicit setting, else `<data_dir>/shelfscan`
    pub fn resolve_data_dir(&self, flag: Option<PathBuf>) -> CliResult<PathBuf> {
        if let Some(dir) = flag.or_else(|| self.data_dir.clone()) {
            return Ok(dir);
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CliError::Config("Cannot find data directory".into()))?;
        Ok(data_dir.join("shelfscan"))
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("shelfscan").join("config.toml"))
    }
}
