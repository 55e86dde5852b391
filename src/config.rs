//! Configuration management.
//!
//! Loads, parses and validates the optional TOML configuration file. All
//! service identifiers and endpoint URLs live here and are threaded
//! through component constructors; there is no process-wide mutable state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keyring service id the API token is stored under.
    pub service_id: String,
    /// Environment variable consulted before the keyring.
    pub token_env: String,
    pub api: ApiConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST entity endpoints.
    pub rest_url: String,
    /// URL of the sync endpoint (bulk read and command batches).
    pub sync_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_id: "doistkit".to_string(),
            token_env: "TODOIST_API_TOKEN".to_string(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://api.todoist.com/rest/v1".to_string(),
            sync_url: "https://api.todoist.com/sync/v8/sync".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        // 1. Current directory
        let current_dir_config = PathBuf::from("doistkit.toml");
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        // 2. XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("doistkit").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.service_id.is_empty() {
            anyhow::bail!("service_id must not be empty");
        }
        for (name, url) in [
            ("api.rest_url", &self.api.rest_url),
            ("api.sync_url", &self.api.sync_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }
        Ok(())
    }
}
