//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const CONFIG_FILE_NAME: &str = "config.json";

/// CLI configuration, loaded from `~/.huddle/config.json` with environment
/// overrides (`HUDDLE_API_URL`, `HUDDLE_LOG_LEVEL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the calendar API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration for the given base directory, falling back to
    /// defaults when no config file exists.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let config_path = base_dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };
        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn load_from_env(&mut self) {
        if let Some(url) = non_empty_env("HUDDLE_API_URL") {
            self.api_url = url;
        }
        if let Some(level) = non_empty_env("HUDDLE_LOG_LEVEL") {
            self.log_level = level;
        }
    }
}

/// Base directory for runtime files. Defaults to `~/.huddle`.
pub fn base_dir(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".huddle"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
