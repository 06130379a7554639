//! Provider configuration
//!
//! Resolved from `config.toml` in the user's config directory (or the file
//! named by `HINDSIGHT_CONFIG`), then overridden by environment variables.
//! A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const CONFIG_ENV: &str = "HINDSIGHT_CONFIG";
pub const API_KEY_ENV: &str = "TWELVEDATA_API_KEY";

const CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
// Provider maximum; its default of 30 rows would cut long ranges short
const DEFAULT_OUTPUT_SIZE: u32 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub output_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_size: DEFAULT_OUTPUT_SIZE,
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load a TOML file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            None => "(not set)".to_string(),
            Some(key) => {
                let chars: Vec<char> = key.chars().collect();
                if chars.len() <= 4 {
                    "*".repeat(chars.len())
                } else {
                    let visible: String = chars[chars.len() - 4..].iter().collect();
                    format!("{}{}", "*".repeat(chars.len() - 4), visible)
                }
            }
        }
    }
}

/// Where the config file is read from
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let config_dir =
        dir_spec::config_home().ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("hindsight").join(CONFIG_FILENAME))
}
