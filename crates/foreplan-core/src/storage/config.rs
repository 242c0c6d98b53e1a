//! TOML-based application configuration.
//!
//! Stores GitHub API access settings and evaluation tuning at
//! `~/.config/foreplan/config.toml`. Every field carries a serde default,
//! so partial files and a missing file both work.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

use super::config_dir;

/// GitHub API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubConfig {
    /// API root, overridable for GitHub Enterprise or tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Evaluation tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationConfig {
    /// Fixed seed for the weight noise; drawn at random when unset.
    #[serde(default)]
    pub noise_seed: Option<u64>,
    /// How far back to fetch commit history, in days.
    #[serde(default = "default_commit_window_days")]
    pub commit_window_days: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/foreplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

// Default functions
fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_per_page() -> u32 {
    100
}
fn default_commit_window_days() -> u32 {
    90
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            per_page: default_per_page(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            noise_seed: None,
            commit_window_days: default_commit_window_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GithubConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
