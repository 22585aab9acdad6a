// ABOUTME: Configuration types and parsing for mintwatch.yml.
// ABOUTME: Handles YAML parsing, file discovery, and consistency checks.

mod init;
mod retry;
mod webhook;

pub use init::init_config;
pub use retry::{MIN_RATE_LIMIT_COOLDOWN, RetrySettings};
pub use webhook::WebhookSettings;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "mintwatch.yml";
pub const CONFIG_FILENAME_ALT: &str = "mintwatch.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".mintwatch/config.yml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MINTWATCH_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub webhook: WebhookSettings,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find the config for `dir`.
    ///
    /// `MINTWATCH_CONFIG` wins when set; otherwise the well-known file names
    /// are tried in order.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(Error::ConfigNotFound(path));
            }
            return Self::load(&path);
        }

        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but falls back to defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) if std::env::var(CONFIG_ENV_VAR).is_err() => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(problem) = self.retry.problem() {
            return Err(Error::InvalidConfig(problem));
        }
        if self.webhook.timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "webhook.timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
