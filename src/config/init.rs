// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates mintwatch.yml template files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

/// Write a template config into `dir`, returning its path.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::default());
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    let retry = &config.retry;
    format!(
        r#"retry:
  # No automatic retry once this much time has passed since the first attempt
  max_retry_window: {}
  max_retry_attempts: {}
  max_cooldown_attempts: {}
  base_delay: {}
  # Rate/subscription cooldowns; must be longer than base_delay
  cooldown_base_delay: {}
  # Exponential backoff cap; must be longer than the cooldown (at least 60s)
  max_backoff: {}
webhook:
  enabled: {}
  timeout: {}
"#,
        seconds(retry.max_retry_window),
        retry.max_retry_attempts,
        retry.max_cooldown_attempts,
        seconds(retry.base_delay),
        seconds(retry.cooldown_base_delay),
        seconds(retry.max_backoff),
        config.webhook.enabled,
        seconds(config.webhook.timeout),
    )
}

fn seconds(duration: std::time::Duration) -> String {
    format!("{}s", duration.as_secs())
}
