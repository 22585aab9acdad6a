// ABOUTME: Status-change webhook settings.
// ABOUTME: The timeout bounds a detached delivery; updates never wait on it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for WebhookSettings {
    fn default() -> Self {
        WebhookSettings {
            enabled: default_enabled(),
            timeout: default_timeout(),
        }
    }
}
