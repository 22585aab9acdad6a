// ABOUTME: Retry policy limits: attempt ceilings, base delays, window and cap.
// ABOUTME: Consumed by the retry classifier; durations parse as humantime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Absolute cutoff after the first attempt; no automatic retry past it.
    #[serde(default = "default_max_retry_window", with = "humantime_serde")]
    pub max_retry_window: Duration,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    #[serde(default = "default_max_cooldown_attempts")]
    pub max_cooldown_attempts: u32,

    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,

    #[serde(default = "default_cooldown_base_delay", with = "humantime_serde")]
    pub cooldown_base_delay: Duration,

    #[serde(default = "default_max_backoff", with = "humantime_serde")]
    pub max_backoff: Duration,
}

/// Rate-limit cooldowns never go below one minute.
pub const MIN_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

fn default_max_retry_window() -> Duration {
    Duration::from_secs(600)
}

fn default_max_retry_attempts() -> u32 {
    5
}

fn default_max_cooldown_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_cooldown_base_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(300)
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_retry_window: default_max_retry_window(),
            max_retry_attempts: default_max_retry_attempts(),
            max_cooldown_attempts: default_max_cooldown_attempts(),
            base_delay: default_base_delay(),
            cooldown_base_delay: default_cooldown_base_delay(),
            max_backoff: default_max_backoff(),
        }
    }
}

impl RetrySettings {
    /// Describe the first inconsistency, if any.
    pub fn problem(&self) -> Option<String> {
        if self.max_retry_window.is_zero() {
            return Some("retry.max_retry_window must be greater than zero".to_string());
        }
        if self.max_retry_attempts == 0 || self.max_cooldown_attempts == 0 {
            return Some("retry attempt ceilings must be at least 1".to_string());
        }
        if self.cooldown_base_delay <= self.base_delay {
            return Some("retry.cooldown_base_delay must be longer than retry.base_delay".to_string());
        }
        if self.max_backoff < self.base_delay {
            return Some("retry.max_backoff must not be shorter than retry.base_delay".to_string());
        }
        if self.max_backoff <= self.rate_limit_cooldown() {
            return Some(format!(
                "retry.max_backoff must be longer than the rate-limit cooldown ({}s)",
                self.rate_limit_cooldown().as_secs()
            ));
        }
        None
    }

    /// Base wait for cooldown policies: `cooldown_base_delay`, at least a minute.
    pub fn rate_limit_cooldown(&self) -> Duration {
        self.cooldown_base_delay.max(MIN_RATE_LIMIT_COOLDOWN)
    }
}
