// ABOUTME: Retry policies and the decision handed to callers after a failure.
// ABOUTME: A decision says whether, how often, and after what delay to retry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// Retrying cannot succeed.
    NotRetryable,
    /// Transient failure; retry after a (possibly growing) delay.
    RetryableWithDelay,
    /// Rate or quota limit; retry after a cooldown.
    RetryableWithCooldown,
    /// A user action (KYC, funding, upgrade) is needed first.
    RetryableAfterRemediation,
    /// An operator must fix configuration first.
    RetryableAfterConfiguration,
}

impl RetryPolicy {
    pub const ALL: [RetryPolicy; 5] = [
        RetryPolicy::NotRetryable,
        RetryPolicy::RetryableWithDelay,
        RetryPolicy::RetryableWithCooldown,
        RetryPolicy::RetryableAfterRemediation,
        RetryPolicy::RetryableAfterConfiguration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RetryPolicy::NotRetryable => "NotRetryable",
            RetryPolicy::RetryableWithDelay => "RetryableWithDelay",
            RetryPolicy::RetryableWithCooldown => "RetryableWithCooldown",
            RetryPolicy::RetryableAfterRemediation => "RetryableAfterRemediation",
            RetryPolicy::RetryableAfterConfiguration => "RetryableAfterConfiguration",
        }
    }

    /// Whether the policy ever permits a retry without outside action.
    pub fn is_automatic(self) -> bool {
        matches!(
            self,
            RetryPolicy::RetryableWithDelay | RetryPolicy::RetryableWithCooldown
        )
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RetryPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownPolicy(s.to_string()))
    }
}

/// Client-visible retry guidance for one failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryDecision {
    pub policy: RetryPolicy,
    pub max_retry_attempts: u32,
    pub suggested_delay_seconds: u64,
    pub use_exponential_backoff: bool,
    pub explanation: String,
    pub remediation_guidance: Option<String>,
}

impl RetryDecision {
    pub(crate) fn not_retryable(explanation: &str, guidance: Option<&str>) -> Self {
        Self {
            policy: RetryPolicy::NotRetryable,
            max_retry_attempts: 0,
            suggested_delay_seconds: 0,
            use_exponential_backoff: false,
            explanation: explanation.to_string(),
            remediation_guidance: guidance.map(str::to_string),
        }
    }

    pub(crate) fn with_delay(attempts: u32, delay_seconds: u64, explanation: &str) -> Self {
        Self {
            policy: RetryPolicy::RetryableWithDelay,
            max_retry_attempts: attempts,
            suggested_delay_seconds: delay_seconds,
            use_exponential_backoff: true,
            explanation: explanation.to_string(),
            remediation_guidance: None,
        }
    }

    pub(crate) fn with_cooldown(attempts: u32, cooldown_seconds: u64, explanation: &str) -> Self {
        Self {
            policy: RetryPolicy::RetryableWithCooldown,
            max_retry_attempts: attempts,
            suggested_delay_seconds: cooldown_seconds,
            use_exponential_backoff: false,
            explanation: explanation.to_string(),
            remediation_guidance: None,
        }
    }

    pub(crate) fn after_remediation(explanation: &str, guidance: &str) -> Self {
        Self {
            policy: RetryPolicy::RetryableAfterRemediation,
            max_retry_attempts: 0,
            suggested_delay_seconds: 0,
            use_exponential_backoff: false,
            explanation: explanation.to_string(),
            remediation_guidance: Some(guidance.to_string()),
        }
    }

    pub(crate) fn after_configuration(explanation: &str, guidance: &str) -> Self {
        Self {
            policy: RetryPolicy::RetryableAfterConfiguration,
            max_retry_attempts: 0,
            suggested_delay_seconds: 0,
            use_exponential_backoff: false,
            explanation: explanation.to_string(),
            remediation_guidance: Some(guidance.to_string()),
        }
    }
}
