// ABOUTME: Maps error codes and categories to retry decisions.
// ABOUTME: Also decides retry eligibility and computes backoff delays.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::policy::{RetryDecision, RetryPolicy};
use super::taxonomy::{DeploymentError, DeploymentErrorCategory, ErrorCode};
use crate::config::RetrySettings;

/// Subscription quotas reset on a much longer horizon than rate limits.
const SUBSCRIPTION_COOLDOWN: Duration = Duration::from_secs(3600);

/// Single source of truth for whether a failure may be retried.
#[derive(Debug, Clone, Default)]
pub struct RetryClassifier {
    settings: RetrySettings,
}

impl RetryClassifier {
    pub fn new(settings: RetrySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    /// Classify a failure by code, falling back to `category` for codes
    /// without a dedicated entry.
    ///
    /// Codes are matched case-insensitively. An unrecognized code with no
    /// category is classified as [`DeploymentErrorCategory::Unknown`].
    pub fn classify_error(
        &self,
        error_code: &str,
        category: Option<DeploymentErrorCategory>,
    ) -> RetryDecision {
        let decision = match error_code.parse::<ErrorCode>() {
            Ok(code) => self.classify_code(code),
            Err(_) => {
                self.classify_category(category.unwrap_or(DeploymentErrorCategory::Unknown))
            }
        };

        tracing::debug!(
            error_code,
            ?category,
            policy = %decision.policy,
            max_retry_attempts = decision.max_retry_attempts,
            "classified error"
        );

        decision
    }

    /// Classify a [`DeploymentError`] by its code, or by its category alone.
    pub fn classify(&self, error: &DeploymentError) -> RetryDecision {
        self.classify_error(error.code_or_category(), Some(error.category))
    }

    pub fn classify_code(&self, code: ErrorCode) -> RetryDecision {
        let base = self.base_delay_seconds();
        let attempts = self.settings.max_retry_attempts;

        match code {
            ErrorCode::Unauthorized | ErrorCode::Forbidden | ErrorCode::InvalidAuthToken => {
                RetryDecision::not_retryable(
                    "Authentication or authorization failed; requests are never replayed automatically.",
                    Some("Re-authenticate and confirm the account has permission to deploy."),
                )
            }
            ErrorCode::AlreadyExists | ErrorCode::Conflict => RetryDecision::not_retryable(
                "The resource already exists or is in a conflicting state.",
                Some("Check the existing deployment before submitting a new one."),
            ),
            ErrorCode::MissingRequiredField
            | ErrorCode::InvalidNetwork
            | ErrorCode::InvalidTokenParameters
            | ErrorCode::MetadataValidationFailed
            | ErrorCode::InvalidTokenStandard => RetryDecision::not_retryable(
                "The request is invalid; retrying it unchanged cannot succeed.",
                Some("Correct the request parameters and submit again."),
            ),
            ErrorCode::Timeout => RetryDecision::with_delay(
                attempts,
                base,
                "The operation timed out; it may succeed on retry.",
            ),
            ErrorCode::ExternalServiceError => RetryDecision::with_delay(
                attempts,
                base.saturating_mul(2),
                "A downstream service failed transiently.",
            ),
            ErrorCode::BlockchainConnectionError => RetryDecision::with_delay(
                attempts,
                base.saturating_mul(2),
                "The blockchain node could not be reached.",
            ),
            ErrorCode::GasEstimationFailed => RetryDecision::with_delay(
                attempts,
                base.saturating_mul(2),
                "Gas estimation failed; network conditions may have changed.",
            ),
            ErrorCode::TransactionFailed | ErrorCode::TransactionRejected => {
                RetryDecision::with_delay(
                    attempts,
                    base.saturating_mul(3),
                    "The transaction did not go through; it can be resubmitted.",
                )
            }
            ErrorCode::RateLimitExceeded => self.rate_limit_decision(),
            ErrorCode::SubscriptionLimitReached => {
                let cooldown = SUBSCRIPTION_COOLDOWN
                    .max(self.rate_limit_cooldown().saturating_mul(2))
                    .as_secs();
                RetryDecision::with_cooldown(
                    1,
                    cooldown,
                    "The subscription quota for this period is used up.",
                )
            }
            ErrorCode::KycNotVerified => RetryDecision::after_remediation(
                "Identity verification is required before deploying.",
                "Complete KYC verification, then retry the deployment.",
            ),
            ErrorCode::FeatureNotAvailable => RetryDecision::after_remediation(
                "This feature is not included in the current plan.",
                "Upgrade the subscription plan to enable this feature, then retry.",
            ),
            ErrorCode::EntitlementLimitExceeded => RetryDecision::after_remediation(
                "The plan's entitlement limit has been reached.",
                "Upgrade the plan or free up entitlement capacity, then retry.",
            ),
            ErrorCode::PriceNotConfigured => RetryDecision::after_configuration(
                "No price is configured for this deployment type.",
                "An operator must configure pricing for this network and token type.",
            ),
        }
    }

    pub fn classify_category(&self, category: DeploymentErrorCategory) -> RetryDecision {
        let base = self.base_delay_seconds();
        let attempts = self.settings.max_retry_attempts;

        match category {
            DeploymentErrorCategory::NetworkError => RetryDecision::with_delay(
                attempts,
                base.saturating_mul(2),
                "A network error occurred; it is usually transient.",
            ),
            DeploymentErrorCategory::TransactionFailure => RetryDecision::with_delay(
                attempts,
                base.saturating_mul(3),
                "The transaction failed; it can be resubmitted.",
            ),
            DeploymentErrorCategory::InternalError => RetryDecision::with_delay(
                attempts,
                base.saturating_mul(2),
                "An internal error occurred; it may clear on retry.",
            ),
            DeploymentErrorCategory::RateLimitExceeded => self.rate_limit_decision(),
            DeploymentErrorCategory::ValidationError => RetryDecision::not_retryable(
                "The request failed validation.",
                Some("Correct the request parameters and submit again."),
            ),
            DeploymentErrorCategory::ComplianceError => RetryDecision::not_retryable(
                "The deployment was blocked by a compliance check.",
                None,
            ),
            DeploymentErrorCategory::UserRejection => RetryDecision::not_retryable(
                "The user declined the transaction; it is not replayed automatically.",
                None,
            ),
            DeploymentErrorCategory::InsufficientFunds => RetryDecision::after_remediation(
                "The deploying account cannot cover the transaction fees.",
                "Fund the deploying account, then retry the deployment.",
            ),
            DeploymentErrorCategory::ConfigurationError => RetryDecision::after_configuration(
                "The service is misconfigured for this deployment.",
                "An operator must correct the service configuration before retrying.",
            ),
            DeploymentErrorCategory::Unknown => RetryDecision::not_retryable(
                "The failure could not be classified; it is not retried automatically.",
                Some("Inspect the technical error details before retrying manually."),
            ),
        }
    }

    /// Whether another automatic attempt is allowed right now.
    ///
    /// Uses the policy-wide ceiling from the settings. A [`RetryDecision`]
    /// can be tighter (a subscription limit allows a single attempt), so
    /// callers holding one should use [`RetryClassifier::should_retry_decision`].
    pub fn should_retry(
        &self,
        policy: RetryPolicy,
        attempt_count: u32,
        first_attempt_time: DateTime<Utc>,
    ) -> bool {
        self.should_retry_at(policy, attempt_count, first_attempt_time, Utc::now())
    }

    /// [`RetryClassifier::should_retry`] evaluated at `now`.
    pub fn should_retry_at(
        &self,
        policy: RetryPolicy,
        attempt_count: u32,
        first_attempt_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        let max_attempts = match policy {
            RetryPolicy::NotRetryable
            | RetryPolicy::RetryableAfterRemediation
            | RetryPolicy::RetryableAfterConfiguration => return false,
            RetryPolicy::RetryableWithDelay => self.settings.max_retry_attempts,
            RetryPolicy::RetryableWithCooldown => self.settings.max_cooldown_attempts,
        };

        // A first attempt stamped in the future counts as zero elapsed time.
        let elapsed = (now - first_attempt_time).to_std().unwrap_or(Duration::ZERO);

        attempt_count < max_attempts && elapsed < self.settings.max_retry_window
    }

    /// Like [`RetryClassifier::should_retry`], also bounded by the decision's
    /// own `max_retry_attempts`.
    pub fn should_retry_decision(
        &self,
        decision: &RetryDecision,
        attempt_count: u32,
        first_attempt_time: DateTime<Utc>,
    ) -> bool {
        self.should_retry_decision_at(decision, attempt_count, first_attempt_time, Utc::now())
    }

    /// [`RetryClassifier::should_retry_decision`] evaluated at `now`.
    pub fn should_retry_decision_at(
        &self,
        decision: &RetryDecision,
        attempt_count: u32,
        first_attempt_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        attempt_count < decision.max_retry_attempts
            && self.should_retry_at(decision.policy, attempt_count, first_attempt_time, now)
    }

    /// Seconds to wait before retry number `attempt_number` (1-based).
    pub fn calculate_retry_delay(
        &self,
        policy: RetryPolicy,
        attempt_number: u32,
        use_exponential_backoff: bool,
    ) -> u64 {
        let base = match policy {
            RetryPolicy::NotRetryable
            | RetryPolicy::RetryableAfterRemediation
            | RetryPolicy::RetryableAfterConfiguration => return 0,
            RetryPolicy::RetryableWithDelay => self.base_delay_seconds(),
            RetryPolicy::RetryableWithCooldown => self.rate_limit_cooldown().as_secs(),
        };
        let cap = self.settings.max_backoff.as_secs();

        if !use_exponential_backoff {
            return base.min(cap);
        }

        let exponent = attempt_number.max(1) - 1;
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        base.saturating_mul(factor).min(cap)
    }

    fn base_delay_seconds(&self) -> u64 {
        self.settings.base_delay.as_secs().max(1)
    }

    fn rate_limit_cooldown(&self) -> Duration {
        self.settings.rate_limit_cooldown()
    }

    fn rate_limit_decision(&self) -> RetryDecision {
        RetryDecision::with_cooldown(
            self.settings.max_cooldown_attempts,
            self.rate_limit_cooldown().as_secs(),
            "The request rate limit was exceeded.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_uses_category_fallback() {
        let classifier = RetryClassifier::default();
        let decision =
            classifier.classify_error("CUSTOM_RPC_4031", Some(DeploymentErrorCategory::NetworkError));
        assert_eq!(decision.policy, RetryPolicy::RetryableWithDelay);
        assert!(decision.max_retry_attempts > 0);
    }

    #[test]
    fn known_code_wins_over_category() {
        let classifier = RetryClassifier::default();
        let decision =
            classifier.classify_error("UNAUTHORIZED", Some(DeploymentErrorCategory::NetworkError));
        assert_eq!(decision.policy, RetryPolicy::NotRetryable);
    }

    #[test]
    fn unknown_code_without_category_is_not_retried() {
        let classifier = RetryClassifier::default();
        let decision = classifier.classify_error("???", None);
        assert_eq!(decision.policy, RetryPolicy::NotRetryable);
        assert_eq!(decision.max_retry_attempts, 0);
        assert!(!decision.explanation.is_empty());
    }

    #[test]
    fn cooldown_base_exceeds_delay_base() {
        let classifier = RetryClassifier::default();
        let delay = classifier.calculate_retry_delay(RetryPolicy::RetryableWithDelay, 1, false);
        let cooldown =
            classifier.calculate_retry_delay(RetryPolicy::RetryableWithCooldown, 1, false);
        assert!(cooldown > delay);
    }

    #[test]
    fn exponential_backoff_doubles_until_cap() {
        let classifier = RetryClassifier::default();
        let delays: Vec<u64> = (1..=8)
            .map(|n| classifier.calculate_retry_delay(RetryPolicy::RetryableWithDelay, n, true))
            .collect();
        assert_eq!(delays, vec![5, 10, 20, 40, 80, 160, 300, 300]);
    }

    #[test]
    fn huge_attempt_numbers_do_not_overflow() {
        let classifier = RetryClassifier::default();
        assert_eq!(
            classifier.calculate_retry_delay(RetryPolicy::RetryableWithDelay, u32::MAX, true),
            300
        );
    }

    #[test]
    fn future_first_attempt_counts_as_now() {
        let classifier = RetryClassifier::default();
        let now = Utc::now();
        let future = now + chrono::Duration::seconds(30);
        assert!(classifier.should_retry_at(RetryPolicy::RetryableWithDelay, 0, future, now));
    }
}
