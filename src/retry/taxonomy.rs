// ABOUTME: Failure categories, canonical error codes, and the DeploymentError value.
// ABOUTME: Category factories fix retryability and the suggested retry delay.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Broad class of an operational failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentErrorCategory {
    NetworkError,
    ValidationError,
    ComplianceError,
    UserRejection,
    InsufficientFunds,
    TransactionFailure,
    ConfigurationError,
    RateLimitExceeded,
    InternalError,
    Unknown,
}

impl DeploymentErrorCategory {
    pub const ALL: [DeploymentErrorCategory; 10] = [
        DeploymentErrorCategory::NetworkError,
        DeploymentErrorCategory::ValidationError,
        DeploymentErrorCategory::ComplianceError,
        DeploymentErrorCategory::UserRejection,
        DeploymentErrorCategory::InsufficientFunds,
        DeploymentErrorCategory::TransactionFailure,
        DeploymentErrorCategory::ConfigurationError,
        DeploymentErrorCategory::RateLimitExceeded,
        DeploymentErrorCategory::InternalError,
        DeploymentErrorCategory::Unknown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeploymentErrorCategory::NetworkError => "NetworkError",
            DeploymentErrorCategory::ValidationError => "ValidationError",
            DeploymentErrorCategory::ComplianceError => "ComplianceError",
            DeploymentErrorCategory::UserRejection => "UserRejection",
            DeploymentErrorCategory::InsufficientFunds => "InsufficientFunds",
            DeploymentErrorCategory::TransactionFailure => "TransactionFailure",
            DeploymentErrorCategory::ConfigurationError => "ConfigurationError",
            DeploymentErrorCategory::RateLimitExceeded => "RateLimitExceeded",
            DeploymentErrorCategory::InternalError => "InternalError",
            DeploymentErrorCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeploymentErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeploymentErrorCategory {
    type Err = Error;

    /// Accepts `NetworkError`, `network_error`, `network-error` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|category| normalize(category.name()) == wanted)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Canonical error codes with a dedicated retry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    InvalidAuthToken,
    AlreadyExists,
    Conflict,
    MissingRequiredField,
    InvalidNetwork,
    InvalidTokenParameters,
    MetadataValidationFailed,
    InvalidTokenStandard,
    ExternalServiceError,
    Timeout,
    TransactionFailed,
    GasEstimationFailed,
    TransactionRejected,
    BlockchainConnectionError,
    RateLimitExceeded,
    SubscriptionLimitReached,
    KycNotVerified,
    FeatureNotAvailable,
    EntitlementLimitExceeded,
    PriceNotConfigured,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 22] = [
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::InvalidAuthToken,
        ErrorCode::AlreadyExists,
        ErrorCode::Conflict,
        ErrorCode::MissingRequiredField,
        ErrorCode::InvalidNetwork,
        ErrorCode::InvalidTokenParameters,
        ErrorCode::MetadataValidationFailed,
        ErrorCode::InvalidTokenStandard,
        ErrorCode::ExternalServiceError,
        ErrorCode::Timeout,
        ErrorCode::TransactionFailed,
        ErrorCode::GasEstimationFailed,
        ErrorCode::TransactionRejected,
        ErrorCode::BlockchainConnectionError,
        ErrorCode::RateLimitExceeded,
        ErrorCode::SubscriptionLimitReached,
        ErrorCode::KycNotVerified,
        ErrorCode::FeatureNotAvailable,
        ErrorCode::EntitlementLimitExceeded,
        ErrorCode::PriceNotConfigured,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::InvalidAuthToken => "INVALID_AUTH_TOKEN",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::InvalidNetwork => "INVALID_NETWORK",
            ErrorCode::InvalidTokenParameters => "INVALID_TOKEN_PARAMETERS",
            ErrorCode::MetadataValidationFailed => "METADATA_VALIDATION_FAILED",
            ErrorCode::InvalidTokenStandard => "INVALID_TOKEN_STANDARD",
            ErrorCode::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::TransactionFailed => "TRANSACTION_FAILED",
            ErrorCode::GasEstimationFailed => "GAS_ESTIMATION_FAILED",
            ErrorCode::TransactionRejected => "TRANSACTION_REJECTED",
            ErrorCode::BlockchainConnectionError => "BLOCKCHAIN_CONNECTION_ERROR",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::SubscriptionLimitReached => "SUBSCRIPTION_LIMIT_REACHED",
            ErrorCode::KycNotVerified => "KYC_NOT_VERIFIED",
            ErrorCode::FeatureNotAvailable => "FEATURE_NOT_AVAILABLE",
            ErrorCode::EntitlementLimitExceeded => "ENTITLEMENT_LIMIT_EXCEEDED",
            ErrorCode::PriceNotConfigured => "PRICE_NOT_CONFIGURED",
        }
    }

    /// The category a failure with this code belongs to.
    pub fn category(self) -> DeploymentErrorCategory {
        use DeploymentErrorCategory as C;

        match self {
            ErrorCode::Unauthorized
            | ErrorCode::Forbidden
            | ErrorCode::InvalidAuthToken
            | ErrorCode::AlreadyExists
            | ErrorCode::Conflict
            | ErrorCode::MissingRequiredField
            | ErrorCode::InvalidNetwork
            | ErrorCode::InvalidTokenParameters
            | ErrorCode::MetadataValidationFailed
            | ErrorCode::InvalidTokenStandard => C::ValidationError,
            ErrorCode::ExternalServiceError
            | ErrorCode::Timeout
            | ErrorCode::BlockchainConnectionError => C::NetworkError,
            ErrorCode::TransactionFailed
            | ErrorCode::GasEstimationFailed
            | ErrorCode::TransactionRejected => C::TransactionFailure,
            ErrorCode::RateLimitExceeded | ErrorCode::SubscriptionLimitReached => {
                C::RateLimitExceeded
            }
            ErrorCode::KycNotVerified
            | ErrorCode::FeatureNotAvailable
            | ErrorCode::EntitlementLimitExceeded => C::ComplianceError,
            ErrorCode::PriceNotConfigured => C::ConfigurationError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the canonical codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

/// An operational failure reported by a collaborator.
///
/// `technical_message` is for logs; `user_message` is safe to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{category}: {technical_message}")]
pub struct DeploymentError {
    pub category: DeploymentErrorCategory,
    pub error_code: Option<String>,
    pub technical_message: String,
    pub user_message: String,
    pub is_retryable: bool,
    pub suggested_retry_delay_seconds: u64,
}

impl DeploymentError {
    fn build(
        category: DeploymentErrorCategory,
        technical_message: impl Into<String>,
        user_message: &str,
        retry_delay_seconds: Option<u64>,
    ) -> Self {
        Self {
            category,
            error_code: None,
            technical_message: technical_message.into(),
            user_message: user_message.to_string(),
            is_retryable: retry_delay_seconds.is_some(),
            suggested_retry_delay_seconds: retry_delay_seconds.unwrap_or(0),
        }
    }

    pub fn network_error(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::NetworkError,
            technical_message,
            "The network is temporarily unreachable. Please try again shortly.",
            Some(30),
        )
    }

    pub fn validation_error(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::ValidationError,
            technical_message,
            "The deployment request is invalid. Please review the token parameters.",
            None,
        )
    }

    pub fn compliance_error(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::ComplianceError,
            technical_message,
            "This deployment does not meet compliance requirements.",
            None,
        )
    }

    pub fn user_rejection(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::UserRejection,
            technical_message,
            "The transaction was rejected. Approve it to continue.",
            Some(5),
        )
    }

    pub fn insufficient_funds(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::InsufficientFunds,
            technical_message,
            "The deploying account does not have enough funds to cover fees.",
            Some(300),
        )
    }

    pub fn transaction_failure(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::TransactionFailure,
            technical_message,
            "The transaction failed on chain. It can be retried.",
            Some(60),
        )
    }

    pub fn configuration_error(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::ConfigurationError,
            technical_message,
            "The service is not configured for this deployment. Contact support.",
            None,
        )
    }

    pub fn rate_limit_exceeded(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::RateLimitExceeded,
            technical_message,
            "Too many requests. Please wait before trying again.",
            Some(60),
        )
    }

    pub fn internal_error(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::InternalError,
            technical_message,
            "An unexpected error occurred. Please try again.",
            Some(120),
        )
    }

    pub fn unknown(technical_message: impl Into<String>) -> Self {
        Self::build(
            DeploymentErrorCategory::Unknown,
            technical_message,
            "An unknown error occurred.",
            None,
        )
    }

    /// Build an error through its category factory and tag it with `code`.
    pub fn from_code(code: ErrorCode, technical_message: impl Into<String>) -> Self {
        Self::for_category(code.category(), technical_message).with_code(code.as_str())
    }

    pub fn for_category(
        category: DeploymentErrorCategory,
        technical_message: impl Into<String>,
    ) -> Self {
        match category {
            DeploymentErrorCategory::NetworkError => Self::network_error(technical_message),
            DeploymentErrorCategory::ValidationError => Self::validation_error(technical_message),
            DeploymentErrorCategory::ComplianceError => Self::compliance_error(technical_message),
            DeploymentErrorCategory::UserRejection => Self::user_rejection(technical_message),
            DeploymentErrorCategory::InsufficientFunds => {
                Self::insufficient_funds(technical_message)
            }
            DeploymentErrorCategory::TransactionFailure => {
                Self::transaction_failure(technical_message)
            }
            DeploymentErrorCategory::ConfigurationError => {
                Self::configuration_error(technical_message)
            }
            DeploymentErrorCategory::RateLimitExceeded => {
                Self::rate_limit_exceeded(technical_message)
            }
            DeploymentErrorCategory::InternalError => Self::internal_error(technical_message),
            DeploymentErrorCategory::Unknown => Self::unknown(technical_message),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = user_message.into();
        self
    }

    /// The recorded code, or the category name when none was given.
    pub fn code_or_category(&self) -> &str {
        self.error_code
            .as_deref()
            .unwrap_or_else(|| self.category.name())
    }
}
