// ABOUTME: Webhook delivery error types with SNAFU pattern.
// ABOUTME: Exposes an error kind for programmatic handling.

use snafu::Snafu;

/// Failure delivering a status-change notification.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum WebhookError {
    #[snafu(display("webhook rejected notification for {deployment_id}: {reason}"))]
    Rejected {
        deployment_id: String,
        reason: String,
    },

    #[snafu(display("webhook endpoint unreachable: {message}"))]
    Unreachable { message: String },

    #[snafu(display("webhook notification timed out after {timeout_ms} ms"))]
    TimedOut { timeout_ms: u64 },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookErrorKind {
    /// The receiver answered and refused the event.
    Rejected,
    /// The receiver could not be reached.
    Unreachable,
    /// Delivery exceeded the configured timeout.
    TimedOut,
}

impl WebhookError {
    pub fn kind(&self) -> WebhookErrorKind {
        match self {
            WebhookError::Rejected { .. } => WebhookErrorKind::Rejected,
            WebhookError::Unreachable { .. } => WebhookErrorKind::Unreachable,
            WebhookError::TimedOut { .. } => WebhookErrorKind::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = UnreachableSnafu {
            message: "connection refused",
        }
        .build();
        assert_eq!(err.kind(), WebhookErrorKind::Unreachable);
        assert!(err.to_string().contains("connection refused"));

        let err = TimedOutSnafu { timeout_ms: 5000u64 }.build();
        assert_eq!(err.kind(), WebhookErrorKind::TimedOut);
        assert!(err.to_string().contains("5000"));
    }
}
