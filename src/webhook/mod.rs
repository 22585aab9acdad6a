// ABOUTME: Outbound status-change notifications for accepted transitions.
// ABOUTME: Delivery is best-effort; failures never undo a committed update.

mod error;

pub use error::{WebhookError, WebhookErrorKind};
pub use error::{RejectedSnafu, TimedOutSnafu, UnreachableSnafu};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::lifecycle::{DeploymentStatus, ReasonCode};
use crate::types::{CorrelationId, DeploymentId};

/// Payload sent after every accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeEvent {
    pub deployment_id: DeploymentId,
    pub correlation_id: CorrelationId,
    pub previous_status: DeploymentStatus,
    pub new_status: DeploymentStatus,
    pub reason_code: ReasonCode,
    pub occurred_at: DateTime<Utc>,
}

/// Receives status-change events from the deployment service.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn notify(&self, event: &StatusChangeEvent) -> Result<(), WebhookError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl WebhookNotifier for NoopNotifier {
    async fn notify(&self, _event: &StatusChangeEvent) -> Result<(), WebhookError> {
        Ok(())
    }
}

/// Emits each event as a tracing record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl WebhookNotifier for LoggingNotifier {
    async fn notify(&self, event: &StatusChangeEvent) -> Result<(), WebhookError> {
        tracing::info!(
            deployment_id = %event.deployment_id,
            correlation_id = %event.correlation_id,
            from = %event.previous_status,
            to = %event.new_status,
            reason_code = %event.reason_code,
            "deployment status changed"
        );
        Ok(())
    }
}

/// Delivers each event to several notifiers concurrently.
///
/// Every target receives the event even if another fails; the first
/// failure (in target order) is returned.
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn WebhookNotifier>>,
}

impl std::fmt::Debug for FanoutNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutNotifier")
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: Arc<dyn WebhookNotifier>) -> Self {
        self.targets.push(target);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl WebhookNotifier for FanoutNotifier {
    async fn notify(&self, event: &StatusChangeEvent) -> Result<(), WebhookError> {
        let deliveries = self.targets.iter().map(|target| target.notify(event));
        futures::future::join_all(deliveries)
            .await
            .into_iter()
            .collect::<Result<Vec<()>, WebhookError>>()
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn event() -> StatusChangeEvent {
        StatusChangeEvent {
            deployment_id: DeploymentId::new("d-1"),
            correlation_id: CorrelationId::new("c-1"),
            previous_status: DeploymentStatus::Queued,
            new_status: DeploymentStatus::Submitted,
            reason_code: ReasonCode::TransactionSubmitted,
            occurred_at: Utc::now(),
        }
    }

    #[derive(Default)]
    struct Counting(Mutex<u32>);

    #[async_trait]
    impl WebhookNotifier for Counting {
        async fn notify(&self, _event: &StatusChangeEvent) -> Result<(), WebhookError> {
            *self.0.lock() += 1;
            Ok(())
        }
    }

    struct Refusing;

    #[async_trait]
    impl WebhookNotifier for Refusing {
        async fn notify(&self, event: &StatusChangeEvent) -> Result<(), WebhookError> {
            RejectedSnafu {
                deployment_id: event.deployment_id.to_string(),
                reason: "410 Gone",
            }
            .fail()
        }
    }

    #[tokio::test]
    async fn fanout_reaches_every_target() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let fanout = FanoutNotifier::new()
            .with_target(a.clone())
            .with_target(b.clone());

        fanout.notify(&event()).await.unwrap();

        assert_eq!(*a.0.lock(), 1);
        assert_eq!(*b.0.lock(), 1);
        assert_eq!(fanout.len(), 2);
    }

    #[tokio::test]
    async fn fanout_reports_failure_after_delivering_to_others() {
        let counting = Arc::new(Counting::default());
        let fanout = FanoutNotifier::new()
            .with_target(Arc::new(Refusing))
            .with_target(counting.clone());

        let err = fanout.notify(&event()).await.unwrap_err();

        assert_eq!(err.kind(), WebhookErrorKind::Rejected);
        assert_eq!(*counting.0.lock(), 1);
    }

    #[tokio::test]
    async fn noop_and_logging_notifiers_accept_everything() {
        assert!(NoopNotifier.notify(&event()).await.is_ok());
        assert!(LoggingNotifier.notify(&event()).await.is_ok());
    }

    #[tokio::test]
    async fn empty_fanout_succeeds() {
        assert!(FanoutNotifier::new().notify(&event()).await.is_ok());
    }

    #[test]
    fn event_serializes_camel_case() {
        let json = serde_json::to_value(event()).unwrap();
        assert_eq!(json["deploymentId"], "d-1");
        assert_eq!(json["newStatus"], "Submitted");
        assert_eq!(json["reasonCode"], "TRANSACTION_SUBMITTED");
    }
}
