// ABOUTME: Deployment status service orchestrating store, guard, and webhook.
// ABOUTME: Applies guarded transitions atomically per deployment id.

mod request;

pub use request::{CreateDeployment, DeploymentFilter, StatusUpdate, UpdateOutcome};

use chrono::Utc;
use std::sync::Arc;

use crate::config::{Config, WebhookSettings};
use crate::deployment::{
    Deployment, META_ERROR_CATEGORY, META_ERROR_CODE, META_IS_RETRYABLE, META_RETRY_DELAY,
    NewDeployment, StatusHistoryEntry,
};
use crate::lifecycle::{DeploymentStatus, StateTransitionGuard};
use crate::retry::{DeploymentError, DeploymentErrorCategory, RetryClassifier, RetryDecision};
use crate::store::{DeploymentStore, StoreError};
use crate::types::{CorrelationId, DeploymentId};
use crate::webhook::{StatusChangeEvent, WebhookNotifier};

/// Errors from the service. Rejected transitions are not errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Entry point for the API layer.
///
/// Holds no state of its own beyond its collaborators; the store owns
/// every record.
pub struct DeploymentStatusService<S: ?Sized, W: ?Sized> {
    store: Arc<S>,
    notifier: Arc<W>,
    guard: StateTransitionGuard,
    classifier: RetryClassifier,
    webhook: WebhookSettings,
}

impl<S: ?Sized, W: ?Sized> std::fmt::Debug for DeploymentStatusService<S, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentStatusService")
            .field("classifier", &self.classifier)
            .field("webhook", &self.webhook)
            .finish()
    }
}

impl<S, W> DeploymentStatusService<S, W>
where
    S: DeploymentStore + ?Sized,
    W: WebhookNotifier + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<W>) -> Self {
        Self {
            store,
            notifier,
            guard: StateTransitionGuard::new(),
            classifier: RetryClassifier::default(),
            webhook: WebhookSettings::default(),
        }
    }

    /// Apply the retry and webhook settings from `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.classifier = RetryClassifier::new(config.retry.clone());
        self.webhook = config.webhook.clone();
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn classifier(&self) -> &RetryClassifier {
        &self.classifier
    }

    /// Start tracking a new deployment in `Queued`.
    ///
    /// Every call yields a fresh id, even for identical requests.
    pub async fn create_deployment(
        &self,
        request: CreateDeployment,
    ) -> Result<DeploymentId, ServiceError> {
        let fields = [
            ("tokenType", &request.token_type),
            ("network", &request.network),
            ("deployedBy", &request.deployed_by),
            ("tokenName", &request.token_name),
            ("tokenSymbol", &request.token_symbol),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ServiceError::MissingField(*name));
        }

        let correlation_id = request
            .correlation_id
            .unwrap_or_else(CorrelationId::generate);

        let draft = NewDeployment {
            token_type: request.token_type,
            network: request.network,
            deployed_by: request.deployed_by,
            token_name: request.token_name,
            token_symbol: request.token_symbol,
            correlation_id: correlation_id.clone(),
        };
        let id = self.store.create(draft).await?;

        tracing::info!(
            deployment_id = %id,
            correlation_id = %correlation_id,
            "deployment created"
        );
        Ok(id)
    }

    /// Validate and record a status update, reporting exactly what happened.
    ///
    /// The write lock for `id` is held from the read through the append, so
    /// concurrent updates to one deployment are serialized. The webhook is
    /// delivered on a detached task after the lock is released; this call
    /// never waits for it.
    pub async fn apply_status_update(
        &self,
        id: &DeploymentId,
        update: StatusUpdate,
    ) -> Result<UpdateOutcome, ServiceError> {
        let Some(lock) = self.store.lock(id).await? else {
            tracing::debug!(deployment_id = %id, "status update for unknown deployment");
            return Ok(UpdateOutcome::NotFound);
        };
        let Some(current) = self.store.get(id).await? else {
            return Ok(UpdateOutcome::NotFound);
        };

        let change = update.into_change();
        let from = current.current_status();
        let to = change.status();

        // Invariants are checked against the record as it would look with
        // this update's fields applied.
        let result = self
            .guard
            .validate_transition(from, to, Some(&current.preview(&change)));

        if !result.is_allowed {
            tracing::warn!(
                deployment_id = %id,
                %from,
                %to,
                reason_code = %result.reason_code,
                "status transition rejected: {}",
                result.explanation
            );
            return Ok(UpdateOutcome::Rejected(result));
        }

        let Some(updated) = self.store.append(id, change).await? else {
            return Ok(UpdateOutcome::NotFound);
        };
        drop(lock);

        tracing::debug!(
            deployment_id = %id,
            %from,
            %to,
            reason_code = %result.reason_code,
            history_len = updated.status_history().len(),
            "status transition applied"
        );

        self.notify(StatusChangeEvent {
            deployment_id: id.clone(),
            correlation_id: updated.correlation_id().clone(),
            previous_status: from,
            new_status: to,
            reason_code: result.reason_code,
            occurred_at: updated.latest_entry().timestamp,
        });

        Ok(UpdateOutcome::Applied(result))
    }

    /// Returns `true` if the update was recorded, `false` if the guard
    /// rejected it or the deployment does not exist.
    pub async fn update_deployment_status(
        &self,
        id: &DeploymentId,
        update: StatusUpdate,
    ) -> Result<bool, ServiceError> {
        Ok(self.apply_status_update(id, update).await?.is_applied())
    }

    /// Move to `Failed`, recording the error's details for audit.
    pub async fn mark_deployment_failed(
        &self,
        id: &DeploymentId,
        error: &DeploymentError,
    ) -> Result<bool, ServiceError> {
        let update = StatusUpdate::new(DeploymentStatus::Failed)
            .with_note(error.user_message.clone())
            .with_error_message(error.technical_message.clone())
            .with_metadata(META_ERROR_CODE, error.code_or_category())
            .with_metadata(META_ERROR_CATEGORY, error.category.name())
            .with_metadata(META_IS_RETRYABLE, error.is_retryable.to_string())
            .with_metadata(
                META_RETRY_DELAY,
                error.suggested_retry_delay_seconds.to_string(),
            );

        self.update_deployment_status(id, update).await
    }

    /// Withdraw a deployment that has not been submitted yet.
    pub async fn cancel_deployment(
        &self,
        id: &DeploymentId,
        note: Option<String>,
    ) -> Result<bool, ServiceError> {
        let mut update = StatusUpdate::new(DeploymentStatus::Cancelled);
        update.note = note;
        self.update_deployment_status(id, update).await
    }

    pub async fn get_deployment(
        &self,
        id: &DeploymentId,
    ) -> Result<Option<Deployment>, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// The full history in insertion order, or `None` if not found.
    pub async fn get_status_history(
        &self,
        id: &DeploymentId,
    ) -> Result<Option<Vec<StatusHistoryEntry>>, ServiceError> {
        Ok(self
            .store
            .get(id)
            .await?
            .map(|deployment| deployment.status_history().iter().cloned().collect()))
    }

    /// Deployments matching `filter`, oldest first.
    pub async fn list_deployments(
        &self,
        filter: &DeploymentFilter,
    ) -> Result<Vec<Deployment>, ServiceError> {
        let mut deployments: Vec<Deployment> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|deployment| filter.matches(deployment))
            .collect();
        deployments.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.deployment_id().cmp(b.deployment_id()))
        });
        Ok(deployments)
    }

    /// Retry guidance for a failed deployment, from the failure recorded on
    /// its latest `Failed` entry. `None` unless it is currently failed.
    pub async fn retry_guidance(
        &self,
        id: &DeploymentId,
    ) -> Result<Option<RetryDecision>, ServiceError> {
        let Some(deployment) = self.store.get(id).await? else {
            return Ok(None);
        };
        if deployment.current_status() != DeploymentStatus::Failed {
            return Ok(None);
        }

        let entry = deployment.last_entry_with(DeploymentStatus::Failed);
        let code = entry
            .and_then(|e| e.metadata(META_ERROR_CODE))
            .unwrap_or_default();
        let category = entry
            .and_then(|e| e.metadata(META_ERROR_CATEGORY))
            .and_then(|c| c.parse::<DeploymentErrorCategory>().ok());

        Ok(Some(self.classifier.classify_error(code, category)))
    }

    /// Hand `event` to the notifier without waiting for delivery.
    fn notify(&self, event: StatusChangeEvent) {
        if !self.webhook.enabled {
            return;
        }

        let notifier = Arc::clone(&self.notifier);
        let timeout = self.webhook.timeout;
        tokio::spawn(async move {
            let started = Utc::now();
            match tokio::time::timeout(timeout, notifier.notify(&event)).await {
                Ok(Ok(())) => {
                    tracing::debug!(deployment_id = %event.deployment_id, "webhook delivered");
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        deployment_id = %event.deployment_id,
                        kind = ?e.kind(),
                        "webhook delivery failed: {e}"
                    );
                }
                Err(_elapsed) => {
                    tracing::warn!(
                        deployment_id = %event.deployment_id,
                        waited_ms = (Utc::now() - started).num_milliseconds(),
                        "webhook delivery timed out after {timeout:?}"
                    );
                }
            }
        });
    }
}
