// ABOUTME: Shared fixtures for mintwatch integration tests.
// ABOUTME: Provides request builders, test notifiers, and a failing store.

#![allow(dead_code)]

use async_trait::async_trait;
use mintwatch::deployment::{Deployment, NewDeployment, StatusChange};
use mintwatch::service::CreateDeployment;
use mintwatch::store::{DeploymentStore, StoreError, WriteLock};
use mintwatch::types::DeploymentId;
use mintwatch::webhook::{StatusChangeEvent, UnreachableSnafu, WebhookError, WebhookNotifier};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub fn create_request() -> CreateDeployment {
    CreateDeployment {
        token_type: "ARC3".to_string(),
        network: "testnet".to_string(),
        deployed_by: "alice@example.com".to_string(),
        token_name: "Example Token".to_string(),
        token_symbol: "EXT".to_string(),
        correlation_id: None,
    }
}

/// Records every event it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<StatusChangeEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<StatusChangeEvent> {
        self.events.lock().clone()
    }

    /// Wait until at least `count` events have arrived (or a few seconds
    /// pass), returning them oldest first.
    pub async fn wait_for(&self, count: usize) -> Vec<StatusChangeEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let mut events = self.events();
            if events.len() >= count || Instant::now() >= deadline {
                events.sort_by_key(|event| event.occurred_at);
                return events;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl WebhookNotifier for RecordingNotifier {
    async fn notify(&self, event: &StatusChangeEvent) -> Result<(), WebhookError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Always fails delivery.
pub struct FailingNotifier;

#[async_trait]
impl WebhookNotifier for FailingNotifier {
    async fn notify(&self, _event: &StatusChangeEvent) -> Result<(), WebhookError> {
        UnreachableSnafu {
            message: "connection refused",
        }
        .fail()
    }
}

/// Sleeps before acknowledging, to exercise the delivery timeout.
pub struct SlowNotifier(pub Duration);

#[async_trait]
impl WebhookNotifier for SlowNotifier {
    async fn notify(&self, _event: &StatusChangeEvent) -> Result<(), WebhookError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

/// A store whose backend is down.
pub struct FailingStore;

#[async_trait]
impl DeploymentStore for FailingStore {
    async fn create(&self, _draft: NewDeployment) -> Result<DeploymentId, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn get(&self, _id: &DeploymentId) -> Result<Option<Deployment>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn append(
        &self,
        _id: &DeploymentId,
        _change: StatusChange,
    ) -> Result<Option<Deployment>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn list(&self) -> Result<Vec<Deployment>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn lock(&self, _id: &DeploymentId) -> Result<Option<WriteLock>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}
