// ABOUTME: Per-deployment write lock serializing read-validate-append sequences.
// ABOUTME: Releases on drop; carries the holder's acquisition time for diagnostics.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::types::DeploymentId;

/// A held write lock for one deployment.
pub struct WriteLock {
    deployment_id: DeploymentId,
    acquired_at: DateTime<Utc>,
    _guard: OwnedMutexGuard<()>,
}

impl std::fmt::Debug for WriteLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteLock")
            .field("deployment_id", &self.deployment_id)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

impl WriteLock {
    /// Wait for `mutex` and wrap the guard.
    pub async fn acquire(deployment_id: DeploymentId, mutex: Arc<Mutex<()>>) -> Self {
        let guard = mutex.lock_owned().await;
        Self {
            deployment_id,
            acquired_at: Utc::now(),
            _guard: guard,
        }
    }

    pub fn deployment_id(&self) -> &DeploymentId {
        &self.deployment_id
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// How long the lock has been held.
    pub fn held_for(&self) -> chrono::Duration {
        Utc::now() - self.acquired_at
    }
}
