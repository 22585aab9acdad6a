// ABOUTME: Persistence contract for deployment records and their history.
// ABOUTME: Exports the store trait, the in-memory store, and per-record write locks.

mod lock;
mod memory;

pub use lock::WriteLock;
pub use memory::InMemoryDeploymentStore;

use async_trait::async_trait;

use crate::deployment::{Deployment, NewDeployment, StatusChange};
use crate::types::DeploymentId;

/// System-level store failures. "Not found" is never an error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("deployment store unavailable: {0}")]
    Unavailable(String),

    #[error("deployment store backend error: {0}")]
    Backend(String),
}

/// Canonical owner of deployment records.
///
/// The store validates nothing: callers run the transition guard while
/// holding the record's [`WriteLock`] and only then call [`append`].
///
/// [`append`]: DeploymentStore::append
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Store a new `Queued` deployment under a fresh id.
    async fn create(&self, draft: NewDeployment) -> Result<DeploymentId, StoreError>;

    /// Load a snapshot of a deployment. Returns `None` if not found.
    async fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, StoreError>;

    /// Append a history entry and apply its field updates.
    /// Returns the updated record, or `None` if not found.
    async fn append(
        &self,
        id: &DeploymentId,
        change: StatusChange,
    ) -> Result<Option<Deployment>, StoreError>;

    /// Snapshots of every stored deployment, in no particular order.
    async fn list(&self) -> Result<Vec<Deployment>, StoreError>;

    /// Take the single-writer lock for one deployment. Returns `None` if not found.
    ///
    /// Locks for different ids are independent.
    async fn lock(&self, id: &DeploymentId) -> Result<Option<WriteLock>, StoreError>;
}
