// ABOUTME: In-memory deployment store keyed by deployment id.
// ABOUTME: Each record has its own async write lock so ids never contend.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{DeploymentStore, StoreError, WriteLock};
use crate::deployment::{Deployment, NewDeployment, StatusChange};
use crate::types::DeploymentId;

struct Slot {
    record: Deployment,
    write_lock: Arc<Mutex<()>>,
}

/// A process-local [`DeploymentStore`].
#[derive(Default)]
pub struct InMemoryDeploymentStore {
    slots: RwLock<HashMap<DeploymentId, Slot>>,
}

impl std::fmt::Debug for InMemoryDeploymentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDeploymentStore")
            .field("deployments", &self.len())
            .finish()
    }
}

impl InMemoryDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

#[async_trait]
impl DeploymentStore for InMemoryDeploymentStore {
    async fn create(&self, draft: NewDeployment) -> Result<DeploymentId, StoreError> {
        let mut slots = self.slots.write();

        let mut id = DeploymentId::generate();
        while slots.contains_key(&id) {
            id = DeploymentId::generate();
        }

        slots.insert(
            id.clone(),
            Slot {
                record: Deployment::new(id.clone(), draft),
                write_lock: Arc::new(Mutex::new(())),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, StoreError> {
        Ok(self.slots.read().get(id).map(|slot| slot.record.clone()))
    }

    async fn append(
        &self,
        id: &DeploymentId,
        change: StatusChange,
    ) -> Result<Option<Deployment>, StoreError> {
        let mut slots = self.slots.write();
        Ok(slots.get_mut(id).map(|slot| {
            slot.record.apply(change);
            slot.record.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<Deployment>, StoreError> {
        Ok(self
            .slots
            .read()
            .values()
            .map(|slot| slot.record.clone())
            .collect())
    }

    async fn lock(&self, id: &DeploymentId) -> Result<Option<WriteLock>, StoreError> {
        // Clone the mutex out so the map guard is released before awaiting.
        let mutex = self.slots.read().get(id).map(|slot| slot.write_lock.clone());
        match mutex {
            Some(mutex) => Ok(Some(WriteLock::acquire(id.clone(), mutex).await)),
            None => Ok(None),
        }
    }
}
