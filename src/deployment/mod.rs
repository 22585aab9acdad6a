// ABOUTME: Deployment aggregate root and the status changes applied to it.
// ABOUTME: History is a non-empty, append-only log seeded with the Queued entry.

mod history;

pub use history::{
    META_ERROR_CATEGORY, META_ERROR_CODE, META_IS_RETRYABLE, META_RETRY_DELAY, StatusHistoryEntry,
};

use chrono::{DateTime, Utc};
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::lifecycle::DeploymentStatus;
use crate::types::{CorrelationId, DeploymentId};

/// The caller-supplied fields of a deployment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeployment {
    pub token_type: String,
    pub network: String,
    pub deployed_by: String,
    pub token_name: String,
    pub token_symbol: String,
    pub correlation_id: CorrelationId,
}

/// A status transition ready to be written: the history entry plus the
/// record fields it sets. Fields left `None` keep their current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub entry: StatusHistoryEntry,
    pub transaction_hash: Option<String>,
    pub confirmed_round: Option<u64>,
}

impl StatusChange {
    pub fn new(entry: StatusHistoryEntry) -> Self {
        Self {
            entry,
            transaction_hash: None,
            confirmed_round: None,
        }
    }

    pub fn status(&self) -> DeploymentStatus {
        self.entry.status
    }
}

/// One tracked token deployment and its full lifecycle record.
///
/// Deserializing checks that `currentStatus` matches the last history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DeploymentRecord")]
pub struct Deployment {
    deployment_id: DeploymentId,
    token_type: String,
    network: String,
    deployed_by: String,
    token_name: String,
    token_symbol: String,
    correlation_id: CorrelationId,
    current_status: DeploymentStatus,
    transaction_hash: Option<String>,
    confirmed_round: Option<u64>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    status_history: NonEmpty<StatusHistoryEntry>,
}

/// Wire shape of a [`Deployment`] before its invariants are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentRecord {
    deployment_id: DeploymentId,
    token_type: String,
    network: String,
    deployed_by: String,
    token_name: String,
    token_symbol: String,
    correlation_id: CorrelationId,
    current_status: DeploymentStatus,
    transaction_hash: Option<String>,
    confirmed_round: Option<u64>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    status_history: NonEmpty<StatusHistoryEntry>,
}

impl TryFrom<DeploymentRecord> for Deployment {
    type Error = String;

    fn try_from(record: DeploymentRecord) -> Result<Self, Self::Error> {
        let last = record.status_history.last().status;
        if record.current_status != last {
            return Err(format!(
                "currentStatus {} does not match latest history entry {last}",
                record.current_status
            ));
        }

        Ok(Self {
            deployment_id: record.deployment_id,
            token_type: record.token_type,
            network: record.network,
            deployed_by: record.deployed_by,
            token_name: record.token_name,
            token_symbol: record.token_symbol,
            correlation_id: record.correlation_id,
            current_status: record.current_status,
            transaction_hash: record.transaction_hash,
            confirmed_round: record.confirmed_round,
            error_message: record.error_message,
            created_at: record.created_at,
            status_history: record.status_history,
        })
    }
}

impl Deployment {
    /// Materialize a draft as a `Queued` deployment with its initial history entry.
    pub fn new(deployment_id: DeploymentId, draft: NewDeployment) -> Self {
        let initial = StatusHistoryEntry::new(DeploymentStatus::Queued)
            .with_note(Some("deployment created".to_string()));
        Self {
            deployment_id,
            token_type: draft.token_type,
            network: draft.network,
            deployed_by: draft.deployed_by,
            token_name: draft.token_name,
            token_symbol: draft.token_symbol,
            correlation_id: draft.correlation_id,
            current_status: DeploymentStatus::Queued,
            transaction_hash: None,
            confirmed_round: None,
            error_message: None,
            created_at: initial.timestamp,
            status_history: NonEmpty::new(initial),
        }
    }

    pub fn deployment_id(&self) -> &DeploymentId {
        &self.deployment_id
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn deployed_by(&self) -> &str {
        &self.deployed_by
    }

    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    pub fn token_symbol(&self) -> &str {
        &self.token_symbol
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn current_status(&self) -> DeploymentStatus {
        self.current_status
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    pub fn confirmed_round(&self) -> Option<u64> {
        self.confirmed_round
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status_history(&self) -> &NonEmpty<StatusHistoryEntry> {
        &self.status_history
    }

    pub fn latest_entry(&self) -> &StatusHistoryEntry {
        self.status_history.last()
    }

    /// The most recent history entry recorded with the given status.
    pub fn last_entry_with(&self, status: DeploymentStatus) -> Option<&StatusHistoryEntry> {
        self.status_history
            .iter()
            .filter(|e| e.status == status)
            .last()
    }

    /// A copy of this record with the change's field values applied but its
    /// status and history untouched. Used to check invariants before commit.
    pub fn preview(&self, change: &StatusChange) -> Deployment {
        let mut preview = self.clone();
        preview.set_fields(change);
        preview
    }

    /// Append the change's entry and move to its status.
    ///
    /// Performs no validation; callers run the transition guard first.
    pub fn apply(&mut self, change: StatusChange) {
        self.set_fields(&change);
        self.current_status = change.entry.status;
        self.status_history.push(change.entry);
    }

    fn set_fields(&mut self, change: &StatusChange) {
        if let Some(hash) = &change.transaction_hash {
            self.transaction_hash = Some(hash.clone());
        }
        if let Some(round) = change.confirmed_round {
            self.confirmed_round = Some(round);
        }
        if let Some(message) = &change.entry.error_message {
            self.error_message = Some(message.clone());
        }
    }
}
