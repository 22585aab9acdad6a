// ABOUTME: Request and outcome types for the deployment status service.
// ABOUTME: Plain data handed in by the API layer and returned to it.

use std::collections::HashMap;

use crate::deployment::{Deployment, StatusChange, StatusHistoryEntry};
use crate::lifecycle::{DeploymentStatus, TransitionResult};
use crate::types::CorrelationId;

/// Fields needed to start tracking a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDeployment {
    pub token_type: String,
    pub network: String,
    /// Actor identity from the auth layer.
    pub deployed_by: String,
    pub token_name: String,
    pub token_symbol: String,
    /// Generated when absent.
    pub correlation_id: Option<CorrelationId>,
}

/// A requested move to `new_status`, with the optional fields it records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub new_status: DeploymentStatus,
    pub note: Option<String>,
    pub transaction_hash: Option<String>,
    pub confirmed_round: Option<u64>,
    pub error_message: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl StatusUpdate {
    pub fn new(new_status: DeploymentStatus) -> Self {
        Self {
            new_status,
            note: None,
            transaction_hash: None,
            confirmed_round: None,
            error_message: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    pub fn with_confirmed_round(mut self, round: u64) -> Self {
        self.confirmed_round = Some(round);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Stamp the update with the current time.
    pub(crate) fn into_change(self) -> StatusChange {
        let mut entry = StatusHistoryEntry::new(self.new_status)
            .with_note(self.note)
            .with_error_message(self.error_message);
        entry.metadata = self.metadata;

        StatusChange {
            entry,
            transaction_hash: self.transaction_hash,
            confirmed_round: self.confirmed_round,
        }
    }
}

/// What happened to a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The guard allowed the move and it was recorded.
    Applied(TransitionResult),
    /// The guard refused the move; nothing was recorded.
    Rejected(TransitionResult),
    /// No deployment has the given id.
    NotFound,
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied(_))
    }

    pub fn transition(&self) -> Option<&TransitionResult> {
        match self {
            UpdateOutcome::Applied(result) | UpdateOutcome::Rejected(result) => Some(result),
            UpdateOutcome::NotFound => None,
        }
    }
}

/// Criteria for listing deployments; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentFilter {
    pub status: Option<DeploymentStatus>,
    pub network: Option<String>,
    pub token_type: Option<String>,
    pub deployed_by: Option<String>,
}

impl DeploymentFilter {
    pub fn matches(&self, deployment: &Deployment) -> bool {
        self.status
            .is_none_or(|status| deployment.current_status() == status)
            && self
                .network
                .as_deref()
                .is_none_or(|network| deployment.network() == network)
            && self
                .token_type
                .as_deref()
                .is_none_or(|token_type| deployment.token_type() == token_type)
            && self
                .deployed_by
                .as_deref()
                .is_none_or(|actor| deployment.deployed_by() == actor)
    }
}
