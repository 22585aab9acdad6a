// ABOUTME: Audit history entries recorded for every accepted status transition.
// ABOUTME: Entries are immutable once appended to a deployment's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lifecycle::DeploymentStatus;

/// Metadata key carrying the canonical error code of a failure.
pub const META_ERROR_CODE: &str = "errorCode";
/// Metadata key carrying the error category of a failure.
pub const META_ERROR_CATEGORY: &str = "errorCategory";
/// Metadata key carrying whether the failure was flagged retryable.
pub const META_IS_RETRYABLE: &str = "isRetryable";
/// Metadata key carrying the suggested delay before a retry, in seconds.
pub const META_RETRY_DELAY: &str = "suggestedRetryDelaySeconds";

/// One entry in a deployment's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: DeploymentStatus,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StatusHistoryEntry {
    /// Create an entry stamped with the current wall-clock time.
    pub fn new(status: DeploymentStatus) -> Self {
        Self::at(status, Utc::now())
    }

    pub fn at(status: DeploymentStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            status,
            timestamp,
            note: None,
            error_message: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn with_error_message(mut self, error_message: Option<String>) -> Self {
        self.error_message = error_message;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_has_concrete_timestamp() {
        let entry = StatusHistoryEntry::new(DeploymentStatus::Queued);
        assert_ne!(entry.timestamp, DateTime::<Utc>::default());
        assert!(entry.note.is_none());
        assert!(entry.metadata.is_empty());
    }

    #[test]
    fn builder_sets_optional_fields() {
        let entry = StatusHistoryEntry::new(DeploymentStatus::Failed)
            .with_note(Some("gas spike".to_string()))
            .with_error_message(Some("out of gas".to_string()))
            .with_metadata(META_ERROR_CODE, "TRANSACTION_FAILED");

        assert_eq!(entry.note.as_deref(), Some("gas spike"));
        assert_eq!(entry.error_message.as_deref(), Some("out of gas"));
        assert_eq!(entry.metadata(META_ERROR_CODE), Some("TRANSACTION_FAILED"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let entry = StatusHistoryEntry::new(DeploymentStatus::Pending)
            .with_error_message(Some("slow".to_string()));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["errorMessage"], "slow");
    }
}
