// ABOUTME: Deployment lifecycle status enum with stable ordinal values.
// ABOUTME: Parses and displays the canonical status names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Lifecycle status of a tracked deployment.
///
/// Discriminants are stable and exposed through [`DeploymentStatus::ordinal`];
/// they are part of the external contract and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeploymentStatus {
    /// Accepted and waiting for submission.
    Queued = 0,
    /// Transaction handed to the network.
    Submitted = 1,
    /// Transaction seen, not yet confirmed.
    Pending = 2,
    /// Transaction confirmed in a round.
    Confirmed = 3,
    /// Deployment finished. Terminal.
    Completed = 4,
    /// Deployment failed; may be re-queued.
    Failed = 5,
    /// Confirmed transaction picked up by the indexer.
    Indexed = 6,
    /// Withdrawn before submission. Terminal.
    Cancelled = 7,
}

impl DeploymentStatus {
    /// Every status, in ordinal order.
    pub const ALL: [DeploymentStatus; 8] = [
        DeploymentStatus::Queued,
        DeploymentStatus::Submitted,
        DeploymentStatus::Pending,
        DeploymentStatus::Confirmed,
        DeploymentStatus::Completed,
        DeploymentStatus::Failed,
        DeploymentStatus::Indexed,
        DeploymentStatus::Cancelled,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.ordinal() == ordinal)
    }

    pub fn name(self) -> &'static str {
        match self {
            DeploymentStatus::Queued => "Queued",
            DeploymentStatus::Submitted => "Submitted",
            DeploymentStatus::Pending => "Pending",
            DeploymentStatus::Confirmed => "Confirmed",
            DeploymentStatus::Completed => "Completed",
            DeploymentStatus::Failed => "Failed",
            DeploymentStatus::Indexed => "Indexed",
            DeploymentStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether no other status may follow this one.
    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentStatus::Completed | DeploymentStatus::Cancelled)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeploymentStatus {
    type Err = Error;

    /// Accepts the status name in any case, or its ordinal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u8>() {
            return Self::from_ordinal(ordinal).ok_or_else(|| Error::UnknownStatus(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|status| status.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_stable() {
        assert_eq!(DeploymentStatus::Queued.ordinal(), 0);
        assert_eq!(DeploymentStatus::Submitted.ordinal(), 1);
        assert_eq!(DeploymentStatus::Pending.ordinal(), 2);
        assert_eq!(DeploymentStatus::Confirmed.ordinal(), 3);
        assert_eq!(DeploymentStatus::Completed.ordinal(), 4);
        assert_eq!(DeploymentStatus::Failed.ordinal(), 5);
        assert_eq!(DeploymentStatus::Indexed.ordinal(), 6);
        assert_eq!(DeploymentStatus::Cancelled.ordinal(), 7);
    }

    #[test]
    fn parses_names_and_ordinals() {
        assert_eq!(
            "confirmed".parse::<DeploymentStatus>().unwrap(),
            DeploymentStatus::Confirmed
        );
        assert_eq!(
            " Indexed ".parse::<DeploymentStatus>().unwrap(),
            DeploymentStatus::Indexed
        );
        assert_eq!(
            "5".parse::<DeploymentStatus>().unwrap(),
            DeploymentStatus::Failed
        );
        assert!("8".parse::<DeploymentStatus>().is_err());
        assert!("Archived".parse::<DeploymentStatus>().is_err());
    }

    #[test]
    fn only_completed_and_cancelled_are_terminal() {
        let terminal: Vec<_> = DeploymentStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![DeploymentStatus::Completed, DeploymentStatus::Cancelled]
        );
    }
}
