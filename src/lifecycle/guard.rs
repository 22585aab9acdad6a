// ABOUTME: Transition guard deciding which lifecycle moves are legal.
// ABOUTME: Never fails: every rejection is a TransitionResult with a reason code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::DeploymentStatus;
use crate::deployment::Deployment;

/// Stable, machine-readable reason attached to every transition decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    IdempotentUpdate,
    TerminalStateViolation,
    InvalidTransition,
    InvariantViolation,
    TransactionSubmitted,
    DeploymentCancelled,
    DeploymentValidationFailed,
    TransactionPending,
    TransactionSubmissionFailed,
    TransactionConfirmed,
    TransactionReverted,
    TransactionIndexed,
    DeploymentCompleted,
    PostDeploymentFailed,
    DeploymentRetryRequested,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::IdempotentUpdate => "IDEMPOTENT_UPDATE",
            ReasonCode::TerminalStateViolation => "TERMINAL_STATE_VIOLATION",
            ReasonCode::InvalidTransition => "INVALID_TRANSITION",
            ReasonCode::InvariantViolation => "INVARIANT_VIOLATION",
            ReasonCode::TransactionSubmitted => "TRANSACTION_SUBMITTED",
            ReasonCode::DeploymentCancelled => "DEPLOYMENT_CANCELLED",
            ReasonCode::DeploymentValidationFailed => "DEPLOYMENT_VALIDATION_FAILED",
            ReasonCode::TransactionPending => "TRANSACTION_PENDING",
            ReasonCode::TransactionSubmissionFailed => "TRANSACTION_SUBMISSION_FAILED",
            ReasonCode::TransactionConfirmed => "TRANSACTION_CONFIRMED",
            ReasonCode::TransactionReverted => "TRANSACTION_REVERTED",
            ReasonCode::TransactionIndexed => "TRANSACTION_INDEXED",
            ReasonCode::DeploymentCompleted => "DEPLOYMENT_COMPLETED",
            ReasonCode::PostDeploymentFailed => "POST_DEPLOYMENT_FAILED",
            ReasonCode::DeploymentRetryRequested => "DEPLOYMENT_RETRY_REQUESTED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for ReasonCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Outcome of validating a single `(from, to)` move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResult {
    pub is_allowed: bool,
    pub reason_code: ReasonCode,
    pub explanation: String,
    pub violated_invariants: Vec<String>,
}

impl TransitionResult {
    fn allowed(reason_code: ReasonCode, explanation: String) -> Self {
        Self {
            is_allowed: true,
            reason_code,
            explanation,
            violated_invariants: Vec::new(),
        }
    }

    fn rejected(reason_code: ReasonCode, explanation: String) -> Self {
        Self {
            is_allowed: false,
            reason_code,
            explanation,
            violated_invariants: Vec::new(),
        }
    }
}

/// Validates lifecycle transitions against the edge table and, when a
/// record is supplied, against per-record business invariants.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateTransitionGuard;

impl StateTransitionGuard {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `from -> to` is legal.
    ///
    /// Rules apply in order: same-status updates are always allowed,
    /// terminal states cannot be left, unknown edges are rejected, and
    /// finally the context's invariants must hold.
    pub fn validate_transition(
        &self,
        from: DeploymentStatus,
        to: DeploymentStatus,
        context: Option<&Deployment>,
    ) -> TransitionResult {
        if from == to {
            return TransitionResult::allowed(
                ReasonCode::IdempotentUpdate,
                format!("deployment is already {from}; update recorded as idempotent"),
            );
        }

        if from.is_terminal() {
            return TransitionResult::rejected(
                ReasonCode::TerminalStateViolation,
                format!("{from} is a terminal state and cannot transition to {to}"),
            );
        }

        let Some(reason_code) = edge(from, to) else {
            let valid = self
                .valid_next_states(from)
                .into_iter()
                .map(DeploymentStatus::name)
                .collect::<Vec<_>>()
                .join(", ");
            return TransitionResult::rejected(
                ReasonCode::InvalidTransition,
                format!("cannot transition from {from} to {to}; valid next states: [{valid}]"),
            );
        };

        if let Some(deployment) = context {
            let violated = violated_invariants(to, deployment);
            if !violated.is_empty() {
                return TransitionResult {
                    is_allowed: false,
                    reason_code: ReasonCode::InvariantViolation,
                    explanation: format!(
                        "transition from {from} to {to} violates: {}",
                        violated.join("; ")
                    ),
                    violated_invariants: violated,
                };
            }
        }

        TransitionResult::allowed(reason_code, format!("transition from {from} to {to} is valid"))
    }

    /// The statuses directly reachable from `status`, excluding itself.
    pub fn valid_next_states(&self, status: DeploymentStatus) -> BTreeSet<DeploymentStatus> {
        DeploymentStatus::ALL
            .into_iter()
            .filter(|to| edge(status, *to).is_some())
            .collect()
    }

    pub fn is_terminal_state(&self, status: DeploymentStatus) -> bool {
        status.is_terminal()
    }
}

/// The lifecycle edge table. Outer match is exhaustive so a new status
/// must be given its outgoing edges here.
fn edge(from: DeploymentStatus, to: DeploymentStatus) -> Option<ReasonCode> {
    use DeploymentStatus::*;

    match from {
        Queued => match to {
            Submitted => Some(ReasonCode::TransactionSubmitted),
            Failed => Some(ReasonCode::DeploymentValidationFailed),
            Cancelled => Some(ReasonCode::DeploymentCancelled),
            _ => None,
        },
        Submitted => match to {
            Pending => Some(ReasonCode::TransactionPending),
            Failed => Some(ReasonCode::TransactionSubmissionFailed),
            _ => None,
        },
        Pending => match to {
            Confirmed => Some(ReasonCode::TransactionConfirmed),
            Failed => Some(ReasonCode::TransactionReverted),
            _ => None,
        },
        Confirmed => match to {
            Indexed => Some(ReasonCode::TransactionIndexed),
            Completed => Some(ReasonCode::DeploymentCompleted),
            Failed => Some(ReasonCode::PostDeploymentFailed),
            _ => None,
        },
        Indexed => match to {
            Completed => Some(ReasonCode::DeploymentCompleted),
            Failed => Some(ReasonCode::PostDeploymentFailed),
            _ => None,
        },
        Failed => match to {
            Queued => Some(ReasonCode::DeploymentRetryRequested),
            _ => None,
        },
        Completed | Cancelled => None,
    }
}

/// Business invariants the target status imposes on the record.
fn violated_invariants(to: DeploymentStatus, deployment: &Deployment) -> Vec<String> {
    let mut violated = Vec::new();
    let has_hash = deployment
        .transaction_hash()
        .is_some_and(|hash| !hash.trim().is_empty());

    match to {
        DeploymentStatus::Submitted | DeploymentStatus::Confirmed if !has_hash => {
            violated.push(format!("transactionHash is required to enter {to}"));
        }
        DeploymentStatus::Cancelled if deployment.current_status() != DeploymentStatus::Queued => {
            violated.push(format!(
                "currentStatus must be Queued to cancel (was {})",
                deployment.current_status()
            ));
        }
        _ => {}
    }

    violated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_parses_from_api_payload() {
        let json = r#"{
            "isAllowed": false,
            "reasonCode": "INVARIANT_VIOLATION",
            "explanation": "transactionHash is required",
            "violatedInvariants": ["transactionHash is required to enter Submitted"]
        }"#;
        let result: TransitionResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::InvariantViolation);
        assert_eq!(result.violated_invariants.len(), 1);

        let echoed = serde_json::to_string(&result).unwrap();
        assert_eq!(serde_json::from_str::<TransitionResult>(&echoed).unwrap(), result);
    }

    #[test]
    fn every_table_edge_has_a_success_code() {
        let guard = StateTransitionGuard::new();
        let cases = [
            (DeploymentStatus::Queued, DeploymentStatus::Failed, "DEPLOYMENT_VALIDATION_FAILED"),
            (DeploymentStatus::Submitted, DeploymentStatus::Failed, "TRANSACTION_SUBMISSION_FAILED"),
            (DeploymentStatus::Pending, DeploymentStatus::Failed, "TRANSACTION_REVERTED"),
            (DeploymentStatus::Confirmed, DeploymentStatus::Indexed, "TRANSACTION_INDEXED"),
            (DeploymentStatus::Confirmed, DeploymentStatus::Completed, "DEPLOYMENT_COMPLETED"),
            (DeploymentStatus::Confirmed, DeploymentStatus::Failed, "POST_DEPLOYMENT_FAILED"),
            (DeploymentStatus::Indexed, DeploymentStatus::Completed, "DEPLOYMENT_COMPLETED"),
            (DeploymentStatus::Indexed, DeploymentStatus::Failed, "POST_DEPLOYMENT_FAILED"),
            (DeploymentStatus::Failed, DeploymentStatus::Queued, "DEPLOYMENT_RETRY_REQUESTED"),
        ];

        for (from, to, code) in cases {
            let result = guard.validate_transition(from, to, None);
            assert!(result.is_allowed, "{from} -> {to}");
            assert_eq!(result.reason_code.as_str(), code, "{from} -> {to}");
            assert!(result.violated_invariants.is_empty());
        }
    }

    #[test]
    fn valid_next_states_match_edges() {
        let guard = StateTransitionGuard::new();
        for from in DeploymentStatus::ALL {
            for to in guard.valid_next_states(from) {
                assert!(guard.validate_transition(from, to, None).is_allowed);
            }
        }
        assert!(guard.valid_next_states(DeploymentStatus::Completed).is_empty());
        assert!(guard.valid_next_states(DeploymentStatus::Cancelled).is_empty());
    }

    #[test]
    fn invalid_transition_explains_valid_options() {
        let guard = StateTransitionGuard::new();
        let result =
            guard.validate_transition(DeploymentStatus::Submitted, DeploymentStatus::Queued, None);
        assert!(!result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::InvalidTransition);
        assert!(result.explanation.contains("Pending"));
    }

    #[test]
    fn reason_code_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&ReasonCode::DeploymentRetryRequested).unwrap();
        assert_eq!(json, "\"DEPLOYMENT_RETRY_REQUESTED\"");
        assert!(ReasonCode::IdempotentUpdate == "IDEMPOTENT_UPDATE");
    }
}
