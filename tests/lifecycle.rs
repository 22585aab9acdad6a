// ABOUTME: Integration tests for the deployment lifecycle state machine.
// ABOUTME: Covers the edge table, terminal states, and context invariants.

use mintwatch::deployment::{Deployment, NewDeployment, StatusChange, StatusHistoryEntry};
use mintwatch::lifecycle::{DeploymentStatus, ReasonCode, StateTransitionGuard};
use mintwatch::types::{CorrelationId, DeploymentId};
use proptest::prelude::*;
use std::collections::BTreeSet;

use DeploymentStatus::*;

fn deployment_in(status: DeploymentStatus, hash: Option<&str>) -> Deployment {
    let mut deployment = Deployment::new(
        DeploymentId::new("dep-1"),
        NewDeployment {
            token_type: "ASA".to_string(),
            network: "mainnet".to_string(),
            deployed_by: "bob".to_string(),
            token_name: "Bob Coin".to_string(),
            token_symbol: "BOB".to_string(),
            correlation_id: CorrelationId::new("corr-1"),
        },
    );
    if status != Queued || hash.is_some() {
        let mut change = StatusChange::new(StatusHistoryEntry::new(status));
        change.transaction_hash = hash.map(str::to_string);
        deployment.apply(change);
    }
    deployment
}

fn status_strategy() -> impl Strategy<Value = DeploymentStatus> {
    prop::sample::select(DeploymentStatus::ALL.to_vec())
}

mod edge_table {
    use super::*;

    #[test]
    fn valid_next_states_match_lifecycle() {
        let guard = StateTransitionGuard::new();
        let expected: [(DeploymentStatus, &[DeploymentStatus]); 8] = [
            (Queued, &[Submitted, Failed, Cancelled]),
            (Submitted, &[Pending, Failed]),
            (Pending, &[Confirmed, Failed]),
            (Confirmed, &[Indexed, Completed, Failed]),
            (Indexed, &[Completed, Failed]),
            (Failed, &[Queued]),
            (Completed, &[]),
            (Cancelled, &[]),
        ];

        for (from, next) in expected {
            let next: BTreeSet<_> = next.iter().copied().collect();
            assert_eq!(guard.valid_next_states(from), next, "from {from}");
        }
    }

    #[test]
    fn queued_to_submitted_is_allowed_without_context() {
        let result =
            StateTransitionGuard::new().validate_transition(Queued, Submitted, None);
        assert!(result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::TransactionSubmitted);
        assert!(result.violated_invariants.is_empty());
    }

    #[test]
    fn skipping_states_is_rejected_with_valid_options() {
        let result = StateTransitionGuard::new().validate_transition(Queued, Completed, None);
        assert!(!result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::InvalidTransition);
        assert!(result.explanation.contains("Submitted"));
        assert!(result.explanation.contains("Cancelled"));
    }

    #[test]
    fn failed_can_only_be_requeued() {
        let guard = StateTransitionGuard::new();
        assert!(guard.validate_transition(Failed, Queued, None).is_allowed);
        assert!(!guard.validate_transition(Failed, Submitted, None).is_allowed);
        assert!(!guard.validate_transition(Failed, Completed, None).is_allowed);
    }
}

mod terminal_states {
    use super::*;

    #[test]
    fn completed_cannot_be_left() {
        let guard = StateTransitionGuard::new();
        for to in DeploymentStatus::ALL.into_iter().filter(|s| *s != Completed) {
            let result = guard.validate_transition(Completed, to, None);
            assert!(!result.is_allowed, "Completed -> {to}");
            assert_eq!(result.reason_code, ReasonCode::TerminalStateViolation);
        }
    }

    #[test]
    fn cancelled_cannot_be_requeued() {
        let result = StateTransitionGuard::new().validate_transition(Cancelled, Queued, None);
        assert!(!result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::TerminalStateViolation);
    }

    #[test]
    fn only_completed_and_cancelled_are_terminal() {
        let guard = StateTransitionGuard::new();
        let terminal: Vec<_> = DeploymentStatus::ALL
            .into_iter()
            .filter(|s| guard.is_terminal_state(*s))
            .collect();
        assert_eq!(terminal, vec![Completed, Cancelled]);
    }
}

mod invariants {
    use super::*;

    #[test]
    fn submitted_requires_transaction_hash() {
        let deployment = deployment_in(Queued, None);
        let result =
            StateTransitionGuard::new().validate_transition(Queued, Submitted, Some(&deployment));
        assert!(!result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::InvariantViolation);
        assert_eq!(result.violated_invariants.len(), 1);
        assert!(result.violated_invariants[0].contains("transactionHash"));
    }

    #[test]
    fn blank_transaction_hash_does_not_count() {
        let deployment = deployment_in(Queued, Some("   "));
        let result =
            StateTransitionGuard::new().validate_transition(Queued, Submitted, Some(&deployment));
        assert!(!result.is_allowed);
    }

    #[test]
    fn submitted_with_hash_is_allowed() {
        let deployment = deployment_in(Queued, Some("TX123"));
        let result =
            StateTransitionGuard::new().validate_transition(Queued, Submitted, Some(&deployment));
        assert!(result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::TransactionSubmitted);
    }

    #[test]
    fn confirmed_requires_transaction_hash() {
        let deployment = deployment_in(Pending, None);
        let result =
            StateTransitionGuard::new().validate_transition(Pending, Confirmed, Some(&deployment));
        assert!(!result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::InvariantViolation);
    }

    #[test]
    fn edge_check_runs_before_invariants() {
        let deployment = deployment_in(Pending, None);
        let result =
            StateTransitionGuard::new().validate_transition(Pending, Submitted, Some(&deployment));
        assert_eq!(result.reason_code, ReasonCode::InvalidTransition);
    }

    #[test]
    fn failure_paths_need_no_hash() {
        let deployment = deployment_in(Submitted, None);
        let result =
            StateTransitionGuard::new().validate_transition(Submitted, Failed, Some(&deployment));
        assert!(result.is_allowed);
        assert_eq!(result.reason_code, ReasonCode::TransactionSubmissionFailed);
    }
}

proptest! {
    #[test]
    fn same_status_is_always_idempotent(status in status_strategy()) {
        let result = StateTransitionGuard::new().validate_transition(status, status, None);
        prop_assert!(result.is_allowed);
        prop_assert_eq!(result.reason_code, ReasonCode::IdempotentUpdate);
    }

    #[test]
    fn allowed_iff_listed_as_next_state(from in status_strategy(), to in status_strategy()) {
        prop_assume!(from != to);
        let guard = StateTransitionGuard::new();
        let allowed = guard.validate_transition(from, to, None).is_allowed;
        prop_assert_eq!(allowed, guard.valid_next_states(from).contains(&to));
    }

    #[test]
    fn validation_is_deterministic(from in status_strategy(), to in status_strategy()) {
        let guard = StateTransitionGuard::new();
        prop_assert_eq!(
            guard.validate_transition(from, to, None),
            guard.validate_transition(from, to, None)
        );
    }
}
