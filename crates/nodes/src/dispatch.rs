//! The terminal-action dispatcher.
//!
//! Executes the single irreversible action of the system, selected by the
//! approval gate's outcome: a rejected gate yields a fixed acknowledgment, an
//! approved gate hands the governed email to the deployment target. The
//! dispatcher performs no retry of its own — a deployment failure surfaces
//! unchanged, and the gate's recorded decision is untouched either way.

use std::sync::Arc;

use pipeline::{ApprovalGate, ApprovalState, DeploymentResult, DeploymentTarget, MailWorksError};

/// The fixed acknowledgment for a rejected email.
pub const REJECT_CONFIRMATION: &str = "Email rejected by human approval.";

/// What the terminal action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The reviewer rejected; nothing left the system.
    Rejected {
        /// The fixed confirmation string.
        confirmation: String,
    },
    /// The reviewer approved and the platform accepted the email.
    Deployed(DeploymentResult),
}

/// Executes the terminal action chosen by a decided [`ApprovalGate`].
pub struct ActionDispatcher {
    target: Arc<dyn DeploymentTarget>,
}

impl ActionDispatcher {
    /// Creates a dispatcher over a deployment target.
    pub fn new(target: Arc<dyn DeploymentTarget>) -> Self {
        Self { target }
    }

    /// Executes the action for the gate's terminal state.
    ///
    /// - [`ApprovalState::Rejected`] → the fixed confirmation; never touches
    ///   the deployment target and always succeeds.
    /// - [`ApprovalState::Approved`] → deploys the gate's governed email;
    ///   a target failure surfaces as [`MailWorksError::DeploymentFailed`].
    /// - A gate still pending review is a caller error: nothing may dispatch
    ///   before the human has decided.
    pub async fn dispatch(&self, gate: &ApprovalGate) -> Result<ActionOutcome, MailWorksError> {
        match gate.state() {
            ApprovalState::PendingReview => Err(MailWorksError::InvalidApprovalTransition {
                current: ApprovalState::PendingReview,
            }),
            ApprovalState::Rejected => {
                tracing::info!("terminal action: reject acknowledged");
                Ok(ActionOutcome::Rejected {
                    confirmation: REJECT_CONFIRMATION.to_string(),
                })
            }
            ApprovalState::Approved => {
                let result = self
                    .target
                    .deploy(&gate.package().governed_email)
                    .await
                    .map_err(|err| MailWorksError::DeploymentFailed {
                        detail: err.to_string(),
                    })?;
                tracing::info!(id = %result.id, status = ?result.status, "terminal action: deployed");
                Ok(ActionOutcome::Deployed(result))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pipeline::{
        ApprovalDecision, DeploymentStatus, GovernedEmail, PackagedOutput, SafetyReport,
    };

    use super::*;
    use crate::support::RecordingTarget;

    fn decided_gate(decision: ApprovalDecision) -> ApprovalGate {
        let mut gate = ApprovalGate::new(PackagedOutput {
            governed_email: GovernedEmail {
                subject_lines: vec!["Monthly Update".to_string()],
                body_variants: vec!["Hello".to_string()],
            },
            safety_report: SafetyReport::from_findings(Default::default(), false),
        });
        gate.decide(decision).unwrap();
        gate
    }

    #[tokio::test]
    async fn a_rejected_gate_yields_the_fixed_confirmation_and_never_deploys() {
        let target = Arc::new(RecordingTarget::accepting());
        let dispatcher = ActionDispatcher::new(target.clone());

        let outcome = dispatcher
            .dispatch(&decided_gate(ApprovalDecision::Reject))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Rejected {
                confirmation: REJECT_CONFIRMATION.to_string()
            }
        );
        assert_eq!(target.deploy_calls(), 0);
    }

    #[tokio::test]
    async fn an_approved_gate_deploys_and_returns_a_queued_result() {
        let target = Arc::new(RecordingTarget::accepting());
        let dispatcher = ActionDispatcher::new(target.clone());

        let outcome = dispatcher
            .dispatch(&decided_gate(ApprovalDecision::Approve))
            .await
            .unwrap();

        let ActionOutcome::Deployed(result) = outcome else {
            panic!("expected a deployment, got {outcome:?}");
        };
        assert_eq!(result.status, DeploymentStatus::Queued);
        assert!(!result.id.as_str().is_empty());
        assert_eq!(target.deploy_calls(), 1);
    }

    #[tokio::test]
    async fn deployment_failures_surface_unchanged_without_retry() {
        let target = Arc::new(RecordingTarget::refusing("platform quota exhausted"));
        let dispatcher = ActionDispatcher::new(target.clone());

        let err = dispatcher
            .dispatch(&decided_gate(ApprovalDecision::Approve))
            .await
            .unwrap_err();

        match err {
            MailWorksError::DeploymentFailed { detail } => {
                assert!(detail.contains("platform quota exhausted"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Exactly one attempt: no local retry at this layer.
        assert_eq!(target.deploy_calls(), 1);
    }

    #[tokio::test]
    async fn dispatching_an_undecided_gate_is_a_caller_error() {
        let gate = ApprovalGate::new(PackagedOutput {
            governed_email: GovernedEmail {
                subject_lines: vec![],
                body_variants: vec![],
            },
            safety_report: SafetyReport::from_findings(Default::default(), false),
        });
        let target = Arc::new(RecordingTarget::accepting());
        let dispatcher = ActionDispatcher::new(target.clone());

        let err = dispatcher.dispatch(&gate).await.unwrap_err();
        assert!(matches!(
            err,
            MailWorksError::InvalidApprovalTransition {
                current: ApprovalState::PendingReview
            }
        ));
        assert_eq!(target.deploy_calls(), 0);
    }
}
