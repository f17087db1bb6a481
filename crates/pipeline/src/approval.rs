//! The human approval gate.
//!
//! A two-outcome state machine standing between a finished pipeline run and
//! the irreversible terminal action. The gate is a pure decision-recorder: it
//! holds the packaged output for presentation, accepts exactly one external
//! [`ApprovalDecision`], and transitions deterministically to a terminal
//! state. It never inspects the safety report itself — whether an unsafe
//! email may still ship is a judgment for the human or the calling policy
//! layer.

use serde::{Deserialize, Serialize};

use crate::errors::MailWorksError;
use crate::types::{ApprovalDecision, PackagedOutput};

/// Where a gate is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// The only initial state: packaged output exists, no decision yet.
    PendingReview,
    /// Terminal: the reviewer approved deployment.
    Approved,
    /// Terminal: the reviewer rejected the content.
    Rejected,
}

impl ApprovalState {
    /// Returns `true` once a decision has been recorded.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::PendingReview)
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------

/// Records one human decision about one packaged output.
///
/// Constructed in [`ApprovalState::PendingReview`]; [`ApprovalGate::decide`]
/// moves it to a terminal state exactly once. Any further decision is
/// [`MailWorksError::InvalidApprovalTransition`] and leaves the recorded
/// outcome untouched.
#[derive(Debug)]
pub struct ApprovalGate {
    state: ApprovalState,
    package: PackagedOutput,
}

impl ApprovalGate {
    /// Opens a gate over a packaged output, pending review.
    pub fn new(package: PackagedOutput) -> Self {
        Self {
            state: ApprovalState::PendingReview,
            package,
        }
    }

    /// The current gate state.
    pub fn state(&self) -> ApprovalState {
        self.state
    }

    /// The bundle under review, for presentation to the human.
    pub fn package(&self) -> &PackagedOutput {
        &self.package
    }

    /// Records the reviewer's decision.
    ///
    /// Valid only while pending review: `Approve` transitions to
    /// [`ApprovalState::Approved`], `Reject` to [`ApprovalState::Rejected`],
    /// and the reached terminal state is returned. In any other state the
    /// decision is refused and the gate is unchanged.
    pub fn decide(&mut self, decision: ApprovalDecision) -> Result<ApprovalState, MailWorksError> {
        if self.state != ApprovalState::PendingReview {
            return Err(MailWorksError::InvalidApprovalTransition {
                current: self.state,
            });
        }

        self.state = match decision {
            ApprovalDecision::Approve => ApprovalState::Approved,
            ApprovalDecision::Reject => ApprovalState::Rejected,
        };
        tracing::info!(decision = ?decision, state = %self.state, "approval decision recorded");
        Ok(self.state)
    }
}
