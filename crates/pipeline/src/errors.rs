//! Top-level error and retry-policy types for the MailWorks pipeline domain.
//!
//! [`MailWorksError`] covers conditions that abort a pipeline run or reject a
//! caller's request. Component-level errors (e.g. the generation provider's
//! transport failures) are defined in their respective infrastructure crates
//! and converted into [`MailWorksError`] at the orchestration boundary.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::approval::ApprovalState;
use crate::identifiers::{StageName, StateKey};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types to let the calling layer decide
/// whether to re-invoke an operation without escalating.
///
/// ## Rules
///
/// - `Retryable` errors: transient generation-provider failures (HTTP 429,
///   500, 503, 504) and request timeouts.
/// - `NonRetryable` errors: everything else — including every deployment
///   failure, which the dispatcher surfaces unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried; the failure propagates immediately.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a pipeline run or reject a caller's request.
///
/// The first three variants are fatal to the run that raised them: the run
/// aborts immediately, no subsequent stage executes, and the partially
/// written state is discarded with the run. `DeploymentFailed` and
/// `InvalidApprovalTransition` occur after the run has completed and leave
/// all prior state intact.
#[derive(Debug, Error)]
pub enum MailWorksError {
    /// A stage (or the dispatcher) read a state key no prior writer produced.
    ///
    /// This is a programming-contract violation, not a content problem: the
    /// pipeline was assembled with a stage ordering that does not satisfy the
    /// reader's declared inputs.
    #[error("State key '{key}' has not been written by any prior stage")]
    MissingStateKey {
        /// The key that was requested.
        key: StateKey,
    },

    /// A writer attempted to write a state key that already holds a value.
    ///
    /// Keys are written at most once per run (single-writer discipline); a
    /// second write is always an assembly mistake.
    #[error("State key '{key}' was already written; keys are single-writer per run")]
    StateKeyAlreadyWritten {
        /// The key that was written twice.
        key: StateKey,
    },

    /// A state value could not be decoded into the structure a stage requires.
    ///
    /// Produced when e.g. the generation provider returned JSON that does not
    /// match the draft-email shape a validation tool consumes.
    #[error("State key '{key}' holds a value the '{stage}' stage cannot decode: {detail}")]
    MalformedStateValue {
        /// The key whose value failed to decode.
        key: StateKey,
        /// The stage that attempted the decode.
        stage: StageName,
        /// Decoder error text.
        detail: String,
    },

    /// The generation provider exhausted its retry budget or failed terminally.
    ///
    /// Produced by: a [`crate::ports::GenerationProvider`] after its bounded
    /// retry schedule (transient HTTP failures only) ran out of attempts.
    #[error("Generation failed in stage '{stage}': {detail}")]
    GenerationFailed {
        /// The stage whose provider call failed.
        stage: StageName,
        /// Provider error text, including the attempt count when retries ran out.
        detail: String,
    },

    /// The pre-hook could not seed the initial state.
    ///
    /// Produced at the very start of a run, before any stage executes; wraps
    /// the seeder's own failure text at the boundary.
    #[error("Initial-state seeding failed: {detail}")]
    SeedFailed {
        /// Seeder error text.
        detail: String,
    },

    /// The deployment target reported a failure.
    ///
    /// Surfaced to the caller unchanged; the dispatcher performs no local
    /// retry and the approval gate's recorded decision is unaffected.
    #[error("Deployment failed: {detail}")]
    DeploymentFailed {
        /// Deployment target error text.
        detail: String,
    },

    /// An approval decision (or a dispatch) arrived in a state that does not
    /// accept it.
    ///
    /// The gate accepts exactly one decision while pending review; both
    /// terminal states refuse further input. The gate's state is unchanged.
    #[error("Approval gate cannot accept this input while in state '{current}'")]
    InvalidApprovalTransition {
        /// The gate state at the time of the rejected input.
        current: ApprovalState,
    },
}
