//! Port trait definitions for the external collaborators.
//!
//! The orchestration core treats every non-deterministic or side-effecting
//! collaborator as a port: the opaque generation capability, the marketing
//! platform's deployment surface, and the pre-hook that seeds the initial
//! state. Infrastructure crates implement these traits; nothing in this crate
//! performs I/O.
//!
//! Each port fails with its own small error type, converted into the matching
//! [`crate::errors::MailWorksError`] variant at the orchestration boundary so
//! infrastructure detail never leaks into the domain taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use crate::state::SharedState;
use crate::types::{DeploymentResult, GovernedEmail};

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Terminal failure of the generation capability.
///
/// Providers retry transient failures internally per their configured
/// schedule; by the time this error surfaces the retry budget is spent (or
/// the failure was never retryable) and the pipeline run aborts.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct GenerationError {
    detail: String,
}

impl GenerationError {
    /// Creates a terminal generation error from the provider's failure text.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// The opaque generation capability: text prompt in, text or structured JSON
/// out.
///
/// No internal logic is specified here — the prompt already has all state
/// values substituted in, and whatever comes back is stored verbatim under
/// the calling stage's output key. Plain text is returned as a JSON string
/// value.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates content for a fully substituted prompt.
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value, GenerationError>;
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

/// Failure reported by the deployment target.
///
/// The dispatcher surfaces this unchanged — retries, if any, belong to the
/// target itself.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct DeploymentError {
    detail: String,
}

impl DeploymentError {
    /// Creates a deployment error from the target's failure text.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// The marketing platform's deployment surface.
///
/// `deploy` hands over an approved governed email and returns the platform's
/// acknowledgment, including a platform-assigned unique identifier. This is
/// the irreversible action everything upstream gates.
#[async_trait]
pub trait DeploymentTarget: Send + Sync {
    /// Deploys an approved email, returning the platform's acknowledgment.
    async fn deploy(&self, email: &GovernedEmail) -> Result<DeploymentResult, DeploymentError>;
}

// ---------------------------------------------------------------------------
// Initial-state seeding
// ---------------------------------------------------------------------------

/// Failure to produce the initial state.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct SeedError {
    detail: String,
}

impl SeedError {
    /// Creates a seed error from the loader's failure text.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// The pre-hook: seeds `campaign_brief` and `creative_guidelines` into an
/// otherwise empty [`SharedState`] before stage 1 executes.
///
/// The runner invokes the seeder exactly once per run; it is the only writer
/// permitted before any stage.
pub trait StateSeeder: Send + Sync {
    /// Seeds the initial keys into `state`.
    fn seed(&self, state: &mut SharedState) -> Result<(), SeedError>;
}
