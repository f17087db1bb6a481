//! MailWorks marketing-platform infrastructure adapter.
//!
//! Implements [`pipeline::DeploymentTarget`]. The real platform API is an
//! external collaborator this system does not speak to directly; what ships
//! here is the sandbox target used for development and demos, which fabricates
//! a platform acknowledgment without leaving the process. Swapping in a real
//! adapter is a new `impl` of the same trait — nothing upstream changes.

use async_trait::async_trait;
use pipeline::{
    DeploymentError, DeploymentId, DeploymentResult, DeploymentStatus, DeploymentTarget,
    GovernedEmail, Timestamp,
};
use uuid::Uuid;

/// Length of the random token in a fabricated deployment id.
const ID_TOKEN_LEN: usize = 8;

/// A deployment target that accepts everything and fabricates platform ids.
///
/// Ids are `mk_` followed by the first eight hex characters of a fresh
/// UUIDv4 — short enough to read aloud, random enough never to collide in
/// practice. Every acceptance reports [`DeploymentStatus::Queued`], the
/// typical initial status on a real platform.
#[derive(Debug, Default)]
pub struct SandboxTarget;

impl SandboxTarget {
    /// Creates a sandbox target.
    pub fn new() -> Self {
        Self
    }

    fn fabricate_id() -> Result<DeploymentId, DeploymentError> {
        let token: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(ID_TOKEN_LEN)
            .collect();
        DeploymentId::new(format!("mk_{token}"))
            .ok_or_else(|| DeploymentError::new("fabricated deployment id was empty"))
    }
}

#[async_trait]
impl DeploymentTarget for SandboxTarget {
    async fn deploy(&self, email: &GovernedEmail) -> Result<DeploymentResult, DeploymentError> {
        let id = Self::fabricate_id()?;
        tracing::info!(
            %id,
            subjects = email.subject_lines.len(),
            bodies = email.body_variants.len(),
            "sandbox deployment queued"
        );
        Ok(DeploymentResult {
            id,
            status: DeploymentStatus::Queued,
            note: "Sandbox draft created successfully.".to_string(),
            queued_at: Timestamp::now(),
        })
    }
}
