//! MailWorks stage implementations and pipeline execution.
//!
//! This crate sequences the work the domain crate defines: the [`stage`]
//! module provides the two stage variants (generation-backed and
//! tool-backed), [`runner`] drives an ordered stage list against one shared
//! state, [`dispatch`] executes the approval-gated terminal action, and
//! [`email`] assembles the concrete four-stage campaign pipeline.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between business logic in
//! the [`pipeline`] crate and the infrastructure ports (generation provider,
//! deployment target). They contain no domain rules of their own.

pub mod dispatch;
pub mod email;
pub mod runner;
pub mod stage;

#[cfg(test)]
pub(crate) mod support;

pub use dispatch::{ActionDispatcher, ActionOutcome, REJECT_CONFIRMATION};
pub use email::{campaign_pipeline, BrandGovernance};
pub use runner::{RunOutcome, SequentialPipeline};
pub use stage::{GenerationStage, Stage, ToolStage};
