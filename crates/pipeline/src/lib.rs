//! Core orchestration domain for MailWorks.
//!
//! This crate contains every domain concept of the campaign pipeline: the
//! shared-state contract between stages, the deterministic validation tools
//! that gate unsafe output, the human approval gate, newtype identifiers,
//! cross-cutting error types, and the port traits infrastructure crates
//! implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply
//! it, and the `nodes` crate sequences the calls.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`RunId`, `StateKey`, etc.) |
//! | [`types`] | Shared value types (`DraftEmail`, `SafetyReport`, etc.) |
//! | [`state`] | The single-writer-per-key [`SharedState`] and its well-known keys |
//! | [`tools`] | The deterministic validation tools (`brand_check`, `safety_check`) |
//! | [`approval`] | The human [`ApprovalGate`] state machine |
//! | [`ports`] | Collaborator traits (generation, deployment, seeding) |
//! | [`errors`] | Top-level error and retry-policy types |

pub mod approval;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod state;
pub mod tools;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use approval::{ApprovalGate, ApprovalState};
pub use errors::{MailWorksError, RetryPolicy};
pub use identifiers::{DeploymentId, RunId, StageName, StateKey};
pub use ports::{
    DeploymentError, DeploymentTarget, GenerationError, GenerationProvider, SeedError, StateSeeder,
};
pub use state::SharedState;
pub use tools::{brand_check, safety_check};
pub use types::{
    ApprovalDecision, CampaignBrief, CreativeGuidelines, DeploymentResult, DeploymentStatus,
    DraftEmail, GovernedEmail, PackagedOutput, SafetyReport, Timestamp,
};
