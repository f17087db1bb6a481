//! Shared value types for the MailWorks pipeline domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. a safety report's `safe` flag is
//! derived from its findings, never set independently) and participate in
//! domain computations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::DeploymentId;

// ---------------------------------------------------------------------------
// Run inputs
// ---------------------------------------------------------------------------

/// The campaign brief: an opaque structured document describing what the
/// campaign is about.
///
/// Loaded once before the pipeline runs and never mutated by any stage. The
/// orchestrator only threads it into generation prompts; it has no schema of
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignBrief(serde_json::Value);

impl CampaignBrief {
    /// Wraps a structured document as a campaign brief.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the underlying structured document.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

// ---------------------------------------------------------------------------

/// Brand rules applied during governance.
///
/// Loaded once before the pipeline runs; immutable for the run's duration.
/// All fields are optional in the source document — a missing
/// `subject_length_limit` falls back to 60 characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeGuidelines {
    /// Phrases that must not appear in any subject line (matched
    /// case-insensitively). Empty when the brand bans nothing.
    #[serde(default)]
    pub banned_phrases: BTreeSet<String>,

    /// Maximum subject line length in characters; longer subjects are
    /// truncated, not dropped.
    #[serde(default = "default_subject_length_limit")]
    pub subject_length_limit: usize,

    /// Legal disclaimer appended to every body variant, when configured.
    #[serde(default)]
    pub disclaimer: Option<String>,
}

fn default_subject_length_limit() -> usize {
    60
}

impl Default for CreativeGuidelines {
    fn default() -> Self {
        Self {
            banned_phrases: BTreeSet::new(),
            subject_length_limit: default_subject_length_limit(),
            disclaimer: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Email content
// ---------------------------------------------------------------------------

/// Email copy as produced by the generation stage: three candidate subject
/// lines and two body variants.
///
/// The expected lengths are a prompt contract, not a structural invariant —
/// downstream consumers validate what they need and the pipeline itself does
/// not enforce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEmail {
    /// Candidate subject lines, in the order the generator proposed them.
    pub subject_lines: Vec<String>,
    /// Candidate body texts, in the order the generator proposed them.
    pub body_variants: Vec<String>,
}

/// Email copy after brand governance.
///
/// Same shape as [`DraftEmail`], but a distinct type: a governed email is
/// only ever produced by a governance stage, so holding one is proof the
/// brand rules ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernedEmail {
    /// Surviving subject lines, original order preserved.
    pub subject_lines: Vec<String>,
    /// Body variants, disclaimered when the guidelines require it.
    pub body_variants: Vec<String>,
}

// ---------------------------------------------------------------------------
// Safety report
// ---------------------------------------------------------------------------

/// Result of the deterministic safety check.
///
/// `safe` is derived: it is true iff `spam_hits` is empty and no PII was
/// detected. The fields are private and the only constructors are
/// [`SafetyReport::from_findings`] and [`SafetyReport::fail_closed`], so a
/// report whose flag disagrees with its findings cannot exist — including
/// after a round-trip through JSON, where the stored flag is discarded and
/// recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SafetyFindings")]
pub struct SafetyReport {
    safe: bool,
    spam_hits: BTreeSet<String>,
    pii_detected: bool,
}

/// Deserialisation shadow for [`SafetyReport`]: carries only the findings;
/// the derived `safe` flag is recomputed on the way in.
#[derive(Deserialize)]
struct SafetyFindings {
    #[serde(default)]
    spam_hits: BTreeSet<String>,
    #[serde(default)]
    pii_detected: bool,
}

impl From<SafetyFindings> for SafetyReport {
    fn from(findings: SafetyFindings) -> Self {
        Self::from_findings(findings.spam_hits, findings.pii_detected)
    }
}

impl SafetyReport {
    /// Builds a report from raw findings, deriving the `safe` flag.
    pub fn from_findings(spam_hits: BTreeSet<String>, pii_detected: bool) -> Self {
        Self {
            safe: spam_hits.is_empty() && !pii_detected,
            spam_hits,
            pii_detected,
        }
    }

    /// The report produced when content could not be inspected at all:
    /// unsafe, no spam findings, PII assumed present.
    pub fn fail_closed() -> Self {
        Self::from_findings(BTreeSet::new(), true)
    }

    /// Returns `true` iff no spam trigger hit and no PII was detected.
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// The spam trigger words found in the content, in lexicographic order.
    pub fn spam_hits(&self) -> &BTreeSet<String> {
        &self.spam_hits
    }

    /// Returns `true` if an email-address or phone-number pattern was found.
    pub fn pii_detected(&self) -> bool {
        self.pii_detected
    }
}

// ---------------------------------------------------------------------------
// Packaging and terminal actions
// ---------------------------------------------------------------------------

/// The bundle presented to the human reviewer: the governed email alongside
/// the safety findings about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagedOutput {
    /// The email as it would be deployed.
    pub governed_email: GovernedEmail,
    /// The deterministic safety findings for that exact content.
    pub safety_report: SafetyReport,
}

// ---------------------------------------------------------------------------

/// The human reviewer's verdict on a packaged output.
///
/// Supplied externally; never inferred from pipeline state. The approval
/// gate records exactly one of these per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Deploy the governed email to the marketing platform.
    Approve,
    /// Discard the governed email; acknowledge and stop.
    Reject,
}

// ---------------------------------------------------------------------------

/// Lifecycle status of a deployment on the marketing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Accepted by the platform; delivery pending.
    Queued,
    /// Delivered.
    Deployed,
    /// The platform reported a post-acceptance failure.
    Failed,
}

/// What the deployment target reported after accepting a governed email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    /// Platform-assigned identifier for the deployed email.
    pub id: DeploymentId,
    /// Lifecycle status at the time of the response.
    pub status: DeploymentStatus,
    /// Human-readable status note from the platform.
    pub note: String,
    /// When the target accepted the deployment.
    pub queued_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
