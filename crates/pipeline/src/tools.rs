//! Deterministic validation tools.
//!
//! These are pure, total functions exposed to the pipeline as callable tools.
//! They complement the opaque generation steps with rule-based checks that
//! hold regardless of what the generator produced: [`brand_check`] enforces
//! the brand rules mechanically, [`safety_check`] reports spam triggers and
//! PII patterns. Neither ever fails for content reasons — malformed content
//! yields a report (fail-closed for safety), not an error.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CreativeGuidelines, DraftEmail, GovernedEmail, SafetyReport};

/// Spam trigger words commonly flagged by mailbox filters.
///
/// Matched as lowercase substrings of the serialised email, so derived forms
/// ("freedom") hit too — this is a deliberately coarse heuristic.
const SPAM_TRIGGERS: [&str; 3] = ["free", "guaranteed", "urgent"];

/// Email-address and US-phone-number shapes.
///
/// `local@domain` with word/dot/hyphen characters, or 3-3-4 digit groups with
/// optional `-`, `.`, or whitespace separators. The upstream implementation
/// shipped this pattern with doubled escapes that could never match; the
/// intended plain pattern is the contract here.
static PII_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w.-]+@[\w.-]+|\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("hand-written PII pattern compiles")
});

/// Applies the brand rules to a draft, producing the governed email.
///
/// - A subject line that contains any banned phrase (case-insensitively) is
///   dropped entirely; survivors are truncated to
///   `guidelines.subject_length_limit` characters and stripped of trailing
///   whitespace. Order is preserved; dropped subjects are not replaced.
/// - When a disclaimer is configured it is appended to every body variant as
///   `"\n\n*<disclaimer>*"`. No body is ever dropped.
///
/// Pure: the inputs are untouched and the output holds fresh sequences.
pub fn brand_check(draft: &DraftEmail, guidelines: &CreativeGuidelines) -> GovernedEmail {
    let banned: BTreeSet<String> = guidelines
        .banned_phrases
        .iter()
        .map(|phrase| phrase.to_lowercase())
        .collect();

    let subject_lines = draft
        .subject_lines
        .iter()
        .filter(|subject| {
            let lowered = subject.to_lowercase();
            !banned.iter().any(|phrase| lowered.contains(phrase))
        })
        .map(|subject| truncate_chars(subject, guidelines.subject_length_limit))
        .collect();

    let body_variants = match &guidelines.disclaimer {
        Some(disclaimer) => draft
            .body_variants
            .iter()
            .map(|body| format!("{body}\n\n*{disclaimer}*"))
            .collect(),
        None => draft.body_variants.clone(),
    };

    GovernedEmail {
        subject_lines,
        body_variants,
    }
}

/// Truncates to `limit` characters (not bytes, so multi-byte subjects stay
/// intact) and strips trailing whitespace.
fn truncate_chars(subject: &str, limit: usize) -> String {
    let truncated: String = subject.chars().take(limit).collect();
    truncated.trim_end().to_string()
}

/// Inspects an email for spam triggers and PII patterns.
///
/// The whole structure is serialised to canonical lowercase JSON and searched
/// as text, so findings in any field — subject, body, or anything else the
/// generator produced — are caught. Never fails: content that cannot be
/// serialised degrades to the fail-closed report (`safe = false`,
/// `pii_detected = true`, no spam findings).
pub fn safety_check(email: &serde_json::Value) -> SafetyReport {
    let Ok(serialised) = serde_json::to_string(email) else {
        return SafetyReport::fail_closed();
    };
    let text = serialised.to_lowercase();

    let spam_hits: BTreeSet<String> = SPAM_TRIGGERS
        .iter()
        .filter(|trigger| text.contains(**trigger))
        .map(|trigger| (*trigger).to_string())
        .collect();

    let pii_detected = PII_PATTERN.is_match(&text);

    SafetyReport::from_findings(spam_hits, pii_detected)
}
