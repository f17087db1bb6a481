//! The shared state threaded through one pipeline run.
//!
//! [`SharedState`] is the single channel of communication between stages: an
//! insertion-ordered mapping from [`StateKey`] to arbitrary structured JSON.
//! The contract is single-writer-per-key — each key is written at most once
//! per run, by the stage that owns it (or by the pre-hook, the only writer
//! permitted before stage 1). Reading an unset key is a caller error, never a
//! silent default.
//!
//! One run owns its state exclusively; the runner takes it by value and the
//! state of an aborted run is dropped with the run.

use serde::de::DeserializeOwned;

use crate::errors::MailWorksError;
use crate::identifiers::{StageName, StateKey};

/// Insertion-ordered single-writer-per-key mapping backing one pipeline run.
///
/// Backed by a vector: the key population is a handful of well-known names,
/// so ordered iteration matters more than lookup complexity.
#[derive(Debug, Default)]
pub struct SharedState {
    entries: Vec<(StateKey, serde_json::Value)>,
}

impl SharedState {
    /// Creates an empty state for a fresh run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` under `key`.
    ///
    /// Fails with [`MailWorksError::StateKeyAlreadyWritten`] if any writer —
    /// pre-hook or stage — has already produced this key in this run.
    pub fn insert(
        &mut self,
        key: StateKey,
        value: serde_json::Value,
    ) -> Result<(), MailWorksError> {
        if self.contains(&key) {
            return Err(MailWorksError::StateKeyAlreadyWritten { key });
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Returns the value under `key`, or `None` if no writer produced it.
    pub fn get(&self, key: &StateKey) -> Option<&serde_json::Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the value under `key`, failing with
    /// [`MailWorksError::MissingStateKey`] if no writer produced it.
    pub fn require(&self, key: &StateKey) -> Result<&serde_json::Value, MailWorksError> {
        self.get(key).ok_or_else(|| MailWorksError::MissingStateKey {
            key: key.clone(),
        })
    }

    /// Reads the value under `key` and decodes it into `T` on behalf of
    /// `stage`.
    ///
    /// A missing key is [`MailWorksError::MissingStateKey`]; a present value
    /// that does not decode is [`MailWorksError::MalformedStateValue`]. Both
    /// are contract violations, not content findings.
    pub fn require_decoded<T: DeserializeOwned>(
        &self,
        key: &StateKey,
        stage: &StageName,
    ) -> Result<T, MailWorksError> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).map_err(|err| {
            MailWorksError::MalformedStateValue {
                key: key.clone(),
                stage: stage.clone(),
                detail: err.to_string(),
            }
        })
    }

    /// Returns `true` if `key` has been written in this run.
    pub fn contains(&self, key: &StateKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates over `(key, value)` pairs in write order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &serde_json::Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Number of keys written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no writer has run yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Well-known keys
// ---------------------------------------------------------------------------

/// The state keys of the email campaign pipeline.
///
/// Seeded keys (`campaign_brief`, `creative_guidelines`) are written by the
/// pre-hook; the rest are each owned by exactly one stage.
pub mod keys {
    use super::StateKey;

    macro_rules! well_known {
        (
            $(#[$attr:meta])*
            $fn_name:ident => $literal:literal
        ) => {
            $(#[$attr])*
            pub fn $fn_name() -> StateKey {
                StateKey::new($literal).expect("well-known key literal is non-empty")
            }
        };
    }

    well_known! {
        /// The campaign brief seeded by the pre-hook.
        campaign_brief => "campaign_brief"
    }

    well_known! {
        /// The creative guidelines seeded by the pre-hook.
        creative_guidelines => "creative_guidelines"
    }

    well_known! {
        /// The draft email written by the copy stage.
        draft_email => "draft_email"
    }

    well_known! {
        /// The governed email written by the brand-governance stage.
        governed_email => "governed_email"
    }

    well_known! {
        /// The safety report written by the safety stage.
        safety_report => "safety_report"
    }

    well_known! {
        /// The reviewer bundle written by the packaging stage.
        packaged_output => "packaged_output"
    }
}
