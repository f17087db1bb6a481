//! The initial-state pre-hook.
//!
//! Loads the campaign brief and creative guidelines from a JSON document on
//! disk and seeds exactly those two keys into the shared state before stage 1
//! runs. The expected document shape is:
//!
//! ```json
//! {
//!   "campaign_brief": { ... },
//!   "creative_guidelines": { "banned_phrases": [...], ... }
//! }
//! ```

use std::path::PathBuf;

use pipeline::{state::keys, CampaignBrief, CreativeGuidelines, SeedError, SharedState, StateSeeder};
use serde::Deserialize;

/// The document shape on disk. Deserialising it up front means a document
/// with malformed guidelines fails at seed time, not mid-pipeline.
#[derive(Deserialize)]
struct InitialState {
    campaign_brief: CampaignBrief,
    creative_guidelines: CreativeGuidelines,
}

/// Seeds `campaign_brief` and `creative_guidelines` from a JSON file.
pub struct JsonFileSeeder {
    path: PathBuf,
}

impl JsonFileSeeder {
    /// Creates a seeder over the given document path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StateSeeder for JsonFileSeeder {
    fn seed(&self, state: &mut SharedState) -> Result<(), SeedError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            SeedError::new(format!("cannot read {}: {err}", self.path.display()))
        })?;
        let document: InitialState = serde_json::from_str(&raw).map_err(|err| {
            SeedError::new(format!("{} is not a valid initial state: {err}", self.path.display()))
        })?;

        let brief = document.campaign_brief.as_value().clone();
        let guidelines = serde_json::to_value(&document.creative_guidelines)
            .map_err(|err| SeedError::new(err.to_string()))?;

        state
            .insert(keys::campaign_brief(), brief)
            .map_err(|err| SeedError::new(err.to_string()))?;
        state
            .insert(keys::creative_guidelines(), guidelines)
            .map_err(|err| SeedError::new(err.to_string()))?;
        tracing::debug!(path = %self.path.display(), "initial state loaded");
        Ok(())
    }
}
