//! Scripted collaborator fakes shared across this crate's tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::{
    DeploymentError, DeploymentId, DeploymentResult, DeploymentStatus, DeploymentTarget,
    GenerationError, GenerationProvider, GovernedEmail, SeedError, SharedState, StateKey,
    StateSeeder, Timestamp,
};

/// A generation provider that replays a script, echoes, or always fails.
pub struct ScriptedProvider {
    mode: ProviderMode,
}

enum ProviderMode {
    /// Returns the prompt itself as a JSON string (for prompt-rendering tests).
    Echo,
    /// Pops pre-baked responses in order; failing when the script runs dry.
    Script(Mutex<Vec<serde_json::Value>>),
    /// Fails every call with the given detail.
    Fail(String),
}

impl ScriptedProvider {
    pub fn echoing() -> Self {
        Self {
            mode: ProviderMode::Echo,
        }
    }

    pub fn scripted(responses: Vec<serde_json::Value>) -> Self {
        let mut reversed = responses;
        reversed.reverse();
        Self {
            mode: ProviderMode::Script(Mutex::new(reversed)),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            mode: ProviderMode::Fail(detail.to_string()),
        }
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
        match &self.mode {
            ProviderMode::Echo => Ok(serde_json::Value::String(prompt.to_string())),
            ProviderMode::Script(responses) => responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| GenerationError::new("script exhausted")),
            ProviderMode::Fail(detail) => Err(GenerationError::new(detail.clone())),
        }
    }
}

// ---------------------------------------------------------------------------

/// A deployment target that counts calls and either accepts or refuses.
pub struct RecordingTarget {
    calls: AtomicUsize,
    refusal: Option<String>,
}

impl RecordingTarget {
    pub fn accepting() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            refusal: None,
        }
    }

    pub fn refusing(detail: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            refusal: Some(detail.to_string()),
        }
    }

    pub fn deploy_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentTarget for RecordingTarget {
    async fn deploy(&self, _email: &GovernedEmail) -> Result<DeploymentResult, DeploymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.refusal {
            Some(detail) => Err(DeploymentError::new(detail.clone())),
            None => Ok(DeploymentResult {
                id: DeploymentId::new("mk_scripted0").unwrap(),
                status: DeploymentStatus::Queued,
                note: "scripted acceptance".to_string(),
                queued_at: Timestamp::now(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// A pre-hook that seeds a fixed list of key/value pairs.
pub struct MapSeeder {
    seeds: Vec<(StateKey, serde_json::Value)>,
}

impl MapSeeder {
    pub fn new(seeds: Vec<(StateKey, serde_json::Value)>) -> Self {
        Self { seeds }
    }
}

impl StateSeeder for MapSeeder {
    fn seed(&self, state: &mut SharedState) -> Result<(), SeedError> {
        for (key, value) in &self.seeds {
            state
                .insert(key.clone(), value.clone())
                .map_err(|err| SeedError::new(err.to_string()))?;
        }
        Ok(())
    }
}
