//! The stage abstraction and its two variants.
//!
//! A stage is one unit of pipeline work: it reads some state keys, does its
//! work, and yields the value the runner stores under the stage's single
//! declared output key. [`GenerationStage`] delegates to the opaque
//! generation capability with a prompt built from state; [`ToolStage`] runs
//! one deterministic validation tool and can only fail on contract violations
//! (a missing or undecodable input), never on content.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{
    brand_check, safety_check, state::keys, GenerationProvider, MailWorksError, SharedState,
    StageName, StateKey,
};

/// One unit of pipeline work.
///
/// Stages never write state themselves; [`Stage::execute`] returns the value
/// and the runner stores it under [`Stage::output_key`], keeping the
/// single-writer discipline in one place.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage's name, unique within its pipeline.
    fn name(&self) -> &StageName;

    /// The single state key this stage produces.
    fn output_key(&self) -> &StateKey;

    /// Performs the work, reading inputs from `state`.
    async fn execute(&self, state: &SharedState) -> Result<serde_json::Value, MailWorksError>;
}

// ---------------------------------------------------------------------------
// Generation stages
// ---------------------------------------------------------------------------

/// A stage that calls the opaque generation capability.
///
/// The prompt is a template with `{key}` placeholders for each declared input
/// key; string state values substitute verbatim, structured values as JSON.
/// Only declared keys are substituted, so literal braces elsewhere in the
/// template (e.g. a JSON shape the generator must return) pass through
/// untouched.
pub struct GenerationStage {
    name: StageName,
    template: String,
    input_keys: Vec<StateKey>,
    output_key: StateKey,
    provider: Arc<dyn GenerationProvider>,
}

impl GenerationStage {
    /// Creates a generation stage.
    pub fn new(
        name: StageName,
        template: impl Into<String>,
        input_keys: Vec<StateKey>,
        output_key: StateKey,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            name,
            template: template.into(),
            input_keys,
            output_key,
            provider,
        }
    }

    /// Substitutes every declared input key's value into the template.
    ///
    /// A declared key with no value in `state` is a fatal contract violation.
    fn render_prompt(&self, state: &SharedState) -> Result<String, MailWorksError> {
        let mut prompt = self.template.clone();
        for key in &self.input_keys {
            let value = state.require(key)?;
            let rendered = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            prompt = prompt.replace(&format!("{{{}}}", key.as_str()), &rendered);
        }
        Ok(prompt)
    }
}

#[async_trait]
impl Stage for GenerationStage {
    fn name(&self) -> &StageName {
        &self.name
    }

    fn output_key(&self) -> &StateKey {
        &self.output_key
    }

    async fn execute(&self, state: &SharedState) -> Result<serde_json::Value, MailWorksError> {
        let prompt = self.render_prompt(state)?;
        self.provider
            .generate(&prompt)
            .await
            .map_err(|err| MailWorksError::GenerationFailed {
                stage: self.name.clone(),
                detail: err.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tool stages
// ---------------------------------------------------------------------------

/// The deterministic body of a [`ToolStage`].
type ToolFn =
    Box<dyn Fn(&SharedState, &StageName) -> Result<serde_json::Value, MailWorksError> + Send + Sync>;

/// A stage that invokes one deterministic validation tool.
///
/// Cannot fail for content reasons — unsafe or malformed content produces a
/// report, not an error. Contract violations (an input key nobody wrote, or a
/// value that does not decode into the shape the tool consumes) are fatal.
pub struct ToolStage {
    name: StageName,
    output_key: StateKey,
    tool: ToolFn,
}

impl ToolStage {
    fn stage_name(name: &str) -> StageName {
        StageName::new(name).expect("stage name literal is non-empty")
    }

    /// The brand-governance tool stage: decodes `draft_email` and
    /// `creative_guidelines`, applies [`pipeline::brand_check`], and produces
    /// `governed_email`.
    pub fn brand_check() -> Self {
        let name = Self::stage_name("brand");
        Self {
            name,
            output_key: keys::governed_email(),
            tool: Box::new(|state, stage| {
                let draft = state.require_decoded(&keys::draft_email(), stage)?;
                let guidelines = state.require_decoded(&keys::creative_guidelines(), stage)?;
                let governed = brand_check(&draft, &guidelines);
                serde_json::to_value(governed).map_err(|err| {
                    MailWorksError::MalformedStateValue {
                        key: keys::governed_email(),
                        stage: stage.clone(),
                        detail: err.to_string(),
                    }
                })
            }),
        }
    }

    /// The safety tool stage: inspects `governed_email` as raw structure —
    /// whatever shape governance produced — and produces `safety_report`.
    pub fn safety_check() -> Self {
        let name = Self::stage_name("safety");
        Self {
            name,
            output_key: keys::safety_report(),
            tool: Box::new(|state, _stage| {
                let email = state.require(&keys::governed_email())?;
                let report = safety_check(email);
                Ok(serde_json::json!(report))
            }),
        }
    }

    /// The packaging stage: bundles `governed_email` and `safety_report`
    /// into `packaged_output` for presentation to the reviewer.
    pub fn package() -> Self {
        let name = Self::stage_name("package");
        Self {
            name,
            output_key: keys::packaged_output(),
            tool: Box::new(|state, stage| {
                let governed_email: pipeline::GovernedEmail =
                    state.require_decoded(&keys::governed_email(), stage)?;
                let safety_report: pipeline::SafetyReport =
                    state.require_decoded(&keys::safety_report(), stage)?;
                let package = pipeline::PackagedOutput {
                    governed_email,
                    safety_report,
                };
                Ok(serde_json::json!(package))
            }),
        }
    }
}

#[async_trait]
impl Stage for ToolStage {
    fn name(&self) -> &StageName {
        &self.name
    }

    fn output_key(&self) -> &StateKey {
        &self.output_key
    }

    async fn execute(&self, state: &SharedState) -> Result<serde_json::Value, MailWorksError> {
        (self.tool)(state, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::support::ScriptedProvider;

    fn seeded_state() -> SharedState {
        let mut state = SharedState::new();
        state
            .insert(keys::campaign_brief(), json!({"product": "Widget"}))
            .unwrap();
        state
            .insert(
                keys::creative_guidelines(),
                json!({"banned_phrases": ["free"], "subject_length_limit": 20}),
            )
            .unwrap();
        state
    }

    #[tokio::test]
    async fn generation_substitutes_declared_keys_only() {
        let provider = Arc::new(ScriptedProvider::echoing());
        let stage = GenerationStage::new(
            StageName::new("copy").unwrap(),
            "Brief: {campaign_brief}\nReturn {\"subject_lines\": []}",
            vec![keys::campaign_brief()],
            keys::draft_email(),
            provider,
        );

        let prompt = stage.execute(&seeded_state()).await.unwrap();
        assert_eq!(
            prompt,
            json!("Brief: {\"product\":\"Widget\"}\nReturn {\"subject_lines\": []}")
        );
    }

    #[tokio::test]
    async fn string_state_values_substitute_verbatim() {
        let mut state = SharedState::new();
        state
            .insert(keys::campaign_brief(), json!("spring launch"))
            .unwrap();

        let stage = GenerationStage::new(
            StageName::new("copy").unwrap(),
            "Brief: {campaign_brief}",
            vec![keys::campaign_brief()],
            keys::draft_email(),
            Arc::new(ScriptedProvider::echoing()),
        );

        let prompt = stage.execute(&state).await.unwrap();
        assert_eq!(prompt, json!("Brief: spring launch"));
    }

    #[tokio::test]
    async fn generation_with_an_unseeded_input_key_is_fatal() {
        let stage = GenerationStage::new(
            StageName::new("copy").unwrap(),
            "Brief: {campaign_brief}",
            vec![keys::campaign_brief()],
            keys::draft_email(),
            Arc::new(ScriptedProvider::echoing()),
        );

        let err = stage.execute(&SharedState::new()).await.unwrap_err();
        assert!(matches!(err, MailWorksError::MissingStateKey { .. }));
    }

    #[tokio::test]
    async fn brand_tool_stage_governs_the_draft() {
        let mut state = seeded_state();
        state
            .insert(
                keys::draft_email(),
                json!({
                    "subject_lines": ["Free widgets!", "Widget news for everyone today"],
                    "body_variants": ["Hello", "Hi"]
                }),
            )
            .unwrap();

        let stage = ToolStage::brand_check();
        let governed = stage.execute(&state).await.unwrap();
        assert_eq!(
            governed,
            json!({
                "subject_lines": ["Widget news for ever"],
                "body_variants": ["Hello", "Hi"]
            })
        );
    }

    #[tokio::test]
    async fn brand_tool_stage_rejects_an_undecodable_draft() {
        let mut state = seeded_state();
        state
            .insert(keys::draft_email(), json!({"subject_lines": 42}))
            .unwrap();

        let err = ToolStage::brand_check().execute(&state).await.unwrap_err();
        assert!(matches!(err, MailWorksError::MalformedStateValue { .. }));
    }

    #[tokio::test]
    async fn safety_tool_stage_reports_instead_of_failing_on_spam() {
        let mut state = SharedState::new();
        state
            .insert(
                keys::governed_email(),
                json!({"subject_lines": ["Act urgent"], "body_variants": []}),
            )
            .unwrap();

        let report = ToolStage::safety_check().execute(&state).await.unwrap();
        assert_eq!(report["safe"], json!(false));
        assert_eq!(report["spam_hits"], json!(["urgent"]));
    }
}
