//! The sequential pipeline runner.
//!
//! [`SequentialPipeline`] runs an ordered, fixed list of stages against one
//! freshly created [`SharedState`]: the pre-hook seeds the state exactly once
//! before stage 1, stages execute strictly in list order with no concurrency
//! between them, and the first fatal error aborts the run — no subsequent
//! stage executes and the partially written state is dropped with the run.

use pipeline::{MailWorksError, RunId, SharedState, StateSeeder};
use tracing::Instrument;

use crate::stage::Stage;

/// What a completed run hands back to the caller.
///
/// The terminal value is whatever the last stage wrote; every earlier output
/// remains addressable in `state` — in particular `governed_email` and
/// `safety_report` stay readable for presentation to the approval step.
#[derive(Debug)]
pub struct RunOutcome {
    /// Correlates all spans and events of this run.
    pub run_id: RunId,
    /// The full shared state, in write order.
    pub state: SharedState,
    /// The last stage's output (`null` for an empty stage list).
    pub terminal: serde_json::Value,
}

/// Runs an ordered list of stages against one exclusively owned state.
pub struct SequentialPipeline {
    seeder: Box<dyn StateSeeder>,
    stages: Vec<Box<dyn Stage>>,
}

impl SequentialPipeline {
    /// Assembles a pipeline from its pre-hook and an ordered stage list.
    pub fn new(seeder: Box<dyn StateSeeder>, stages: Vec<Box<dyn Stage>>) -> Self {
        Self { seeder, stages }
    }

    /// Executes one run.
    ///
    /// Seeds a fresh state through the pre-hook, then executes each stage in
    /// order, storing its output under its declared key. Any stage failure —
    /// and any write that violates the single-writer discipline — aborts the
    /// run immediately; state never outlives an aborted run.
    pub async fn run(&self) -> Result<RunOutcome, MailWorksError> {
        let run_id = RunId::new_random();
        let span = tracing::info_span!("pipeline_run", %run_id);

        async {
            let mut state = SharedState::new();
            self.seeder
                .seed(&mut state)
                .map_err(|err| MailWorksError::SeedFailed {
                    detail: err.to_string(),
                })?;
            tracing::debug!(seeded_keys = state.len(), "initial state seeded");

            let mut terminal = serde_json::Value::Null;
            for stage in &self.stages {
                let stage_span = tracing::info_span!("stage", name = %stage.name());
                let value = stage.execute(&state).instrument(stage_span).await?;
                state.insert(stage.output_key().clone(), value.clone())?;
                tracing::debug!(stage = %stage.name(), key = %stage.output_key(), "stage completed");
                terminal = value;
            }

            Ok(RunOutcome {
                run_id,
                state,
                terminal,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pipeline::{SeedError, StageName, StateKey};
    use serde_json::json;

    use super::*;
    use crate::support::MapSeeder;

    /// A stage that records its execution order and optionally fails.
    struct ProbeStage {
        name: StageName,
        output_key: StateKey,
        log: Arc<std::sync::Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ProbeStage {
        fn new(name: &str, log: Arc<std::sync::Mutex<Vec<String>>>, fail: bool) -> Box<Self> {
            Box::new(Self {
                name: StageName::new(name).unwrap(),
                output_key: StateKey::new(format!("{name}_out")).unwrap(),
                log,
                fail,
            })
        }
    }

    #[async_trait]
    impl Stage for ProbeStage {
        fn name(&self) -> &StageName {
            &self.name
        }

        fn output_key(&self) -> &StateKey {
            &self.output_key
        }

        async fn execute(&self, _state: &SharedState) -> Result<serde_json::Value, MailWorksError> {
            self.log.lock().unwrap().push(self.name.as_str().to_string());
            if self.fail {
                return Err(MailWorksError::GenerationFailed {
                    stage: self.name.clone(),
                    detail: "scripted failure".to_string(),
                });
            }
            Ok(json!(self.name.as_str()))
        }
    }

    fn empty_seeder() -> Box<MapSeeder> {
        Box::new(MapSeeder::new(vec![]))
    }

    #[tokio::test]
    async fn stages_run_strictly_in_list_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline = SequentialPipeline::new(
            empty_seeder(),
            vec![
                ProbeStage::new("first", log.clone(), false),
                ProbeStage::new("second", log.clone(), false),
                ProbeStage::new("third", log.clone(), false),
            ],
        );

        let outcome = pipeline.run().await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
        assert_eq!(outcome.terminal, json!("third"));
    }

    #[tokio::test]
    async fn the_pre_hook_seeds_before_any_stage_and_earlier_outputs_stay_readable() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seeder = Box::new(MapSeeder::new(vec![(
            StateKey::new("campaign_brief").unwrap(),
            json!("brief"),
        )]));
        let pipeline = SequentialPipeline::new(
            seeder,
            vec![
                ProbeStage::new("first", log.clone(), false),
                ProbeStage::new("second", log.clone(), false),
            ],
        );

        let outcome = pipeline.run().await.unwrap();

        // Seeded key first, then outputs in stage order.
        let order: Vec<&str> = outcome.state.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, ["campaign_brief", "first_out", "second_out"]);
        assert_eq!(
            outcome.state.require(&StateKey::new("first_out").unwrap()).unwrap(),
            &json!("first")
        );
    }

    #[tokio::test]
    async fn a_fatal_stage_error_aborts_the_run_immediately() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline = SequentialPipeline::new(
            empty_seeder(),
            vec![
                ProbeStage::new("first", log.clone(), false),
                ProbeStage::new("failing", log.clone(), true),
                ProbeStage::new("never", log.clone(), false),
            ],
        );

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, MailWorksError::GenerationFailed { .. }));
        // The stage after the failure never began.
        assert_eq!(*log.lock().unwrap(), ["first", "failing"]);
    }

    #[tokio::test]
    async fn a_failing_seeder_aborts_before_stage_one() {
        struct FailingSeeder;
        impl StateSeeder for FailingSeeder {
            fn seed(&self, _state: &mut SharedState) -> Result<(), SeedError> {
                Err(SeedError::new("no initial state document"))
            }
        }

        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline = SequentialPipeline::new(
            Box::new(FailingSeeder),
            vec![ProbeStage::new("first", log.clone(), false)],
        );

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, MailWorksError::SeedFailed { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn two_stages_declaring_the_same_output_key_violate_the_write_contract() {
        struct FixedKeyStage(StageName, StateKey);

        #[async_trait]
        impl Stage for FixedKeyStage {
            fn name(&self) -> &StageName {
                &self.0
            }
            fn output_key(&self) -> &StateKey {
                &self.1
            }
            async fn execute(
                &self,
                _state: &SharedState,
            ) -> Result<serde_json::Value, MailWorksError> {
                Ok(json!(1))
            }
        }

        let duplicate = || {
            Box::new(FixedKeyStage(
                StageName::new("dup").unwrap(),
                StateKey::new("shared_out").unwrap(),
            )) as Box<dyn Stage>
        };
        let pipeline = SequentialPipeline::new(empty_seeder(), vec![duplicate(), duplicate()]);

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, MailWorksError::StateKeyAlreadyWritten { .. }));
    }

    #[tokio::test]
    async fn an_empty_stage_list_yields_a_null_terminal() {
        let pipeline = SequentialPipeline::new(empty_seeder(), vec![]);
        let outcome = pipeline.run().await.unwrap();
        assert!(outcome.state.is_empty());
        assert_eq!(outcome.terminal, serde_json::Value::Null);
    }
}
