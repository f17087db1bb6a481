//! Assembly of the concrete email campaign pipeline.
//!
//! Copy generation → brand governance → safety check → packaging, exactly the
//! stage order the approval step depends on. Construction is explicit: the
//! pre-hook, the generation provider, and the governance mode are injected —
//! no module-level globals, no environment lookups.

use std::sync::Arc;

use pipeline::{state::keys, GenerationProvider, StageName, StateSeeder};

use crate::runner::SequentialPipeline;
use crate::stage::{GenerationStage, Stage, ToolStage};

/// Prompt for the copy stage: three subjects, two bodies, strict JSON so the
/// downstream tools can decode the result.
const COPY_TEMPLATE: &str = "\
You are an email copywriter. You are given a campaign brief and you need to \
write 3 subject lines and 2 body variants following the creative guidelines.
Campaign brief: {campaign_brief}
Creative guidelines: {creative_guidelines}

Return a STRICT JSON object with keys:
{
  \"subject_lines\": [\"...\", \"...\", \"...\"],
  \"body_variants\": [\"...\", \"...\"]
}
";

/// Prompt for the generative brand-governance stage.
const BRAND_TEMPLATE: &str = "\
You are a brand/style governance agent. You are given a draft email and you \
need to apply the creative guidelines to the draft email.
Draft email: {draft_email}
Creative guidelines: {creative_guidelines}
Return the governed email as the same STRICT JSON shape as the draft.
";

/// How the brand-governance stage is performed.
///
/// The generative mode reproduces the upstream behaviour (an opaque rewrite);
/// the deterministic mode runs the rule-based `brand_check` tool instead.
/// Both write `governed_email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandGovernance {
    /// Rewrite via the generation capability.
    Generative,
    /// Mechanical enforcement via the `brand_check` tool.
    Deterministic,
}

/// Builds the four-stage email campaign pipeline.
pub fn campaign_pipeline(
    seeder: Box<dyn StateSeeder>,
    provider: Arc<dyn GenerationProvider>,
    governance: BrandGovernance,
) -> SequentialPipeline {
    let copy = GenerationStage::new(
        stage_name("copy"),
        COPY_TEMPLATE,
        vec![keys::campaign_brief(), keys::creative_guidelines()],
        keys::draft_email(),
        provider.clone(),
    );

    let brand: Box<dyn Stage> = match governance {
        BrandGovernance::Generative => Box::new(GenerationStage::new(
            stage_name("brand"),
            BRAND_TEMPLATE,
            vec![keys::draft_email(), keys::creative_guidelines()],
            keys::governed_email(),
            provider,
        )),
        BrandGovernance::Deterministic => Box::new(ToolStage::brand_check()),
    };

    SequentialPipeline::new(
        seeder,
        vec![
            Box::new(copy),
            brand,
            Box::new(ToolStage::safety_check()),
            Box::new(ToolStage::package()),
        ],
    )
}

fn stage_name(name: &str) -> StageName {
    StageName::new(name).expect("stage name literal is non-empty")
}
