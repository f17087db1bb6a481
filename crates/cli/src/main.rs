//! MailWorks CLI entry point.
//!
//! This binary is the composition root for the entire system:
//!
//! 1. **Wire observability** — `tracing-subscriber` with an `EnvFilter`, so
//!    `RUST_LOG` controls every crate in the workspace.
//! 2. **Resolve configuration** — one explicit [`CliConfig`] assembled in one
//!    place; no environment lookups scattered through modules.
//! 3. **Construct infrastructure** — the JSON file seeder, the HTTP
//!    generation provider, the sandbox deployment target — and inject them
//!    into the campaign pipeline.
//! 4. **Run one pipeline**, present the packaged output, collect the
//!    operator's approval decision on stdin, and dispatch the terminal
//!    action.

mod seed;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use llm::{HttpGenerationProvider, ProviderConfig, RetryConfig};
use nodes::{campaign_pipeline, ActionDispatcher, ActionOutcome, BrandGovernance};
use pipeline::{ApprovalDecision, ApprovalGate, PackagedOutput};
use platform::SandboxTarget;
use tracing_subscriber::EnvFilter;

use crate::seed::JsonFileSeeder;

/// Everything the composition root needs, resolved up front.
struct CliConfig {
    /// Path to the initial-state JSON document.
    initial_state: PathBuf,
    /// Generation endpoint URL.
    generation_endpoint: String,
    /// Model name forwarded to the endpoint.
    generation_model: String,
    /// Brand-governance mode.
    governance: BrandGovernance,
}

impl CliConfig {
    /// Resolves configuration from the command line and environment.
    ///
    /// The initial-state path comes from the first positional argument, or
    /// from `MAILWORKS_DATA_ROOT/initial_state.json`.
    fn resolve() -> anyhow::Result<Self> {
        let initial_state = match std::env::args().nth(1) {
            Some(path) => PathBuf::from(path),
            None => {
                let root = std::env::var("MAILWORKS_DATA_ROOT").map_err(|_| {
                    anyhow!(
                        "pass the initial-state path as an argument or set MAILWORKS_DATA_ROOT"
                    )
                })?;
                PathBuf::from(root).join("initial_state.json")
            }
        };

        let governance = match std::env::var("MAILWORKS_BRAND_MODE").as_deref() {
            Ok("generative") => BrandGovernance::Generative,
            _ => BrandGovernance::Deterministic,
        };

        Ok(Self {
            initial_state,
            generation_endpoint: std::env::var("MAILWORKS_GENERATION_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8089/v1/generate".to_string()),
            generation_model: std::env::var("MAILWORKS_GENERATION_MODEL")
                .unwrap_or_else(|_| "creative-small".to_string()),
            governance,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CliConfig::resolve()?;

    let provider = HttpGenerationProvider::new(ProviderConfig {
        endpoint: config.generation_endpoint.clone(),
        model: config.generation_model.clone(),
        request_timeout: Duration::from_secs(60),
        retry: RetryConfig::default(),
    })
    .context("constructing the generation provider")?;

    let pipeline = campaign_pipeline(
        Box::new(JsonFileSeeder::new(config.initial_state.clone())),
        Arc::new(provider),
        config.governance,
    );

    let outcome = pipeline.run().await.context("pipeline run aborted")?;
    let package: PackagedOutput = serde_json::from_value(outcome.terminal.clone())
        .context("packaging stage produced an undecodable bundle")?;

    present_for_review(&package)?;
    let decision = read_decision()?;

    let mut gate = ApprovalGate::new(package);
    gate.decide(decision)?;

    let dispatcher = ActionDispatcher::new(Arc::new(SandboxTarget::new()));
    match dispatcher.dispatch(&gate).await? {
        ActionOutcome::Rejected { confirmation } => println!("{confirmation}"),
        ActionOutcome::Deployed(result) => {
            println!(
                "Deployment {} {:?} at {} — {}",
                result.id, result.status, result.queued_at, result.note
            );
        }
    }
    Ok(())
}

/// Prints the governed email and its safety report for the operator.
fn present_for_review(package: &PackagedOutput) -> anyhow::Result<()> {
    println!("=== Governed email ===");
    println!("{}", serde_json::to_string_pretty(&package.governed_email)?);
    println!("=== Safety report ===");
    println!("{}", serde_json::to_string_pretty(&package.safety_report)?);
    Ok(())
}

/// Prompts on stdin until the operator types `approve` or `reject`.
fn read_decision() -> anyhow::Result<ApprovalDecision> {
    let stdin = std::io::stdin();
    loop {
        print!("approve or reject? ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(anyhow!("stdin closed before a decision was made"));
        }
        match line.trim().to_lowercase().as_str() {
            "approve" => return Ok(ApprovalDecision::Approve),
            "reject" => return Ok(ApprovalDecision::Reject),
            other => eprintln!("unrecognised decision '{other}'"),
        }
    }
}
