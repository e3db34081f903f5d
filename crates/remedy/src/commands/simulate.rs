//! Simulate command - run one transaction with local collaborators.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use remedy_actors::{ActorRegistry, AppcActor, SoActor, VfcActor};
use remedy_engine::{Engine, EngineConfig, RecordingTransport, Transport};
use remedy_policy::PolicyChain;
use remedy_types::{OnsetEvent, Outcome};
use tracing::debug;

use super::Context;

/// Arguments for the simulate command.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Policy chain YAML file
    pub chain: PathBuf,

    /// Onset event JSON file
    #[arg(long)]
    pub event: PathBuf,

    /// Engine configuration TOML file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Dry-run a chain: local lock manager, disabled guard, recording
/// transport, and an automatic Success outcome for every dispatched
/// request.
pub async fn run(args: SimulateArgs, _ctx: &Context) -> Result<()> {
    let chain = PolicyChain::load_file(&args.chain)
        .with_context(|| format!("invalid policy chain: {}", args.chain.display()))?;

    let event_json = std::fs::read_to_string(&args.event)
        .with_context(|| format!("cannot read event: {}", args.event.display()))?;
    let event: OnsetEvent = serde_json::from_str(&event_json)
        .with_context(|| format!("invalid onset event: {}", args.event.display()))?;

    let config = match &args.config {
        Some(path) => EngineConfig::load_file(path)
            .with_context(|| format!("invalid config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let registry = Arc::new(ActorRegistry::new());
    registry.register(AppcActor::new());
    registry.register(SoActor::new());
    registry.register(VfcActor::new());

    let transport = Arc::new(RecordingTransport::new());
    let engine = Engine::builder(Arc::clone(&registry), Arc::clone(&transport) as Arc<dyn Transport>)
        .config(config)
        .build();
    engine.install_chain(chain);

    let handle = engine.process_event(event)?;
    let id = handle.id();
    println!("transaction {id} started");

    // Answer every dispatched request with Success until the chain
    // reaches a terminal. Requests that never dispatch (non-actionable
    // recipes) end the transaction without our help.
    let feeder = tokio::spawn(async move {
        let mut answered = 0usize;
        loop {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let dispatched = transport.len();
            while answered < dispatched {
                answered += 1;
                debug!(transaction = %id, answered, "auto-feeding success outcome");
                if engine.outcome(id, Outcome::Success).is_err() {
                    return;
                }
            }
            if engine.live_transactions() == 0 {
                return;
            }
        }
    });

    let report = handle.wait().await?;
    feeder.await.ok();

    println!("terminal: {}", report.terminal);
    for op in &report.operations {
        println!(
            "  {} — {} {} ({} attempt(s), outcome {})",
            op.policy_id, op.actor, op.recipe, op.attempts, op.outcome
        );
    }

    if !report.terminal.is_success() {
        bail!("transaction ended in {}", report.terminal);
    }
    Ok(())
}
