//! Remedy - control-loop remediation orchestration
//!
//! Main entry point for the remedy CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{actors, render, simulate, validate};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Remedy - control-loop remediation orchestration
#[derive(Parser)]
#[command(name = "remedy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a policy chain document
    Validate(validate::ValidateArgs),

    /// Render a coordination directive against a template directory
    Render(render::RenderArgs),

    /// List built-in actor capabilities
    Actors(actors::ActorsArgs),

    /// Run one transaction end-to-end with local collaborators
    Simulate(simulate::SimulateArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "remedy=debug,remedy_engine=debug,remedy_policy=debug,remedy_actors=debug,remedy_coordination=debug,info"
    } else {
        "remedy=info,remedy_engine=info,remedy_policy=info,remedy_actors=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily("logs", "remedy.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "remedy=trace,remedy_engine=trace,remedy_policy=trace,remedy_actors=trace,remedy_coordination=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Validate(args) => validate::run(args, &ctx),
        Commands::Render(args) => render::run(args, &ctx),
        Commands::Actors(args) => actors::run(args, &ctx),
        Commands::Simulate(args) => simulate::run(args, &ctx).await,
    }
}
