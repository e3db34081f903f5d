//! Validate command - policy chain document validation.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use remedy_policy::PolicyChain;

use super::Context;

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Policy chain YAML file
    pub chain: PathBuf,
}

pub fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let chain = PolicyChain::load_file(&args.chain)
        .with_context(|| format!("invalid policy chain: {}", args.chain.display()))?;

    println!("✓ {} is a valid policy chain", args.chain.display());
    println!("  control loop: {}", chain.name());
    println!("  trigger:      {}", chain.trigger());
    println!("  policies:     {}", chain.len());

    if ctx.verbose {
        for node in chain.nodes() {
            println!(
                "  - {} ({} {} on {}, timeout {}s, retry {})",
                node.id, node.actor, node.recipe, node.target.target_type, node.timeout, node.retry
            );
        }
    }
    Ok(())
}
