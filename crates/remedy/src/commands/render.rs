//! Render command - offline coordination directive rendering.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use remedy_coordination::{CoordinationDirective, CoordinationEvaluator};

use super::Context;

/// Arguments for the render command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Coordination directive YAML file
    pub directive: PathBuf,

    /// Directory holding <function>.template files
    #[arg(long)]
    pub templates: PathBuf,
}

pub fn run(args: RenderArgs, _ctx: &Context) -> Result<()> {
    let directive = CoordinationDirective::load_file(&args.directive)
        .with_context(|| format!("invalid directive: {}", args.directive.display()))?;

    let rendered = CoordinationEvaluator::new(&args.templates).render(&directive)?;
    println!("{rendered}");
    Ok(())
}
