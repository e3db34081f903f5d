//! Actors command - built-in actor capability listing.

use anyhow::Result;
use clap::Args;
use remedy_actors::{ActorRegistry, AppcActor, SoActor, VfcActor};

use super::Context;

/// Arguments for the actors command.
#[derive(Args, Debug)]
pub struct ActorsArgs {}

pub fn run(_args: ActorsArgs, _ctx: &Context) -> Result<()> {
    let registry = ActorRegistry::new();
    registry.register(AppcActor::new());
    registry.register(SoActor::new());
    registry.register(VfcActor::new());

    let mut names = registry.names();
    names.sort();

    for name in names {
        println!("{name}");
        for recipe in registry.recipes_for(&name) {
            let targets = registry.targets_for(&name, &recipe).join(", ");
            println!("  {recipe} (targets: {targets})");
            let keys = registry.payload_keys_for(&name, &recipe);
            if !keys.is_empty() {
                println!("    payload keys: {}", keys.join(", "));
            }
        }
    }
    Ok(())
}
