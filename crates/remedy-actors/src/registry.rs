//! Process-wide actor catalog.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use remedy_policy::PolicyNode;
use remedy_types::{BackendRequest, OnsetEvent};
use tracing::{debug, warn};

use crate::actor::{Actor, ActorContext};
use crate::error::Result;

/// Catalog of registered actors.
///
/// The one process-wide shared structure in the engine: registration
/// takes the write lock (idempotent per name, last registration wins);
/// lookups take the read lock and clone `Arc`s out, so no reader ever
/// observes a partially-updated catalog. Owned by the host and
/// injected into the engine — not an ambient static.
#[derive(Default)]
pub struct ActorRegistry {
    actors: RwLock<HashMap<String, Arc<dyn Actor>>>,
}

impl ActorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor. Replaces any previous registration under the
    /// same name.
    pub fn register<A: Actor + 'static>(&self, actor: A) {
        self.register_arc(Arc::new(actor));
    }

    /// Register an actor from an `Arc`.
    pub fn register_arc(&self, actor: Arc<dyn Actor>) {
        let name = actor.name().to_string();
        debug!(actor = %name, "registering actor");
        self.actors.write().insert(name, actor);
    }

    /// Look up an actor by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Actor>> {
        self.actors.read().get(name).cloned()
    }

    /// Snapshot of all registered actors.
    pub fn list(&self) -> Vec<Arc<dyn Actor>> {
        self.actors.read().values().cloned().collect()
    }

    /// Names of all registered actors.
    pub fn names(&self) -> Vec<String> {
        self.actors.read().keys().cloned().collect()
    }

    /// Number of registered actors.
    pub fn len(&self) -> usize {
        self.actors.read().len()
    }

    /// Whether no actors are registered.
    pub fn is_empty(&self) -> bool {
        self.actors.read().is_empty()
    }

    /// Recipes supported by an actor. Empty for an unknown actor.
    pub fn recipes_for(&self, actor: &str) -> Vec<String> {
        self.get(actor).map(|a| a.recipes()).unwrap_or_default()
    }

    /// Valid target types for an actor's recipe. Empty for an unknown
    /// actor or recipe — never an error.
    pub fn targets_for(&self, actor: &str, recipe: &str) -> Vec<String> {
        self.get(actor)
            .map(|a| a.recipe_targets(recipe))
            .unwrap_or_default()
    }

    /// Required payload keys for an actor's recipe. Empty for an
    /// unknown actor or recipe — never an error.
    pub fn payload_keys_for(&self, actor: &str, recipe: &str) -> Vec<String> {
        self.get(actor)
            .map(|a| a.recipe_payloads(recipe))
            .unwrap_or_default()
    }

    /// Dispatch request building to the named actor.
    ///
    /// `Ok(None)` when the actor is unknown or does not support the
    /// policy's recipe — the caller decides the resulting outcome.
    pub async fn build_request(
        &self,
        actor: &str,
        event: &OnsetEvent,
        policy: &PolicyNode,
        ctx: &ActorContext,
    ) -> Result<Option<BackendRequest>> {
        let Some(actor) = self.get(actor) else {
            warn!(actor, policy = %policy.id, "no such actor registered");
            return Ok(None);
        };
        actor.build_request(event, policy, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::AppcActor;

    fn node(actor: &str, recipe: &str) -> PolicyNode {
        let yaml = format!(
            r#"
control_loop:
  name: cl
  trigger: step
policies:
  - id: step
    actor: {actor}
    recipe: {recipe}
    target: {{ type: VNF }}
"#
        );
        remedy_policy::PolicyChain::load(&yaml)
            .unwrap()
            .node("step")
            .unwrap()
            .clone()
    }

    #[test]
    fn unknown_actor_capabilities_are_empty() {
        let registry = ActorRegistry::new();
        assert!(registry.recipes_for("APPC").is_empty());
        assert!(registry.targets_for("APPC", "Restart").is_empty());
        assert!(registry.payload_keys_for("APPC", "Restart").is_empty());
    }

    #[test]
    fn unknown_recipe_capabilities_are_empty() {
        let registry = ActorRegistry::new();
        registry.register(AppcActor::new());
        assert!(registry.targets_for("APPC", "NoSuchRecipe").is_empty());
        assert!(registry.payload_keys_for("APPC", "NoSuchRecipe").is_empty());
    }

    #[test]
    fn registration_is_last_wins() {
        let registry = ActorRegistry::new();
        registry.register(AppcActor::new());
        registry.register(AppcActor::new());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["APPC".to_string()]);
    }

    #[tokio::test]
    async fn dispatch_to_unknown_actor_is_not_actionable() {
        let registry = ActorRegistry::new();
        let event = OnsetEvent::new("cl", "VNF", "generic-vnf.vnf-name", "vnf-1");
        let built = registry
            .build_request("SDNC", &event, &node("SDNC", "Reroute"), &ActorContext::new())
            .await
            .unwrap();
        assert!(built.is_none());
    }

    #[tokio::test]
    async fn dispatch_to_unsupported_recipe_is_not_actionable() {
        let registry = ActorRegistry::new();
        registry.register(AppcActor::new());
        let event = OnsetEvent::new("cl", "VNF", "generic-vnf.vnf-name", "vnf-1")
            .with_detail("generic-vnf.vnf-id", "abc");
        let built = registry
            .build_request("APPC", &event, &node("APPC", "Restart"), &ActorContext::new())
            .await
            .unwrap();
        assert!(built.is_none());
    }
}
