//! The actor capability trait.

use std::sync::Arc;

use async_trait::async_trait;
use remedy_policy::PolicyNode;
use remedy_types::{BackendRequest, OnsetEvent};

use crate::error::Result;
use crate::inventory::Inventory;

/// Context handed to builders for auxiliary lookups.
///
/// The inventory collaborator is optional; builders that need it and
/// find it absent treat the request as unbuildable rather than panic.
#[derive(Clone, Default)]
pub struct ActorContext {
    inventory: Option<Arc<dyn Inventory>>,
}

impl ActorContext {
    /// Context with no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an inventory collaborator.
    pub fn with_inventory(mut self, inventory: Arc<dyn Inventory>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// The inventory collaborator, if configured.
    pub fn inventory(&self) -> Option<&Arc<dyn Inventory>> {
        self.inventory.as_ref()
    }
}

impl std::fmt::Debug for ActorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorContext")
            .field("inventory", &self.inventory.is_some())
            .finish()
    }
}

/// A pluggable backend integration.
///
/// Implementations describe their capabilities (recipes, valid targets
/// per recipe, required payload keys per recipe) and build
/// backend-specific requests. Builders must not mutate the event or
/// policy; they construct and return a fresh request value.
#[async_trait]
pub trait Actor: Send + Sync {
    /// Actor name used for registry lookup and policy `actor` fields.
    fn name(&self) -> &str;

    /// Recipes this actor supports.
    fn recipes(&self) -> Vec<String>;

    /// Valid target types for a recipe. Empty for an unknown recipe —
    /// not an error.
    fn recipe_targets(&self, recipe: &str) -> Vec<String>;

    /// Payload keys a recipe requires from the event's details. Empty
    /// for an unknown recipe — not an error.
    fn recipe_payloads(&self, recipe: &str) -> Vec<String>;

    /// Build a backend request for the given event and policy step.
    ///
    /// Returns `Ok(None)` when this actor does not support the
    /// policy's recipe, signaling the caller to treat the operation as
    /// non-actionable rather than crash.
    async fn build_request(
        &self,
        event: &OnsetEvent,
        policy: &PolicyNode,
        ctx: &ActorContext,
    ) -> Result<Option<BackendRequest>>;
}
