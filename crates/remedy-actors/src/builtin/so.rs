//! SO actor: service orchestrator scale-out.

use async_trait::async_trait;
use remedy_policy::PolicyNode;
use remedy_types::{BackendRequest, OnsetEvent};
use serde_json::json;
use tracing::warn;

use crate::actor::{Actor, ActorContext};
use crate::error::Result;

const VF_MODULE_CREATE: &str = "VF Module Create";

/// Builds SO scale-out requests.
///
/// Supports the `VF Module Create` recipe against `VFC` targets. The
/// owning service instance is resolved through the inventory
/// collaborator; when the lookup cannot produce one, the request is
/// not buildable.
#[derive(Debug, Default)]
pub struct SoActor;

impl SoActor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Actor for SoActor {
    fn name(&self) -> &str {
        "SO"
    }

    fn recipes(&self) -> Vec<String> {
        vec![VF_MODULE_CREATE.to_string()]
    }

    fn recipe_targets(&self, recipe: &str) -> Vec<String> {
        match recipe {
            VF_MODULE_CREATE => vec!["VFC".to_string()],
            _ => Vec::new(),
        }
    }

    fn recipe_payloads(&self, _recipe: &str) -> Vec<String> {
        Vec::new()
    }

    async fn build_request(
        &self,
        event: &OnsetEvent,
        policy: &PolicyNode,
        ctx: &ActorContext,
    ) -> Result<Option<BackendRequest>> {
        if policy.recipe != VF_MODULE_CREATE {
            warn!(recipe = %policy.recipe, "SO does not support recipe");
            return Ok(None);
        }

        let Some(inventory) = ctx.inventory() else {
            warn!("SO requires an inventory collaborator; none configured");
            return Ok(None);
        };

        let Some(record) = inventory.query_by_name(&event.target_instance).await? else {
            warn!(target = %event.target_instance, "inventory has no record for target");
            return Ok(None);
        };
        let Some(service_instance_id) = record.service_instance_id else {
            warn!(
                target = %event.target_instance,
                "inventory record has no owning service instance"
            );
            return Ok(None);
        };

        let body = json!({
            "requestDetails": {
                "requestInfo": {
                    "source": "remedy",
                    "requestorId": "remedy",
                },
                "relatedInstanceList": [
                    { "relatedInstance": { "instanceId": service_instance_id } },
                ],
                "requestParameters": {
                    "userParams": [],
                },
            },
        });

        Ok(Some(BackendRequest::new(
            self.name(),
            VF_MODULE_CREATE,
            &policy.target.target_type,
            event.request_id,
            body,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Inventory, InventoryRecord};
    use crate::error::ActorError;
    use std::sync::Arc;

    struct FixedInventory(Option<InventoryRecord>);

    #[async_trait]
    impl Inventory for FixedInventory {
        async fn query_by_name(&self, _name: &str) -> Result<Option<InventoryRecord>> {
            Ok(self.0.clone())
        }

        async fn query_by_id(&self, _id: &str) -> Result<Option<InventoryRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingInventory;

    #[async_trait]
    impl Inventory for FailingInventory {
        async fn query_by_name(&self, _name: &str) -> Result<Option<InventoryRecord>> {
            Err(ActorError::Inventory("connection refused".into()))
        }

        async fn query_by_id(&self, _id: &str) -> Result<Option<InventoryRecord>> {
            Err(ActorError::Inventory("connection refused".into()))
        }
    }

    fn policy() -> PolicyNode {
        let yaml = r#"
control_loop:
  name: cl
  trigger: scale
policies:
  - id: scale
    actor: SO
    recipe: VF Module Create
    target: { type: VFC }
"#;
        remedy_policy::PolicyChain::load(yaml)
            .unwrap()
            .node("scale")
            .unwrap()
            .clone()
    }

    fn event() -> OnsetEvent {
        OnsetEvent::new("cl", "VFC", "vserver.vserver-name", "vm-1")
    }

    #[tokio::test]
    async fn builds_scale_out_with_resolved_service_instance() {
        let ctx = ActorContext::new().with_inventory(Arc::new(FixedInventory(Some(
            InventoryRecord {
                id: "vm-1-id".into(),
                name: Some("vm-1".into()),
                service_instance_id: Some("svc-9".into()),
            },
        ))));

        let request = SoActor::new()
            .build_request(&event(), &policy(), &ctx)
            .await
            .unwrap()
            .expect("request should be built");

        assert_eq!(request.actor, "SO");
        assert_eq!(
            request.body["requestDetails"]["relatedInstanceList"][0]["relatedInstance"]
                ["instanceId"],
            "svc-9"
        );
    }

    #[tokio::test]
    async fn missing_inventory_is_not_actionable() {
        let built = SoActor::new()
            .build_request(&event(), &policy(), &ActorContext::new())
            .await
            .unwrap();
        assert!(built.is_none());
    }

    #[tokio::test]
    async fn unknown_resource_is_not_actionable() {
        let ctx = ActorContext::new().with_inventory(Arc::new(FixedInventory(None)));
        let built = SoActor::new()
            .build_request(&event(), &policy(), &ctx)
            .await
            .unwrap();
        assert!(built.is_none());
    }

    #[tokio::test]
    async fn inventory_failure_propagates() {
        let ctx = ActorContext::new().with_inventory(Arc::new(FailingInventory));
        let err = SoActor::new()
            .build_request(&event(), &policy(), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ActorError::Inventory(_)));
    }
}
