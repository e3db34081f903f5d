//! VFC actor: virtual function controller lifecycle operations.

use async_trait::async_trait;
use remedy_policy::PolicyNode;
use remedy_types::{BackendRequest, OnsetEvent};
use serde_json::json;
use tracing::warn;

use crate::actor::{Actor, ActorContext};
use crate::error::{ActorError, Result};

const RESTART: &str = "Restart";
const VSERVER_ID_KEY: &str = "vserver.vserver-id";

/// Builds VFC lifecycle requests.
///
/// Supports the `Restart` recipe against `VM` targets. The vserver id
/// comes from the event's details; when an inventory collaborator is
/// configured it is consulted to confirm the id is still current,
/// preferring the canonical record over the event snapshot.
#[derive(Debug, Default)]
pub struct VfcActor;

impl VfcActor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Actor for VfcActor {
    fn name(&self) -> &str {
        "VFC"
    }

    fn recipes(&self) -> Vec<String> {
        vec![RESTART.to_string()]
    }

    fn recipe_targets(&self, recipe: &str) -> Vec<String> {
        match recipe {
            RESTART => vec!["VM".to_string()],
            _ => Vec::new(),
        }
    }

    fn recipe_payloads(&self, recipe: &str) -> Vec<String> {
        match recipe {
            RESTART => vec![VSERVER_ID_KEY.to_string()],
            _ => Vec::new(),
        }
    }

    async fn build_request(
        &self,
        event: &OnsetEvent,
        policy: &PolicyNode,
        ctx: &ActorContext,
    ) -> Result<Option<BackendRequest>> {
        if policy.recipe != RESTART {
            warn!(recipe = %policy.recipe, "VFC does not support recipe");
            return Ok(None);
        }

        let event_id = event
            .detail(VSERVER_ID_KEY)
            .ok_or_else(|| ActorError::MissingField(VSERVER_ID_KEY.to_string()))?;

        let vserver_id = match ctx.inventory() {
            Some(inventory) => match inventory.query_by_id(event_id).await? {
                Some(record) => record.id,
                None => {
                    warn!(vserver = event_id, "inventory no longer knows this vserver");
                    return Ok(None);
                }
            },
            None => event_id.to_string(),
        };

        let body = json!({
            "action": "restartvm",
            "affectedvm": {
                "vserver-id": vserver_id,
                "vserver-name": event.target_instance,
            },
        });

        Ok(Some(BackendRequest::new(
            self.name(),
            RESTART,
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
    use std::sync::Arc;

    struct RenamingInventory;

    #[async_trait]
    impl Inventory for RenamingInventory {
        async fn query_by_name(&self, _name: &str) -> Result<Option<InventoryRecord>> {
            Ok(None)
        }

        async fn query_by_id(&self, _id: &str) -> Result<Option<InventoryRecord>> {
            Ok(Some(InventoryRecord {
                id: "canonical-id".into(),
                name: None,
                service_instance_id: None,
            }))
        }
    }

    fn policy() -> PolicyNode {
        let yaml = r#"
control_loop:
  name: cl
  trigger: restart
policies:
  - id: restart
    actor: VFC
    recipe: Restart
    target: { type: VM }
"#;
        remedy_policy::PolicyChain::load(yaml)
            .unwrap()
            .node("restart")
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn builds_restart_from_event_details() {
        let event = OnsetEvent::new("cl", "VM", "vserver.vserver-name", "vm-1")
            .with_detail("vserver.vserver-id", "vs-42");

        let request = VfcActor::new()
            .build_request(&event, &policy(), &ActorContext::new())
            .await
            .unwrap()
            .expect("request should be built");

        assert_eq!(request.body["affectedvm"]["vserver-id"], "vs-42");
        assert_eq!(request.body["affectedvm"]["vserver-name"], "vm-1");
    }

    #[tokio::test]
    async fn prefers_canonical_inventory_id() {
        let event = OnsetEvent::new("cl", "VM", "vserver.vserver-name", "vm-1")
            .with_detail("vserver.vserver-id", "vs-42");
        let ctx = ActorContext::new().with_inventory(Arc::new(RenamingInventory));

        let request = VfcActor::new()
            .build_request(&event, &policy(), &ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.body["affectedvm"]["vserver-id"], "canonical-id");
    }

    #[tokio::test]
    async fn missing_vserver_id_is_an_error() {
        let event = OnsetEvent::new("cl", "VM", "vserver.vserver-name", "vm-1");
        let err = VfcActor::new()
            .build_request(&event, &policy(), &ActorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ActorError::MissingField(_)));
    }
}
