//! APPC actor: VNF configuration management.

use async_trait::async_trait;
use remedy_policy::PolicyNode;
use remedy_types::{BackendRequest, OnsetEvent};
use serde_json::json;
use tracing::warn;

use crate::actor::{Actor, ActorContext};
use crate::error::{ActorError, Result};

const MODIFY_CONFIG: &str = "ModifyConfig";
const VNF_ID_KEY: &str = "generic-vnf.vnf-id";

/// Builds APPC configuration-management requests.
///
/// Supports the `ModifyConfig` recipe against `VNF` targets. The
/// request body carries the vnf-id from the event's enrichment details
/// plus any generic payload entries the event provides.
#[derive(Debug, Default)]
pub struct AppcActor;

impl AppcActor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Actor for AppcActor {
    fn name(&self) -> &str {
        "APPC"
    }

    fn recipes(&self) -> Vec<String> {
        vec![MODIFY_CONFIG.to_string()]
    }

    fn recipe_targets(&self, recipe: &str) -> Vec<String> {
        match recipe {
            MODIFY_CONFIG => vec!["VNF".to_string()],
            _ => Vec::new(),
        }
    }

    fn recipe_payloads(&self, recipe: &str) -> Vec<String> {
        match recipe {
            MODIFY_CONFIG => vec![VNF_ID_KEY.to_string()],
            _ => Vec::new(),
        }
    }

    async fn build_request(
        &self,
        event: &OnsetEvent,
        policy: &PolicyNode,
        _ctx: &ActorContext,
    ) -> Result<Option<BackendRequest>> {
        if policy.recipe != MODIFY_CONFIG {
            warn!(recipe = %policy.recipe, "APPC does not support recipe");
            return Ok(None);
        }

        let vnf_id = event
            .detail(VNF_ID_KEY)
            .ok_or_else(|| ActorError::MissingField(VNF_ID_KEY.to_string()))?;

        let body = json!({
            "common-header": {
                "request-id": event.request_id,
                "originator-id": event.request_id,
            },
            "action": MODIFY_CONFIG,
            "payload": {
                VNF_ID_KEY: vnf_id,
            },
        });

        Ok(Some(BackendRequest::new(
            self.name(),
            MODIFY_CONFIG,
            &policy.target.target_type,
            event.request_id,
            body,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(recipe: &str) -> PolicyNode {
        let yaml = format!(
            r#"
control_loop:
  name: cl
  trigger: step
policies:
  - id: step
    actor: APPC
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

    #[tokio::test]
    async fn builds_modify_config_request() {
        let event = OnsetEvent::new("cl", "VNF", "generic-vnf.vnf-name", "vnf-1")
            .with_detail("generic-vnf.vnf-id", "abc-123");

        let request = AppcActor::new()
            .build_request(&event, &policy("ModifyConfig"), &ActorContext::new())
            .await
            .unwrap()
            .expect("request should be built");

        assert_eq!(request.actor, "APPC");
        assert_eq!(request.recipe, "ModifyConfig");
        assert_eq!(request.body["payload"]["generic-vnf.vnf-id"], "abc-123");
    }

    #[tokio::test]
    async fn unsupported_recipe_returns_none() {
        let event = OnsetEvent::new("cl", "VNF", "generic-vnf.vnf-name", "vnf-1")
            .with_detail("generic-vnf.vnf-id", "abc-123");

        let built = AppcActor::new()
            .build_request(&event, &policy("Restart"), &ActorContext::new())
            .await
            .unwrap();
        assert!(built.is_none());
    }

    #[tokio::test]
    async fn missing_vnf_id_is_an_error() {
        let event = OnsetEvent::new("cl", "VNF", "generic-vnf.vnf-name", "vnf-1");
        let err = AppcActor::new()
            .build_request(&event, &policy("ModifyConfig"), &ActorContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ActorError::MissingField(f) if f == "generic-vnf.vnf-id"));
    }

    #[test]
    fn capability_descriptors() {
        let actor = AppcActor::new();
        assert_eq!(actor.recipes(), vec!["ModifyConfig"]);
        assert_eq!(actor.recipe_targets("ModifyConfig"), vec!["VNF"]);
        assert_eq!(
            actor.recipe_payloads("ModifyConfig"),
            vec!["generic-vnf.vnf-id"]
        );
        assert!(actor.recipe_targets("Restart").is_empty());
    }
}
