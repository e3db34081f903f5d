//! Backend request value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RequestId;

/// A request built by an actor for its backend.
///
/// The envelope fields are common to every backend; `body` carries the
/// backend-specific shape as opaque JSON so the engine stays decoupled
/// from each backend's wire format. Builders construct a fresh value
/// per attempt and never alias the event or policy they were built
/// from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRequest {
    /// Actor that built this request.
    pub actor: String,

    /// Recipe being executed.
    pub recipe: String,

    /// Target type the recipe runs against.
    pub target: String,

    /// Request ID inherited from the triggering event.
    pub request_id: RequestId,

    /// Sub-request ID, unique per operation attempt.
    pub sub_request_id: Uuid,

    /// Backend-specific request body.
    pub body: serde_json::Value,
}

impl BackendRequest {
    /// Create a request envelope with a fresh sub-request ID.
    pub fn new(
        actor: impl Into<String>,
        recipe: impl Into<String>,
        target: impl Into<String>,
        request_id: RequestId,
        body: serde_json::Value,
    ) -> Self {
        Self {
            actor: actor.into(),
            recipe: recipe.into(),
            target: target.into(),
            request_id,
            sub_request_id: Uuid::new_v4(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sub_request_ids_are_fresh() {
        let rid = RequestId::new();
        let a = BackendRequest::new("APPC", "ModifyConfig", "VNF", rid, json!({}));
        let b = BackendRequest::new("APPC", "ModifyConfig", "VNF", rid, json!({}));
        assert_ne!(a.sub_request_id, b.sub_request_id);
        assert_eq!(a.request_id, b.request_id);
    }
}
