//! Transport seam for built requests.

use parking_lot::Mutex;
use remedy_types::BackendRequest;
use tracing::info;

use crate::error::Result;

/// Delivers a built request to its backend's bus or topic.
///
/// This core owns nothing past the hand-off: correlation of the
/// backend's eventual response is the host's job, fed back through
/// [`Engine::outcome`](crate::Engine::outcome).
pub trait Transport: Send + Sync {
    fn deliver(&self, request: BackendRequest) -> Result<()>;
}

/// Transport that captures every delivered request.
///
/// Used by tests and the `simulate` command to observe what the
/// engine would have sent.
#[derive(Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<BackendRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn delivered(&self) -> Vec<BackendRequest> {
        self.delivered.lock().clone()
    }

    /// Number of delivered requests.
    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    /// Whether nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }
}

impl Transport for RecordingTransport {
    fn deliver(&self, request: BackendRequest) -> Result<()> {
        info!(
            actor = %request.actor,
            recipe = %request.recipe,
            request_id = %request.request_id,
            "recording delivered request"
        );
        self.delivered.lock().push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_types::RequestId;
    use serde_json::json;

    #[test]
    fn records_in_delivery_order() {
        let transport = RecordingTransport::new();
        assert!(transport.is_empty());

        let rid = RequestId::new();
        transport
            .deliver(BackendRequest::new("APPC", "ModifyConfig", "VNF", rid, json!({})))
            .unwrap();
        transport
            .deliver(BackendRequest::new("SO", "VF Module Create", "VFC", rid, json!({})))
            .unwrap();

        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].actor, "APPC");
        assert_eq!(delivered[1].actor, "SO");
    }
}
