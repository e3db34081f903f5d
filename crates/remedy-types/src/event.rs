//! The inbound fault event.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RequestId;

/// A detected fault, as delivered by the event source.
///
/// The event names the control loop that should respond, the field
/// identifying the faulted resource, and a flat map of enrichment
/// details (inventory attributes keyed like `generic-vnf.vnf-id`) that
/// request builders draw payload values from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnsetEvent {
    /// Request ID assigned by the event source; echoed on every
    /// backend request built for this event.
    pub request_id: RequestId,

    /// Name of the control loop this event triggers.
    pub control_loop_name: String,

    /// Target type of the faulted resource (e.g., `VNF`, `VM`).
    pub target_type: String,

    /// Field identifying the resource (e.g., `generic-vnf.vnf-name`).
    pub target: String,

    /// Concrete resource value the target field resolves to. Used as
    /// the lock resource key.
    pub target_instance: String,

    /// Enrichment details keyed by qualified field name.
    #[serde(default)]
    pub details: HashMap<String, String>,

    /// When the fault was first observed.
    pub onset_at: DateTime<Utc>,
}

impl OnsetEvent {
    /// Create a minimal event for the given control loop and target.
    pub fn new(
        control_loop_name: impl Into<String>,
        target_type: impl Into<String>,
        target: impl Into<String>,
        target_instance: impl Into<String>,
    ) -> Self {
        Self {
            request_id: RequestId::new(),
            control_loop_name: control_loop_name.into(),
            target_type: target_type.into(),
            target: target.into(),
            target_instance: target_instance.into(),
            details: HashMap::new(),
            onset_at: Utc::now(),
        }
    }

    /// Add an enrichment detail.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Look up an enrichment detail by qualified field name.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_details() {
        let event = OnsetEvent::new("vnf-restart", "VNF", "generic-vnf.vnf-name", "vnf-01")
            .with_detail("generic-vnf.vnf-id", "abc-123");

        assert_eq!(event.detail("generic-vnf.vnf-id"), Some("abc-123"));
        assert_eq!(event.detail("generic-vnf.vnf-type"), None);
    }

    #[test]
    fn event_json_roundtrip() {
        let event = OnsetEvent::new("cl", "VM", "vserver.vserver-name", "vm-7");
        let json = serde_json::to_string(&event).unwrap();
        let parsed: OnsetEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.control_loop_name, "cl");
        assert_eq!(parsed.request_id, event.request_id);
        assert_eq!(parsed.target_instance, "vm-7");
    }
}
