//! Guard gate: asynchronous operation authorization.

use chrono::{DateTime, Utc};
use remedy_types::RequestId;
use tokio::sync::oneshot;
use tracing::debug;

/// One permission query, created per operation attempt and discarded
/// once its resolution is consumed.
#[derive(Debug, Clone)]
pub struct GuardQuery {
    pub actor: String,
    pub recipe: String,
    pub target: String,
    pub request_id: RequestId,
    pub control_loop_name: String,
    pub requested_at: DateTime<Utc>,
}

/// Resolution of a guard query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Permit,
    Deny,
}

/// External guard/permission service seam.
///
/// `query` returns immediately after submission; the decision arrives
/// later on the returned receiver, on whatever thread the service
/// answers from. A dropped sender (guard-channel error) is treated the
/// same as a denial by callers. Implementations may resolve before
/// returning — the disabled gate does exactly that.
pub trait GuardClient: Send + Sync {
    fn query(&self, query: GuardQuery) -> oneshot::Receiver<GuardDecision>;
}

/// Degraded-mode gate used when no guard service is deployed: every
/// query resolves Permit synchronously, before `query` returns.
#[derive(Debug, Default)]
pub struct DisabledGuard;

impl DisabledGuard {
    pub fn new() -> Self {
        Self
    }
}

impl GuardClient for DisabledGuard {
    fn query(&self, query: GuardQuery) -> oneshot::Receiver<GuardDecision> {
        debug!(
            actor = %query.actor,
            recipe = %query.recipe,
            "guard disabled; permitting by default"
        );
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(GuardDecision::Permit);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> GuardQuery {
        GuardQuery {
            actor: "APPC".into(),
            recipe: "ModifyConfig".into(),
            target: "vnf-1".into(),
            request_id: RequestId::new(),
            control_loop_name: "cl".into(),
            requested_at: Utc::now(),
        }
    }

    #[test]
    fn disabled_guard_resolves_before_await() {
        let mut rx = DisabledGuard::new().query(query());
        // Synchronous default: the decision is already there.
        assert_eq!(rx.try_recv(), Ok(GuardDecision::Permit));
    }

    #[tokio::test]
    async fn dropped_sender_surfaces_as_error() {
        struct BrokenGuard;
        impl GuardClient for BrokenGuard {
            fn query(&self, _query: GuardQuery) -> oneshot::Receiver<GuardDecision> {
                let (_tx, rx) = oneshot::channel();
                rx // sender dropped here
            }
        }
        let rx = BrokenGuard.query(query());
        assert!(rx.await.is_err());
    }
}
