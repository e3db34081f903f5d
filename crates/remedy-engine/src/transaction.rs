//! Per-transaction processing task.
//!
//! One transaction is one control loop's response to one onset event.
//! All of its mutable state — chain cursor, transaction lock, pending
//! guard resolution — lives on a single tokio task and is mutated only
//! there; the host and the collaborators reach it through messages.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use remedy_actors::{ActorContext, ActorRegistry};
use remedy_policy::{ChainCursor, PolicyChain, PolicyNode, Terminal};
use remedy_types::{OnsetEvent, Outcome, TransactionId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::guard::{GuardClient, GuardDecision, GuardQuery};
use crate::lock::{LockEvent, LockManager, TransactionLock};
use crate::transport::Transport;

/// Messages delivered to a transaction's inbox.
#[derive(Debug)]
pub(crate) enum TransactionMsg {
    /// The host reports the result of the dispatched operation.
    Outcome(Outcome),

    /// The engine is shutting down; abort processing.
    Abort,
}

/// Record of one completed operation (all attempts collapsed).
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub policy_id: String,
    pub actor: String,
    pub recipe: String,
    /// Total attempts, including the first.
    pub attempts: u32,
    /// The outcome that advanced the chain.
    pub outcome: Outcome,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Final report for a finished transaction.
#[derive(Debug, Clone)]
pub struct TransactionReport {
    pub transaction_id: TransactionId,
    pub control_loop: String,
    /// The terminal the chain ended in — always exactly one of the
    /// six sentinels.
    pub terminal: Terminal,
    pub operations: Vec<OperationRecord>,
}

pub(crate) struct Transaction {
    pub(crate) id: TransactionId,
    pub(crate) event: OnsetEvent,
    pub(crate) chain: Arc<PolicyChain>,
    pub(crate) cursor: ChainCursor,
    pub(crate) lock: TransactionLock,
    pub(crate) inbox: mpsc::UnboundedReceiver<TransactionMsg>,
    pub(crate) registry: Arc<ActorRegistry>,
    pub(crate) actor_ctx: ActorContext,
    pub(crate) locks: Arc<dyn LockManager>,
    pub(crate) guard: Arc<dyn GuardClient>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) config: EngineConfig,
    pub(crate) records: Vec<OperationRecord>,
    pub(crate) aborted: bool,
}

impl Transaction {
    /// Walk the chain to a terminal, then release the lock.
    pub(crate) async fn run(mut self) -> TransactionReport {
        info!(
            transaction = %self.id,
            control_loop = self.chain.name(),
            target = %self.event.target_instance,
            "transaction started"
        );

        let terminal = loop {
            if let Some(terminal) = self.cursor.terminal() {
                break terminal;
            }
            if self.aborted {
                warn!(transaction = %self.id, "transaction aborted");
                break Terminal::FinalFailureException;
            }

            let node = match self.cursor.current_node(&self.chain) {
                Ok(node) => node.clone(),
                // Cursor poisoned; the loop observes the terminal next
                // iteration.
                Err(_) => continue,
            };

            let outcome = self.run_node(&node).await;
            if self.cursor.advance(&self.chain, outcome).is_err() {
                continue;
            }
        };

        // Release the lock exactly once, whatever the terminal was.
        self.lock.cleanup();

        info!(
            transaction = %self.id,
            control_loop = self.chain.name(),
            %terminal,
            operations = self.records.len(),
            "transaction finished"
        );

        TransactionReport {
            transaction_id: self.id,
            control_loop: self.chain.name().to_string(),
            terminal,
            operations: self.records,
        }
    }

    /// Run one policy node to its final outcome, retrying plain
    /// failures up to the node's retry budget.
    async fn run_node(&mut self, node: &PolicyNode) -> Outcome {
        let started_at = Utc::now();
        let mut attempts: u32 = 0;

        let outcome = loop {
            attempts += 1;
            let outcome = self.attempt_operation(node).await;
            match outcome {
                Outcome::Failure if self.aborted => break outcome,
                Outcome::Failure if attempts <= node.retry => {
                    debug!(
                        transaction = %self.id,
                        policy = %node.id,
                        attempts,
                        retry_budget = node.retry,
                        "operation failed; retrying"
                    );
                    continue;
                }
                Outcome::Failure if node.retry > 0 => break Outcome::FailureRetries,
                other => break other,
            }
        };

        self.records.push(OperationRecord {
            policy_id: node.id.clone(),
            actor: node.actor.clone(),
            recipe: node.recipe.clone(),
            attempts,
            outcome,
            started_at,
            ended_at: Utc::now(),
        });
        outcome
    }

    /// One attempt: build, lock, guard, dispatch, await the result.
    async fn attempt_operation(&mut self, node: &PolicyNode) -> Outcome {
        // Build the backend request first; an unsupported recipe or a
        // failed builder means nothing is dispatched.
        let request = match self
            .registry
            .build_request(&node.actor, &self.event, node, &self.actor_ctx)
            .await
        {
            Ok(Some(request)) => request,
            Ok(None) => {
                warn!(
                    transaction = %self.id,
                    actor = %node.actor,
                    recipe = %node.recipe,
                    "request not buildable; operation is non-actionable"
                );
                return Outcome::FailureException;
            }
            Err(e) => {
                warn!(transaction = %self.id, error = %e, "request builder failed");
                return Outcome::FailureException;
            }
        };

        if !self.acquire_lock().await {
            return Outcome::FailureGuard;
        }
        if self.aborted {
            return Outcome::FailureException;
        }

        if !self.guard_permits(node).await {
            return Outcome::FailureGuard;
        }
        if self.aborted {
            return Outcome::FailureException;
        }

        if let Err(e) = self.transport.deliver(request) {
            warn!(transaction = %self.id, error = %e, "transport refused request");
            return Outcome::FailureException;
        }
        debug!(
            transaction = %self.id,
            policy = %node.id,
            timeout = node.timeout,
            "request dispatched; awaiting outcome"
        );

        tokio::select! {
            biased;
            msg = self.inbox.recv() => match msg {
                Some(TransactionMsg::Outcome(outcome)) => outcome,
                Some(TransactionMsg::Abort) | None => {
                    self.aborted = true;
                    Outcome::FailureException
                }
            },
            _ = tokio::time::sleep(Duration::from_secs(node.timeout)) => {
                // The lock is deliberately retained: it belongs to the
                // transaction, not the operation.
                warn!(
                    transaction = %self.id,
                    policy = %node.id,
                    timeout = node.timeout,
                    "operation timed out"
                );
                Outcome::FailureTimeout
            }
        }
    }

    /// Acquire (or reuse) the transaction lock, waiting for an
    /// asynchronous grant when configured to.
    async fn acquire_lock(&mut self) -> bool {
        // The owner key must be unique per transaction: two
        // transactions of one control loop contending for the same
        // resource are exactly what the lock serializes.
        let owner_key = format!(
            "{}:{}:{}",
            self.config.owner_key, self.event.control_loop_name, self.id
        );
        let lease = Duration::from_secs(self.config.lock_lease_secs);
        let immediate = self.lock.acquire(
            self.locks.as_ref(),
            &self.event.target_instance,
            &owner_key,
            lease,
            self.config.wait_for_locks,
        );
        if immediate {
            return true;
        }
        if !self.config.wait_for_locks {
            warn!(
                transaction = %self.id,
                resource = %self.event.target_instance,
                "lock unavailable and waiting is disabled"
            );
            return false;
        }

        loop {
            tokio::select! {
                biased;
                event = self.lock.next_event() => match event {
                    Some(LockEvent::Available(handle)) => {
                        self.lock.on_available(handle);
                        return true;
                    }
                    Some(LockEvent::Unavailable(handle)) => {
                        self.lock.on_unavailable(handle);
                        return false;
                    }
                    None => {
                        warn!(transaction = %self.id, "lock manager dropped the grant channel");
                        return false;
                    }
                },
                msg = self.inbox.recv() => match msg {
                    Some(TransactionMsg::Abort) | None => {
                        self.aborted = true;
                        return false;
                    }
                    Some(TransactionMsg::Outcome(outcome)) => {
                        warn!(
                            transaction = %self.id,
                            %outcome,
                            "ignoring outcome while awaiting lock"
                        );
                    }
                },
            }
        }
    }

    /// Submit the guard query and wait for its resolution.
    async fn guard_permits(&mut self, node: &PolicyNode) -> bool {
        let query = GuardQuery {
            actor: node.actor.clone(),
            recipe: node.recipe.clone(),
            target: self.event.target_instance.clone(),
            request_id: self.event.request_id,
            control_loop_name: self.event.control_loop_name.clone(),
            requested_at: Utc::now(),
        };
        debug!(
            transaction = %self.id,
            actor = %query.actor,
            recipe = %query.recipe,
            "submitting guard query"
        );
        let mut decision = self.guard.query(query);

        loop {
            tokio::select! {
                biased;
                resolved = &mut decision => return match resolved {
                    Ok(GuardDecision::Permit) => true,
                    Ok(GuardDecision::Deny) => {
                        warn!(transaction = %self.id, policy = %node.id, "guard denied operation");
                        false
                    }
                    Err(_) => {
                        warn!(transaction = %self.id, policy = %node.id, "guard channel error");
                        false
                    }
                },
                msg = self.inbox.recv() => match msg {
                    Some(TransactionMsg::Abort) | None => {
                        self.aborted = true;
                        return false;
                    }
                    Some(TransactionMsg::Outcome(outcome)) => {
                        warn!(
                            transaction = %self.id,
                            %outcome,
                            "ignoring outcome while awaiting guard"
                        );
                    }
                },
            }
        }
    }
}
