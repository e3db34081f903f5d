//! Engine: host interface and transaction lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use remedy_actors::{ActorContext, ActorRegistry};
use remedy_policy::{ChainCursor, PolicyChain};
use remedy_types::{OnsetEvent, Outcome, TransactionId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::guard::{DisabledGuard, GuardClient};
use crate::lock::{LocalLockManager, LockManager, TransactionLock};
use crate::transaction::{Transaction, TransactionMsg, TransactionReport};
use crate::transport::Transport;

/// Builds an [`Engine`] from its collaborators.
///
/// The actor registry and transport are mandatory; the lock manager
/// defaults to [`LocalLockManager`] and the guard to [`DisabledGuard`]
/// (permit-by-default degraded mode).
pub struct EngineBuilder {
    registry: Arc<ActorRegistry>,
    transport: Arc<dyn Transport>,
    locks: Arc<dyn LockManager>,
    guard: Arc<dyn GuardClient>,
    actor_ctx: ActorContext,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(registry: Arc<ActorRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
            locks: Arc::new(LocalLockManager::new()),
            guard: Arc::new(DisabledGuard::new()),
            actor_ctx: ActorContext::new(),
            config: EngineConfig::default(),
        }
    }

    /// Use an external lock manager.
    pub fn lock_manager(mut self, locks: Arc<dyn LockManager>) -> Self {
        self.locks = locks;
        self
    }

    /// Use a guard/permission service.
    pub fn guard(mut self, guard: Arc<dyn GuardClient>) -> Self {
        self.guard = guard;
        self
    }

    /// Context handed to request builders (inventory collaborator).
    pub fn actor_context(mut self, actor_ctx: ActorContext) -> Self {
        self.actor_ctx = actor_ctx;
        self
    }

    /// Engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            inner: Arc::new(EngineInner {
                registry: self.registry,
                transport: self.transport,
                locks: self.locks,
                guard: self.guard,
                actor_ctx: self.actor_ctx,
                config: self.config,
                chains: RwLock::new(HashMap::new()),
                transactions: Mutex::new(HashMap::new()),
            }),
        }
    }
}

struct LiveTransaction {
    sender: mpsc::UnboundedSender<TransactionMsg>,
    task: Option<JoinHandle<()>>,
}

struct EngineInner {
    registry: Arc<ActorRegistry>,
    transport: Arc<dyn Transport>,
    locks: Arc<dyn LockManager>,
    guard: Arc<dyn GuardClient>,
    actor_ctx: ActorContext,
    config: EngineConfig,
    chains: RwLock<HashMap<String, Arc<PolicyChain>>>,
    transactions: Mutex<HashMap<TransactionId, LiveTransaction>>,
}

/// Handle returned to the host for one started transaction.
pub struct TransactionHandle {
    id: TransactionId,
    done: oneshot::Receiver<TransactionReport>,
}

impl TransactionHandle {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Wait for the transaction's final report.
    pub async fn wait(self) -> Result<TransactionReport> {
        self.done
            .await
            .map_err(|_| EngineError::TransactionClosed(self.id))
    }
}

/// The orchestration engine.
///
/// Cheap to clone; all clones share the same inner state. Lifecycle is
/// explicit: the host builds it, installs chains, feeds events and
/// outcomes, and finally calls [`shutdown`](Engine::shutdown).
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    pub fn builder(registry: Arc<ActorRegistry>, transport: Arc<dyn Transport>) -> EngineBuilder {
        EngineBuilder::new(registry, transport)
    }

    /// Install a policy chain, keyed by its control loop name.
    /// Replaces any previous chain for that control loop.
    pub fn install_chain(&self, chain: PolicyChain) {
        info!(control_loop = chain.name(), policies = chain.len(), "installing chain");
        self.inner
            .chains
            .write()
            .insert(chain.name().to_string(), Arc::new(chain));
    }

    /// The installed chain for a control loop, if any.
    pub fn chain(&self, control_loop: &str) -> Option<Arc<PolicyChain>> {
        self.inner.chains.read().get(control_loop).cloned()
    }

    /// Number of transactions currently processing.
    pub fn live_transactions(&self) -> usize {
        self.inner.transactions.lock().len()
    }

    /// Start chain processing for an inbound event.
    ///
    /// Spawns the transaction's task and returns a handle the host can
    /// wait on for the final report.
    pub fn process_event(&self, event: OnsetEvent) -> Result<TransactionHandle> {
        let chain = self
            .chain(&event.control_loop_name)
            .ok_or_else(|| EngineError::UnknownControlLoop(event.control_loop_name.clone()))?;

        let id = TransactionId::new();
        let (sender, inbox) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();

        let transaction = Transaction {
            id,
            cursor: ChainCursor::start(&chain),
            event,
            chain,
            lock: TransactionLock::new(),
            inbox,
            registry: Arc::clone(&self.inner.registry),
            actor_ctx: self.inner.actor_ctx.clone(),
            locks: Arc::clone(&self.inner.locks),
            guard: Arc::clone(&self.inner.guard),
            transport: Arc::clone(&self.inner.transport),
            config: self.inner.config.clone(),
            records: Vec::new(),
            aborted: false,
        };

        // Register the inbox before the task runs so `outcome` calls
        // racing the spawn still find it.
        self.inner
            .transactions
            .lock()
            .insert(id, LiveTransaction { sender, task: None });

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let report = transaction.run().await;
            inner.transactions.lock().remove(&id);
            // The host may have dropped its handle; that is fine.
            let _ = done_tx.send(report);
        });

        if let Some(live) = self.inner.transactions.lock().get_mut(&id) {
            live.task = Some(task);
        }

        debug!(transaction = %id, "transaction registered");
        Ok(TransactionHandle { id, done: done_rx })
    }

    /// Feed an operation result back to a live transaction.
    pub fn outcome(&self, id: TransactionId, outcome: Outcome) -> Result<()> {
        let transactions = self.inner.transactions.lock();
        let live = transactions
            .get(&id)
            .ok_or(EngineError::UnknownTransaction(id))?;
        live.sender
            .send(TransactionMsg::Outcome(outcome))
            .map_err(|_| EngineError::TransactionClosed(id))
    }

    /// Abort all live transactions and wait for their tasks.
    ///
    /// Each aborted transaction still runs its lock cleanup and
    /// reports a terminal.
    pub async fn shutdown(&self) {
        let live: Vec<(TransactionId, LiveTransaction)> =
            self.inner.transactions.lock().drain().collect();
        if live.is_empty() {
            return;
        }
        info!(transactions = live.len(), "engine shutting down");

        for (id, transaction) in &live {
            if transaction.sender.send(TransactionMsg::Abort).is_err() {
                warn!(transaction = %id, "transaction already gone at shutdown");
            }
        }
        for (_, transaction) in live {
            if let Some(task) = transaction.task {
                let _ = task.await;
            }
        }
    }
}
