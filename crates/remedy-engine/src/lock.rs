//! Transaction-scoped locking.
//!
//! A transaction holds at most one exclusive lock on its target
//! resource, reused across every operation in that transaction and
//! released exactly once at cleanup. The lock manager is an external
//! collaborator behind the [`LockManager`] seam; availability is
//! delivered asynchronously over a channel registered *before* the
//! acquire call, so a grant fired synchronously during acquisition
//! still lands.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// A lock handle issued by a lock manager.
///
/// Handles start active (granted immediately) or inactive (pending or
/// refused). `free` is idempotent: it returns true only on the call
/// that actually released a held lock.
pub trait LockHandle: Send + Sync {
    /// The resource this handle is for.
    fn resource_key(&self) -> &str;

    /// Whether the lock is currently held.
    fn is_active(&self) -> bool;

    /// Release the lock. Returns true only if this call released an
    /// active lock.
    fn free(&self) -> bool;
}

/// Asynchronous lock notifications, consumed only by the owning
/// transaction's task.
pub enum LockEvent {
    /// The pending lock is now held; the carried handle replaces the
    /// stored one.
    Available(Arc<dyn LockHandle>),

    /// The lock cannot be granted; the carried handle (inactive)
    /// replaces the stored one.
    Unavailable(Arc<dyn LockHandle>),
}

impl std::fmt::Debug for LockEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockEvent::Available(h) => write!(f, "Available({})", h.resource_key()),
            LockEvent::Unavailable(h) => write!(f, "Unavailable({})", h.resource_key()),
        }
    }
}

/// External lock manager seam.
pub trait LockManager: Send + Sync {
    /// Request a lock on `resource_key` for `owner_key` with the given
    /// lease. `owner_key` identifies one transaction: a request under
    /// the holder's own key refreshes the held lock instead of
    /// contending, so distinct transactions must use distinct keys.
    /// `events` must be registered before the acquisition is
    /// attempted. When `wait` is false and the resource is held by
    /// another owner, the returned handle is inactive and no event is
    /// ever emitted for it.
    fn create_lock(
        &self,
        resource_key: &str,
        owner_key: &str,
        lease: Duration,
        events: mpsc::UnboundedSender<LockEvent>,
        wait: bool,
    ) -> Arc<dyn LockHandle>;
}

// ─────────────────────────────────────────────────────────────────────────────
// TransactionLock
// ─────────────────────────────────────────────────────────────────────────────

/// Per-transaction lock adjunct.
///
/// Created lazily on the first operation needing a lock; every later
/// operation in the same transaction reuses the held handle without a
/// second manager round-trip. Holds only the transaction-side state —
/// never a reference back to the transaction itself.
#[derive(Default)]
pub struct TransactionLock {
    resource_key: Option<String>,
    handle: Option<Arc<dyn LockHandle>>,
    events: Option<mpsc::UnboundedReceiver<LockEvent>>,
}

impl TransactionLock {
    /// An adjunct holding no lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// The resource key of the most recent acquisition.
    pub fn resource_key(&self) -> Option<&str> {
        self.resource_key.as_deref()
    }

    /// Whether an active handle is currently held.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_active())
    }

    /// Acquire the lock, or confirm it is already held.
    ///
    /// Returns true immediately when an active handle exists (lock
    /// reuse across operations). Otherwise any stale handle is freed,
    /// a fresh lock is requested, and the new handle's immediate
    /// active state is returned; when it is false and `wait` was true,
    /// the real answer arrives later via [`next_event`](Self::next_event).
    pub fn acquire(
        &mut self,
        manager: &dyn LockManager,
        resource_key: &str,
        owner_key: &str,
        lease: Duration,
        wait: bool,
    ) -> bool {
        if let Some(handle) = &self.handle {
            if handle.is_active() {
                trace!(resource = resource_key, "reusing held lock");
                return true;
            }
        }
        if let Some(stale) = self.handle.take() {
            debug!(resource = resource_key, "releasing stale lock handle");
            stale.free();
        }

        // Register the event channel before asking the manager, so a
        // callback firing synchronously during acquisition still finds
        // a registered requestor.
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(rx);

        let handle = manager.create_lock(resource_key, owner_key, lease, tx, wait);
        let active = handle.is_active();
        self.resource_key = Some(resource_key.to_string());
        self.handle = Some(handle);
        debug!(resource = resource_key, owner = owner_key, active, "requested lock");
        active
    }

    /// Next asynchronous lock notification for the pending
    /// acquisition. Resolves to `None` when the manager dropped the
    /// channel without answering.
    pub async fn next_event(&mut self) -> Option<LockEvent> {
        match &mut self.events {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// The lock became available: store the granted handle.
    pub fn on_available(&mut self, handle: Arc<dyn LockHandle>) {
        debug!(resource = handle.resource_key(), "lock available");
        self.handle = Some(handle);
    }

    /// The lock was refused: store the inactive handle.
    pub fn on_unavailable(&mut self, handle: Arc<dyn LockHandle>) {
        warn!(resource = handle.resource_key(), "lock unavailable");
        self.handle = Some(handle);
    }

    /// Release any held handle. Called unconditionally when the
    /// owning transaction ends; idempotent, returns true only if an
    /// active lock was actually released.
    pub fn cleanup(&mut self) -> bool {
        self.events = None;
        match self.handle.take() {
            Some(handle) => {
                let freed = handle.free();
                debug!(
                    resource = handle.resource_key(),
                    freed, "transaction lock cleanup"
                );
                freed
            }
            None => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LocalLockManager
// ─────────────────────────────────────────────────────────────────────────────

struct Holder {
    owner: String,
    expires_at: Instant,
    active: Arc<AtomicBool>,
}

struct Waiter {
    handle: Arc<LocalLockHandle>,
    events: mpsc::UnboundedSender<LockEvent>,
}

#[derive(Default)]
struct ResourceState {
    holder: Option<Holder>,
    waiters: VecDeque<Waiter>,
}

#[derive(Default)]
struct ManagerState {
    resources: HashMap<String, ResourceState>,
}

/// In-process lock manager.
///
/// Exclusive per-resource locks with lazy lease expiry and FIFO
/// hand-off to waiters. Suitable as the default collaborator for
/// single-process deployments and tests; a distributed manager plugs
/// in behind the same [`LockManager`] trait.
#[derive(Default)]
pub struct LocalLockManager {
    state: Arc<Mutex<ManagerState>>,
}

struct LocalLockHandle {
    resource: String,
    owner: String,
    lease: Duration,
    active: Arc<AtomicBool>,
    freed: AtomicBool,
    manager: Weak<Mutex<ManagerState>>,
}

impl LocalLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_handle(&self, resource: &str, owner: &str, lease: Duration, active: bool) -> Arc<LocalLockHandle> {
        Arc::new(LocalLockHandle {
            resource: resource.to_string(),
            owner: owner.to_string(),
            lease,
            active: Arc::new(AtomicBool::new(active)),
            freed: AtomicBool::new(false),
            manager: Arc::downgrade(&self.state),
        })
    }
}

impl LockManager for LocalLockManager {
    fn create_lock(
        &self,
        resource_key: &str,
        owner_key: &str,
        lease: Duration,
        events: mpsc::UnboundedSender<LockEvent>,
        wait: bool,
    ) -> Arc<dyn LockHandle> {
        let mut state = self.state.lock();
        let res = state.resources.entry(resource_key.to_string()).or_default();

        // Lazy lease expiry.
        if let Some(holder) = &res.holder {
            if Instant::now() >= holder.expires_at {
                debug!(resource = resource_key, owner = %holder.owner, "lease expired");
                holder.active.store(false, Ordering::SeqCst);
                res.holder = None;
            }
        }

        match &res.holder {
            None => {
                let handle = self.make_handle(resource_key, owner_key, lease, true);
                res.holder = Some(Holder {
                    owner: owner_key.to_string(),
                    expires_at: Instant::now() + lease,
                    active: Arc::clone(&handle.active),
                });
                debug!(resource = resource_key, owner = owner_key, "lock granted");
                handle
            }
            Some(holder) if holder.owner == owner_key => {
                // Same owner re-acquiring: retire the old handle and
                // grant a fresh one with a fresh lease.
                holder.active.store(false, Ordering::SeqCst);
                let handle = self.make_handle(resource_key, owner_key, lease, true);
                res.holder = Some(Holder {
                    owner: owner_key.to_string(),
                    expires_at: Instant::now() + lease,
                    active: Arc::clone(&handle.active),
                });
                debug!(resource = resource_key, owner = owner_key, "lock re-granted");
                handle
            }
            Some(holder) if wait => {
                debug!(
                    resource = resource_key,
                    owner = owner_key,
                    held_by = %holder.owner,
                    "lock held; queued waiter"
                );
                let handle = self.make_handle(resource_key, owner_key, lease, false);
                res.waiters.push_back(Waiter {
                    handle: Arc::clone(&handle),
                    events,
                });
                handle
            }
            Some(holder) => {
                debug!(
                    resource = resource_key,
                    owner = owner_key,
                    held_by = %holder.owner,
                    "lock held; failing fast"
                );
                self.make_handle(resource_key, owner_key, lease, false)
            }
        }
    }
}

/// Hand the resource to the next live waiter, if any.
fn grant_next(res: &mut ResourceState) {
    while let Some(waiter) = res.waiters.pop_front() {
        if waiter.handle.freed.load(Ordering::SeqCst) {
            continue;
        }
        waiter.handle.active.store(true, Ordering::SeqCst);
        res.holder = Some(Holder {
            owner: waiter.handle.owner.clone(),
            expires_at: Instant::now() + waiter.handle.lease,
            active: Arc::clone(&waiter.handle.active),
        });
        let handle: Arc<dyn LockHandle> = Arc::clone(&waiter.handle) as Arc<dyn LockHandle>;
        if waiter.events.send(LockEvent::Available(handle)).is_ok() {
            debug!(
                resource = %waiter.handle.resource,
                owner = %waiter.handle.owner,
                "lock handed off to waiter"
            );
            return;
        }
        // The waiting transaction is gone; release and keep going.
        waiter.handle.active.store(false, Ordering::SeqCst);
        res.holder = None;
    }
}

impl LockHandle for LocalLockHandle {
    fn resource_key(&self) -> &str {
        &self.resource
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn free(&self) -> bool {
        if self.freed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let was_active = self.active.swap(false, Ordering::SeqCst);

        if let Some(state) = self.manager.upgrade() {
            let mut state = state.lock();
            if let Some(res) = state.resources.get_mut(&self.resource) {
                if was_active {
                    let held_by_us = res
                        .holder
                        .as_ref()
                        .is_some_and(|h| Arc::ptr_eq(&h.active, &self.active));
                    if held_by_us {
                        res.holder = None;
                        grant_next(res);
                    }
                } else {
                    // Pending handle abandoned before grant.
                    res.waiters
                        .retain(|w| !Arc::ptr_eq(&w.handle.active, &self.active));
                }
            }
        }
        was_active
    }
}
