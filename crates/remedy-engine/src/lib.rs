//! Transaction orchestration engine.
//!
//! The engine walks a control loop's policy chain for each inbound
//! fault event. Every transaction runs on its own tokio task with an
//! inbox; the chain cursor, transaction lock, and guard bindings are
//! owned by that task and never shared. Before an operation's request
//! is handed to the transport, the transaction-scoped lock must be
//! held and the guard must permit; the host feeds operation results
//! back through [`Engine::outcome`] to advance the chain.
//!
//! The engine's collaborators — lock manager, guard service,
//! transport, inventory — are trait seams injected at construction.
//! The engine has an explicit lifecycle ([`EngineBuilder::build`] /
//! [`Engine::shutdown`]) owned by the host; there are no ambient
//! statics.

mod config;
mod engine;
mod error;
mod guard;
mod lock;
mod transaction;
mod transport;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, TransactionHandle};
pub use error::{EngineError, Result};
pub use guard::{DisabledGuard, GuardClient, GuardDecision, GuardQuery};
pub use lock::{LocalLockManager, LockEvent, LockHandle, LockManager, TransactionLock};
pub use transaction::{OperationRecord, TransactionReport};
pub use transport::{RecordingTransport, Transport};
