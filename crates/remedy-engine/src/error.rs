//! Error types for the engine.

use remedy_types::TransactionId;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to the host.
///
/// Per-operation failures (lock, guard, unbuildable request) are not
/// errors — they flow through the chain's outcome transitions. These
/// variants cover the host-facing surface only.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No chain is installed for the event's control loop.
    #[error("no chain installed for control loop '{0}'")]
    UnknownControlLoop(String),

    /// The transaction id is not live.
    #[error("unknown transaction {0}")]
    UnknownTransaction(TransactionId),

    /// The transaction ended before the message could be delivered.
    #[error("transaction {0} already closed")]
    TransactionClosed(TransactionId),

    /// The transport refused a request.
    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Chain(#[from] remedy_policy::ChainError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
