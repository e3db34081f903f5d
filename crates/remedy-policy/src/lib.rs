//! Policy chain state machine.
//!
//! A control loop's remediation steps form a directed graph of policy
//! nodes whose edges are data: each node names the next node (or a
//! terminal sentinel) for every possible operation outcome. This crate
//! parses and validates chain documents, and drives a per-transaction
//! cursor along the graph, one `advance` per completed operation.
//!
//! The chain is parsed once at control-loop setup, immutable
//! thereafter, and shared read-only across every transaction of that
//! control loop. Cursors are per-transaction and never shared.

mod chain;
mod cursor;
mod error;

pub use chain::{PolicyChain, PolicyNode, PolicyTarget};
pub use cursor::{ChainCursor, Terminal};
pub use error::{ChainError, Result};
