//! Per-transaction chain cursor and terminal sentinels.

use remedy_types::Outcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chain::{PolicyChain, PolicyNode};
use crate::error::{ChainError, Result};

/// Reserved terminal sentinels a chain can end in.
///
/// Any transition field naming one of these ids ends the transaction
/// with that result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    FinalSuccess,
    FinalFailure,
    FinalFailureRetries,
    FinalFailureTimeout,
    FinalFailureException,
    FinalFailureGuard,
}

impl Terminal {
    /// Parse a reserved terminal id; `None` for ordinary policy ids.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "final_success" => Some(Terminal::FinalSuccess),
            "final_failure" => Some(Terminal::FinalFailure),
            "final_failure_retries" => Some(Terminal::FinalFailureRetries),
            "final_failure_timeout" => Some(Terminal::FinalFailureTimeout),
            "final_failure_exception" => Some(Terminal::FinalFailureException),
            "final_failure_guard" => Some(Terminal::FinalFailureGuard),
            _ => None,
        }
    }

    /// The reserved id for this terminal.
    pub fn as_id(&self) -> &'static str {
        match self {
            Terminal::FinalSuccess => "final_success",
            Terminal::FinalFailure => "final_failure",
            Terminal::FinalFailureRetries => "final_failure_retries",
            Terminal::FinalFailureTimeout => "final_failure_timeout",
            Terminal::FinalFailureException => "final_failure_exception",
            Terminal::FinalFailureGuard => "final_failure_guard",
        }
    }

    /// Whether the transaction ended successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Terminal::FinalSuccess)
    }
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_id())
    }
}

/// Mutable per-transaction pointer into a chain.
///
/// Created at the chain's trigger when a transaction starts, mutated
/// only by [`advance`](ChainCursor::advance), and discarded when the
/// transaction completes. Never shared across transactions.
#[derive(Debug, Clone)]
pub struct ChainCursor {
    current: String,
}

impl ChainCursor {
    /// Start a cursor at the chain's trigger node.
    pub fn start(chain: &PolicyChain) -> Self {
        Self {
            current: chain.trigger().to_string(),
        }
    }

    /// The current position: a policy id or a terminal sentinel id.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// The terminal this cursor has reached, if any.
    pub fn terminal(&self) -> Option<Terminal> {
        Terminal::from_id(&self.current)
    }

    /// The node the cursor points at.
    ///
    /// Fails with [`ChainError::NoCurrentPolicy`] when the cursor is
    /// at a terminal or references an id absent from the chain. The
    /// latter indicates a corrupted chain; the cursor is poisoned to
    /// the failure-exception terminal before the error returns so it
    /// cannot be silently reused.
    pub fn current_node<'a>(&mut self, chain: &'a PolicyChain) -> Result<&'a PolicyNode> {
        if let Some(terminal) = self.terminal() {
            return Err(ChainError::NoCurrentPolicy {
                chain: chain.name().to_string(),
                current: Some(terminal.as_id().to_string()),
            });
        }
        match chain.node(&self.current) {
            Some(node) => Ok(node),
            None => {
                let stale = std::mem::replace(
                    &mut self.current,
                    Terminal::FinalFailureException.as_id().to_string(),
                );
                warn!(
                    chain = chain.name(),
                    current = %stale,
                    "cursor references a policy absent from the chain; poisoning"
                );
                Err(ChainError::NoCurrentPolicy {
                    chain: chain.name().to_string(),
                    current: Some(stale),
                })
            }
        }
    }

    /// Advance the cursor along the edge selected by `outcome`.
    ///
    /// Fails with [`ChainError::NoCurrentPolicy`] when there is no
    /// current node (already terminal, or the id is absent from the
    /// chain); in both cases the cursor is left at the
    /// failure-exception terminal.
    pub fn advance(&mut self, chain: &PolicyChain, outcome: Outcome) -> Result<()> {
        let node = match self.current_node(chain) {
            Ok(node) => node,
            Err(e) => {
                // current_node poisons on a corrupted id but not on a
                // terminal; force the terminal case too so the error
                // path always leaves the cursor poisoned.
                self.current = Terminal::FinalFailureException.as_id().to_string();
                return Err(e);
            }
        };

        let next = match outcome {
            Outcome::Success => &node.success,
            Outcome::Failure => &node.failure,
            Outcome::FailureTimeout => &node.failure_timeout,
            Outcome::FailureRetries => &node.failure_retries,
            Outcome::FailureException => &node.failure_exception,
            Outcome::FailureGuard => &node.failure_guard,
        };

        debug!(
            chain = chain.name(),
            from = %self.current,
            %outcome,
            to = %next,
            "advancing chain cursor"
        );
        self.current = next.clone();
        Ok(())
    }
}
