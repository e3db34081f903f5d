//! Error types for policy chain operations.

use thiserror::Error;

/// Result type for policy chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors that can occur while loading or walking a policy chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The document declares no policies.
    #[error("chain '{0}' declares no policies")]
    EmptyChain(String),

    /// The trigger references a policy id that does not exist.
    #[error("chain '{chain}': trigger '{trigger}' does not name a policy")]
    MissingTrigger { chain: String, trigger: String },

    /// Two policies share the same id.
    #[error("chain '{chain}': duplicate policy id '{id}'")]
    DuplicateNode { chain: String, id: String },

    /// A transition field references a policy id that does not exist.
    #[error(
        "chain '{chain}': policy '{id}' transition '{field}' references unknown policy '{next}'"
    )]
    DanglingTransition {
        chain: String,
        id: String,
        field: &'static str,
        next: String,
    },

    /// The cursor's current id is not present in the chain, or the
    /// cursor was advanced past a terminal. The cursor is poisoned to
    /// the failure-exception terminal before this error is returned.
    #[error("no current policy for chain '{chain}' (cursor at {current:?})")]
    NoCurrentPolicy {
        chain: String,
        current: Option<String>,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
