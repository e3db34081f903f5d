//! Error types for actor request building.

use thiserror::Error;

/// Result type for actor operations.
pub type Result<T> = std::result::Result<T, ActorError>;

/// Errors that can occur while building a backend request.
///
/// The dispatcher treats any of these as "cannot build request" and
/// drives a failure-exception outcome; they never abort the engine.
#[derive(Debug, Error)]
pub enum ActorError {
    /// The event lacks a detail the recipe's payload requires.
    #[error("event missing required field '{0}'")]
    MissingField(String),

    /// An auxiliary inventory lookup failed.
    #[error("inventory lookup failed: {0}")]
    Inventory(String),
}
