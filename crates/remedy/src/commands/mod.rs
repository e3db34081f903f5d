//! CLI command handlers.

pub mod actors;
pub mod render;
pub mod simulate;
pub mod validate;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
}
