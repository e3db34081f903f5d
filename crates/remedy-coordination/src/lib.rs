//! Coordination directive rendering.
//!
//! A coordination directive names two or more control loops whose
//! executions must be ordered or blocked relative to each other, plus
//! the coordination function that says how. Rendering expands the
//! function's template into a concrete, policy-engine-readable rule.
//! This happens offline, ahead of orchestration; nothing here runs on
//! the hot path.

mod directive;
mod error;
mod render;

pub use directive::CoordinationDirective;
pub use error::{CoordinationError, Result};
pub use render::CoordinationEvaluator;
