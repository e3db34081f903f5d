//! Error types for directive loading and rendering.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoordinationError>;

#[derive(Debug, Error)]
pub enum CoordinationError {
    /// The directive names fewer than two control loops, or is
    /// otherwise not a usable coordination rule.
    #[error("invalid coordination directive: {0}")]
    InvalidDirective(String),

    /// No template exists for the directive's coordination function.
    #[error("no template for coordination function '{function}' in {dir}")]
    TemplateNotFound { function: String, dir: PathBuf },

    /// The template exists but could not be rendered.
    #[error("failed to render template {path}: {reason}")]
    Render { path: PathBuf, reason: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
