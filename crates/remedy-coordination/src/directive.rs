//! Coordination directives: which loops, coordinated how.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CoordinationError, Result};

/// An ordered list of control-loop names plus the coordination
/// function that relates them.
///
/// Loaded once from YAML, validated, then used read-only to render
/// the function's template. Order matters: the first loop maps to
/// `{{control_loop_1}}`, the second to `{{control_loop_2}}`, and so
/// on.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinationDirective {
    pub control_loops: Vec<String>,
    pub function: String,
}

impl CoordinationDirective {
    /// Parse and validate a directive from YAML text.
    ///
    /// A directive with fewer than two control loops is rejected:
    /// there is nothing to coordinate.
    pub fn load(yaml: &str) -> Result<Self> {
        let directive: Self = serde_yaml::from_str(yaml)?;
        if directive.control_loops.len() < 2 {
            return Err(CoordinationError::InvalidDirective(format!(
                "function '{}' names {} control loop(s); at least two are required",
                directive.function,
                directive.control_loops.len()
            )));
        }
        if directive.function.trim().is_empty() {
            return Err(CoordinationError::InvalidDirective(
                "coordination function name is empty".to_string(),
            ));
        }
        Ok(directive)
    }

    /// Parse and validate a directive from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_two_loop_directive() {
        let directive = CoordinationDirective::load(
            "control_loops: [cl1, cl2]\nfunction: firstBlocksSecond\n",
        )
        .unwrap();
        assert_eq!(directive.control_loops, vec!["cl1", "cl2"]);
        assert_eq!(directive.function, "firstBlocksSecond");
    }

    #[test]
    fn rejects_a_single_loop_directive() {
        let err = CoordinationDirective::load("control_loops: [cl1]\nfunction: f\n").unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidDirective(_)));
    }

    #[test]
    fn rejects_an_empty_function_name() {
        let err =
            CoordinationDirective::load("control_loops: [cl1, cl2]\nfunction: \"\"\n").unwrap_err();
        assert!(matches!(err, CoordinationError::InvalidDirective(_)));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = CoordinationDirective::load("control_loops: {not: a list}\n").unwrap_err();
        assert!(matches!(err, CoordinationError::Yaml(_)));
    }
}
