//! Operation outcomes.

use serde::{Deserialize, Serialize};

/// Result of one actor operation, as fed back by the host.
///
/// Each variant selects one transition edge on the current policy
/// node. `FailureGuard` covers both guard denials and guard-channel
/// errors; the engine does not distinguish the denial reason beyond
/// that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    FailureTimeout,
    FailureRetries,
    FailureException,
    FailureGuard,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::FailureTimeout => "failure_timeout",
            Outcome::FailureRetries => "failure_retries",
            Outcome::FailureException => "failure_exception",
            Outcome::FailureGuard => "failure_guard",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serde_snake_case() {
        let json = serde_json::to_string(&Outcome::FailureTimeout).unwrap();
        assert_eq!(json, "\"failure_timeout\"");
        let parsed: Outcome = serde_json::from_str("\"failure_guard\"").unwrap();
        assert_eq!(parsed, Outcome::FailureGuard);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Success.to_string(), "success");
        assert_eq!(Outcome::FailureRetries.to_string(), "failure_retries");
    }
}
