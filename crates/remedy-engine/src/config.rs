//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefix for lock owner keys; combined with the control loop
    /// name so the external lock manager can attribute holders.
    #[serde(default = "default_owner_key")]
    pub owner_key: String,

    /// Lease duration requested for each lock, in seconds.
    #[serde(default = "default_lock_lease_secs")]
    pub lock_lease_secs: u64,

    /// Whether to wait for a held lock to become available. When
    /// false, a held resource fails the operation immediately.
    #[serde(default = "default_wait_for_locks")]
    pub wait_for_locks: bool,
}

fn default_owner_key() -> String {
    "remedy".to_string()
}

fn default_lock_lease_secs() -> u64 {
    600
}

fn default_wait_for_locks() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            owner_key: default_owner_key(),
            lock_lease_secs: default_lock_lease_secs(),
            wait_for_locks: default_wait_for_locks(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.owner_key, "remedy");
        assert_eq!(config.lock_lease_secs, 600);
        assert!(config.wait_for_locks);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str("wait_for_locks = false\n").unwrap();
        assert!(!config.wait_for_locks);
        assert_eq!(config.owner_key, "remedy");
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(EngineConfig::from_toml_str("lock_lease_secs = \"soon\"").is_err());
    }
}
