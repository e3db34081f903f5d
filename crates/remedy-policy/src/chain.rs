//! Policy chain documents: parsing and validation.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cursor::Terminal;
use crate::error::{ChainError, Result};

/// Target descriptor for a policy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTarget {
    /// Target type the recipe runs against (e.g., `VNF`, `VM`).
    #[serde(rename = "type")]
    pub target_type: String,
}

/// One remediation step in a chain.
///
/// The five failure transitions and the success transition each name
/// the next policy id, or one of the reserved terminal sentinels.
/// Omitted transitions default to their corresponding terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyNode {
    /// Unique id within the chain.
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Actor that executes this step.
    pub actor: String,

    /// Recipe the actor performs.
    pub recipe: String,

    /// Target descriptor.
    pub target: PolicyTarget,

    /// Seconds to wait for the operation's response before a
    /// failure-timeout outcome is synthesized.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Retry attempts after the first failure. `0` means no retries.
    #[serde(default)]
    pub retry: u32,

    #[serde(default = "default_success")]
    pub success: String,

    #[serde(default = "default_failure")]
    pub failure: String,

    #[serde(default = "default_failure_timeout")]
    pub failure_timeout: String,

    #[serde(default = "default_failure_retries")]
    pub failure_retries: String,

    #[serde(default = "default_failure_exception")]
    pub failure_exception: String,

    #[serde(default = "default_failure_guard")]
    pub failure_guard: String,
}

fn default_timeout() -> u64 {
    300
}

fn default_success() -> String {
    Terminal::FinalSuccess.as_id().to_string()
}

fn default_failure() -> String {
    Terminal::FinalFailure.as_id().to_string()
}

fn default_failure_timeout() -> String {
    Terminal::FinalFailureTimeout.as_id().to_string()
}

fn default_failure_retries() -> String {
    Terminal::FinalFailureRetries.as_id().to_string()
}

fn default_failure_exception() -> String {
    Terminal::FinalFailureException.as_id().to_string()
}

fn default_failure_guard() -> String {
    Terminal::FinalFailureGuard.as_id().to_string()
}

impl PolicyNode {
    /// All six (field name, next id) transition pairs.
    pub(crate) fn transitions(&self) -> [(&'static str, &str); 6] {
        [
            ("success", &self.success),
            ("failure", &self.failure),
            ("failure_timeout", &self.failure_timeout),
            ("failure_retries", &self.failure_retries),
            ("failure_exception", &self.failure_exception),
            ("failure_guard", &self.failure_guard),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct ControlLoopSection {
    name: String,
    trigger: String,
}

/// Top-level wrapper matching the YAML document structure.
#[derive(Debug, Deserialize)]
struct ChainDocument {
    control_loop: ControlLoopSection,
    #[serde(default)]
    policies: Vec<PolicyNode>,
}

/// A validated, immutable policy chain for one control loop.
#[derive(Debug, Clone)]
pub struct PolicyChain {
    name: String,
    trigger: String,
    nodes: Vec<PolicyNode>,
    index: HashMap<String, usize>,
}

impl PolicyChain {
    /// Parse and validate a chain document.
    ///
    /// Fails when the document has no policies, duplicate ids, a
    /// trigger that names no policy, or a transition referencing an id
    /// that is neither a policy nor a terminal sentinel.
    pub fn load(yaml: &str) -> Result<Self> {
        let doc: ChainDocument = serde_yaml::from_str(yaml)?;
        let name = doc.control_loop.name;

        if doc.policies.is_empty() {
            return Err(ChainError::EmptyChain(name));
        }

        let mut index = HashMap::with_capacity(doc.policies.len());
        for (i, node) in doc.policies.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(ChainError::DuplicateNode {
                    chain: name,
                    id: node.id.clone(),
                });
            }
        }

        if !index.contains_key(&doc.control_loop.trigger) {
            return Err(ChainError::MissingTrigger {
                chain: name,
                trigger: doc.control_loop.trigger,
            });
        }

        for node in &doc.policies {
            for (field, next) in node.transitions() {
                if Terminal::from_id(next).is_none() && !index.contains_key(next) {
                    return Err(ChainError::DanglingTransition {
                        chain: name,
                        id: node.id.clone(),
                        field,
                        next: next.to_string(),
                    });
                }
            }
        }

        debug!(
            chain = %name,
            policies = doc.policies.len(),
            trigger = %doc.control_loop.trigger,
            "loaded policy chain"
        );

        Ok(Self {
            name,
            trigger: doc.control_loop.trigger,
            nodes: doc.policies,
            index,
        })
    }

    /// Load and validate a chain document from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::load(&yaml)
    }

    /// Control loop name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the trigger (entry) node.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&PolicyNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// The trigger node.
    pub fn trigger_node(&self) -> &PolicyNode {
        // Validated at load time.
        &self.nodes[self.index[&self.trigger]]
    }

    /// All nodes, in document order.
    pub fn nodes(&self) -> &[PolicyNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the chain has no nodes. Always false after `load`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_STEP: &str = r#"
control_loop:
  name: vnf-restart
  trigger: restart
policies:
  - id: restart
    name: Restart the VNF
    actor: APPC
    recipe: Restart
    target: { type: VNF }
    timeout: 300
    retry: 2
    success: final_success
    failure: modify
  - id: modify
    actor: APPC
    recipe: ModifyConfig
    target: { type: VNF }
    success: final_success
"#;

    #[test]
    fn load_valid_chain() {
        let chain = PolicyChain::load(TWO_STEP).unwrap();
        assert_eq!(chain.name(), "vnf-restart");
        assert_eq!(chain.trigger(), "restart");
        assert_eq!(chain.len(), 2);

        let restart = chain.node("restart").unwrap();
        assert_eq!(restart.retry, 2);
        assert_eq!(restart.failure, "modify");
        // Omitted transitions default to their terminal.
        assert_eq!(restart.failure_guard, "final_failure_guard");
        assert_eq!(restart.failure_timeout, "final_failure_timeout");

        let modify = chain.node("modify").unwrap();
        assert_eq!(modify.timeout, 300);
        assert_eq!(modify.retry, 0);
    }

    #[test]
    fn load_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_STEP.as_bytes()).unwrap();
        let chain = PolicyChain::load_file(file.path()).unwrap();
        assert_eq!(chain.trigger_node().id, "restart");
    }

    #[test]
    fn rejects_empty_chain() {
        let yaml = "control_loop:\n  name: cl\n  trigger: a\n";
        assert!(matches!(
            PolicyChain::load(yaml),
            Err(ChainError::EmptyChain(name)) if name == "cl"
        ));
    }

    #[test]
    fn rejects_missing_trigger() {
        let yaml = r#"
control_loop:
  name: cl
  trigger: nope
policies:
  - id: a
    actor: APPC
    recipe: Restart
    target: { type: VNF }
"#;
        assert!(matches!(
            PolicyChain::load(yaml),
            Err(ChainError::MissingTrigger { trigger, .. }) if trigger == "nope"
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let yaml = r#"
control_loop:
  name: cl
  trigger: a
policies:
  - id: a
    actor: APPC
    recipe: Restart
    target: { type: VNF }
  - id: a
    actor: APPC
    recipe: Rebuild
    target: { type: VNF }
"#;
        assert!(matches!(
            PolicyChain::load(yaml),
            Err(ChainError::DuplicateNode { id, .. }) if id == "a"
        ));
    }

    #[test]
    fn rejects_dangling_transition() {
        let yaml = r#"
control_loop:
  name: cl
  trigger: a
policies:
  - id: a
    actor: APPC
    recipe: Restart
    target: { type: VNF }
    failure: missing-node
"#;
        match PolicyChain::load(yaml) {
            Err(ChainError::DanglingTransition { id, field, next, .. }) => {
                assert_eq!(id, "a");
                assert_eq!(field, "failure");
                assert_eq!(next, "missing-node");
            }
            other => panic!("expected DanglingTransition, got {other:?}"),
        }
    }
}
