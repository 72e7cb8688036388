//! The `ExecutableNode` trait — the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::NodeError;

/// Shared context passed to every node during execution.
#[derive(Clone)]
pub struct ExecutionContext {
    /// ID of the parent workflow.
    pub workflow_id: Uuid,
    /// ID of the current execution run.
    pub execution_id: Uuid,
    /// Initial input supplied when the execution was triggered.
    pub input: Value,
    /// Decrypted secrets scoped to this workflow.
    pub secrets: HashMap<String, String>,
}

impl ExecutionContext {
    /// Context for a standalone run with fresh IDs and no trigger input.
    pub fn standalone(secrets: HashMap<String, String>) -> Self {
        Self {
            workflow_id: Uuid::new_v4(),
            execution_id: Uuid::new_v4(),
            input: Value::Null,
            secrets,
        }
    }

    /// Look up a secret, treating an empty value as absent.
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.secrets
            .get(key)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

// Secrets must never reach log output.
impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.secrets.keys().collect();
        keys.sort();
        f.debug_struct("ExecutionContext")
            .field("workflow_id", &self.workflow_id)
            .field("execution_id", &self.execution_id)
            .field("input", &self.input)
            .field("secrets", &keys)
            .finish()
    }
}

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Type name the host registers this node under.
    fn node_type(&self) -> &str;

    /// Execute the node, receive the *previous* node's JSON output as `input`,
    /// and return this node's JSON output.
    async fn execute(
        &self,
        input: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_absent() {
        let ctx = ExecutionContext::standalone(HashMap::from([
            ("empty".to_string(), String::new()),
            ("token".to_string(), "abc".to_string()),
        ]));
        assert_eq!(ctx.secret("empty"), None);
        assert_eq!(ctx.secret("missing"), None);
        assert_eq!(ctx.secret("token"), Some("abc"));
    }

    #[test]
    fn debug_hides_secret_values() {
        let ctx = ExecutionContext::standalone(HashMap::from([(
            "pipefyApi".to_string(),
            "super-secret".to_string(),
        )]));
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("pipefyApi"));
        assert!(!rendered.contains("super-secret"));
    }
}
