//! Node-level error type.

use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// The host uses the variant to decide retry behaviour:
/// - `Retryable` — the step may be run again after a back-off.
/// - `Fatal`     — the execution is immediately marked as failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Transient failure; the host should re-try the step.
    #[error("retryable node error: {0}")]
    Retryable(String),

    /// Permanent failure; no retry should be attempted.
    #[error("fatal node error: {0}")]
    Fatal(String),
}

impl NodeError {
    /// `true` when the host may run the step again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NodeError::Retryable(_))
    }

    /// The bare message, without the retry classification prefix.
    pub fn message(&self) -> &str {
        match self {
            NodeError::Retryable(msg) | NodeError::Fatal(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        assert!(NodeError::Retryable("timeout".into()).is_retryable());
        assert!(!NodeError::Fatal("bad input".into()).is_retryable());
    }

    #[test]
    fn message_strips_prefix() {
        let err = NodeError::Fatal("card not found".into());
        assert_eq!(err.message(), "card not found");
        assert_eq!(err.to_string(), "fatal node error: card not found");
    }
}
