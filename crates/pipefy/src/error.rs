//! Typed error type for the pipefy crate.

use nodes::NodeError;
use thiserror::Error;

use crate::model::{Operation, Resource};

#[derive(Debug, Error)]
pub enum PipefyError {
    // ------ Configuration errors ------
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// The operation exists but not for the chosen resource.
    #[error("operation '{operation}' is not available for resource '{resource}'")]
    InvalidOperation {
        resource: Resource,
        operation: Operation,
    },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("no Pipefy access token found in credentials")]
    MissingCredentials,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ------ Request errors ------
    #[error("request to Pipefy failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Pipefy responded with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// First entry of the response's `errors` array.
    #[error("Pipefy API error: {0}")]
    GraphQl(String),

    #[error("unexpected response from Pipefy: {0}")]
    InvalidResponse(String),
}

impl PipefyError {
    /// Whether running the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipefyError::Transport(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            PipefyError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<PipefyError> for NodeError {
    fn from(err: PipefyError) -> Self {
        if err.is_retryable() {
            NodeError::Retryable(err.to_string())
        } else {
            NodeError::Fatal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> PipefyError {
        PipefyError::HttpStatus {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        assert!(status(429).is_retryable());
        assert!(status(502).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn graphql_errors_map_to_fatal() {
        let err: NodeError = PipefyError::GraphQl("Permission denied".into()).into();
        assert_eq!(
            err,
            NodeError::Fatal("Pipefy API error: Permission denied".into())
        );
    }

    #[test]
    fn server_errors_map_to_retryable() {
        let err: NodeError = status(503).into();
        assert!(err.is_retryable());
    }
}
