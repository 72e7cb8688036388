//! `MockTransport` — a test double for `GraphQlTransport`.
//!
//! Responses are queued up front and handed out in order; every document the
//! node sends is recorded so tests can assert on it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::{GraphQlTransport, PipefyCredentials, PipefyError};

/// One recorded `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub document: String,
    pub access_token: String,
}

/// A transport that returns programmer-specified responses.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, PipefyError>>>,
    /// All calls seen by this transport (in call order).
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body, e.g. `{"data": …}` or `{"errors": […]}`.
    pub fn respond_with(self, body: Value) -> Self {
        self.push(Ok(body));
        self
    }

    /// Queue a transport failure.
    pub fn fail_with(self, err: PipefyError) -> Self {
        self.push(Err(err));
        self
    }

    fn push(&self, response: Result<Value, PipefyError>) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
    }

    /// Number of documents sent so far.
    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }

    /// Documents sent so far, in order.
    pub fn documents(&self) -> Vec<String> {
        self.recorded().into_iter().map(|c| c.document).collect()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GraphQlTransport for MockTransport {
    async fn send(
        &self,
        document: &str,
        credentials: &PipefyCredentials,
    ) -> Result<Value, PipefyError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                document: document.to_string(),
                access_token: credentials.access_token().to_string(),
            });

        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| {
                Err(PipefyError::InvalidResponse(
                    "no mock response queued".to_string(),
                ))
            })
    }
}
