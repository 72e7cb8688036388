//! `PipefyNode` — the `ExecutableNode` implementation.
//!
//! One run of the node:
//! 1. Reads the token from the execution context's secrets.
//! 2. Splits the input into items.
//! 3. For each item, resolves parameters, builds the document for the
//!    configured action, and sends it.
//! 4. Turns each response's `data` into output items paired with the input
//!    item that produced them.
//!
//! With `continueOnFail` set, a failing item yields `{"error": …}` instead of
//! aborting the run.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use nodes::{input_items, ExecutableNode, ExecutionContext, NodeError, OutputItem};

use crate::description::NODE_TYPE;
use crate::operations::build_document;
use crate::params::Parameters;
use crate::{Action, GraphQlTransport, Operation, PipefyClient, PipefyCredentials, PipefyError, Resource};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Node configuration as stored in the workflow definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipefyNodeConfig {
    #[serde(default)]
    pub resource: Resource,
    /// Defaults to the resource's first operation.
    #[serde(default)]
    pub operation: Option<Operation>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub continue_on_fail: bool,
}

// ---------------------------------------------------------------------------
// PipefyNode
// ---------------------------------------------------------------------------

pub struct PipefyNode {
    action: Action,
    parameters: Parameters,
    continue_on_fail: bool,
    transport: Arc<dyn GraphQlTransport>,
}

impl PipefyNode {
    /// # Errors
    /// [`PipefyError::InvalidOperation`] when the operation does not belong
    /// to the resource.
    pub fn new(config: PipefyNodeConfig, transport: Arc<dyn GraphQlTransport>) -> Result<Self, PipefyError> {
        let action = Action::with_default(config.resource, config.operation)?;
        Ok(Self {
            action,
            parameters: Parameters::new(config.parameters),
            continue_on_fail: config.continue_on_fail,
            transport,
        })
    }

    /// Build from the raw JSON configuration of a workflow node.
    pub fn from_value(config: Value, transport: Arc<dyn GraphQlTransport>) -> Result<Self, PipefyError> {
        let config: PipefyNodeConfig = serde_json::from_value(config).map_err(|e| {
            PipefyError::InvalidConfig(format!("invalid pipefy node config: {e}"))
        })?;
        Self::new(config, transport)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Run the configured action for a single item and return its `data`.
    async fn run_item(&self, client: &PipefyClient, item: &Value) -> Result<Value, PipefyError> {
        let params = self.parameters.for_item(item);
        let document = build_document(self.action, &params)?;
        client.execute(&document).await
    }

    /// Run every item and collect the output items.
    pub async fn run(&self, input: Value, credentials: PipefyCredentials) -> Result<Vec<OutputItem>, PipefyError> {
        let client = PipefyClient::new(self.transport.clone(), credentials);
        let mut output = Vec::new();

        for (index, item) in input_items(input).iter().enumerate() {
            match self.run_item(&client, item).await {
                Ok(data) => output.extend(OutputItem::from_payload(data, index)),
                Err(err) if self.continue_on_fail => {
                    warn!(item = index, error = %err, "item failed, continuing");
                    output.push(OutputItem::new(json!({ "error": err.to_string() }), index));
                }
                Err(err) => {
                    warn!(item = index, error = %err, "item failed");
                    return Err(err);
                }
            }
        }

        Ok(output)
    }
}

#[async_trait]
impl ExecutableNode for PipefyNode {
    fn node_type(&self) -> &str {
        NODE_TYPE
    }

    #[instrument(
        skip_all,
        fields(
            execution_id = %ctx.execution_id,
            resource = %self.action.resource(),
            operation = %self.action.operation(),
        )
    )]
    async fn execute(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let credentials = PipefyCredentials::from_context(ctx)?;
        let output = self.run(input, credentials).await?;
        info!(items = output.len(), "pipefy node finished");
        serde_json::to_value(output).map_err(|e| NodeError::Fatal(format!("failed to encode output: {e}")))
    }
}
