//! `pipefy-node` CLI entry-point.
//!
//! Available sub-commands:
//! - `describe`      — print the node description.
//! - `run`           — execute the node with a JSON node configuration.
//! - `pipes`         — list the pipes visible to the token.
//! - `fields`        — list a pipe's fields as form properties.
//! - `field-options` — list a pipe's fields as selector options.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nodes::{ExecutableNode, ExecutionContext};
use pipefy::credentials::CREDENTIAL_NAME;
use pipefy::{options, HttpTransport, PipefyClient, PipefyConfig, PipefyCredentials, PipefyNode};

#[derive(Parser)]
#[command(
    name = "pipefy-node",
    about = "Run Pipefy GraphQL operations the way a workflow node does",
    version
)]
struct Cli {
    /// GraphQL endpoint; overrides PIPEFY_API_URL.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Personal access token.
    #[arg(long, env = "PIPEFY_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the node description as JSON.
    Describe,
    /// Execute the node once.
    Run {
        /// Path to the node configuration JSON (resource, operation, parameters).
        #[arg(long)]
        config: PathBuf,
        /// Path to the input items JSON; defaults to a single empty item.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// List pipes for a pipe selector.
    Pipes,
    /// List a pipe's fields as form properties.
    Fields {
        #[arg(long)]
        pipe_id: String,
    },
    /// List a pipe's fields as selector options.
    FieldOptions {
        #[arg(long)]
        pipe_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Describe = cli.command {
        return print_json(&serde_json::to_value(pipefy::describe())?);
    }

    let mut config = PipefyConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    let transport = Arc::new(HttpTransport::new(&config)?);
    let token = cli
        .token
        .context("a Pipefy token is required (--token or PIPEFY_TOKEN)")?;
    let credentials = PipefyCredentials::new(token.clone())?;
    info!(endpoint = %config.endpoint, "using Pipefy endpoint");

    match cli.command {
        Command::Describe => Ok(()),
        Command::Run { config, input } => {
            let node_config = read_json(&config)?;
            let input = match input {
                Some(path) => read_json(&path)?,
                None => json!([{}]),
            };

            let node = PipefyNode::from_value(node_config, transport)?;
            let ctx = ExecutionContext::standalone(HashMap::from([(CREDENTIAL_NAME.to_string(), token)]));
            info!(action = %node.action(), execution_id = %ctx.execution_id, "running node");

            let output = node.execute(input, &ctx).await?;
            print_json(&output)
        }
        Command::Pipes => {
            let client = PipefyClient::new(transport, credentials);
            let pipes = options::get_pipes(&client).await?;
            print_json(&serde_json::to_value(pipes)?)
        }
        Command::Fields { pipe_id } => {
            let client = PipefyClient::new(transport, credentials);
            let fields = options::get_pipe_fields(&client, &pipe_id).await?;
            print_json(&serde_json::to_value(fields)?)
        }
        Command::FieldOptions { pipe_id } => {
            let client = PipefyClient::new(transport, credentials);
            let fields = options::get_pipe_field_options_for_select(&client, &pipe_id).await?;
            print_json(&serde_json::to_value(fields)?)
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
