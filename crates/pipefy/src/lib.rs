//! `pipefy` crate — a workflow node for the Pipefy GraphQL API.
//!
//! The node maps a (resource, operation) pair plus its parameters onto one
//! GraphQL document, posts it with the workflow's personal access token, and
//! turns the response into output items. The option loaders in [`options`]
//! populate pipe and field selectors at configuration time.

pub mod client;
pub mod config;
pub mod credentials;
pub mod description;
pub mod error;
pub mod graphql;
pub mod mock;
pub mod model;
pub mod node;
pub mod operations;
pub mod options;
pub mod params;

pub use client::{GraphQlTransport, HttpTransport, PipefyClient};
pub use config::PipefyConfig;
pub use credentials::PipefyCredentials;
pub use description::{describe, NodeDescription};
pub use error::PipefyError;
pub use model::{Action, Operation, Resource};
pub use node::{PipefyNode, PipefyNodeConfig};
