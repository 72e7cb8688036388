//! `nodes` crate — the host contract every workflow node is written against.
//!
//! A node implements [`ExecutableNode`], receives the previous step's JSON
//! output as a list of [`items`](crate::items), and answers with its own list
//! of [`OutputItem`]s. Credentials arrive through [`ExecutionContext`]; the
//! host owns their storage.

pub mod error;
pub mod items;
pub mod traits;

pub use error::NodeError;
pub use items::{input_items, OutputItem, PairedItem};
pub use traits::{ExecutableNode, ExecutionContext};
