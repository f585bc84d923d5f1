//! `nodes` crate: the catalog of agent kinds a workflow task may use.
//!
//! The graph validator and the workflow serializer both consult this catalog,
//! so a kind is either recognized everywhere or nowhere.

pub mod agent;
pub mod catalog;
pub mod error;

pub use agent::{AgentConfig, AgentKind};
pub use catalog::{missing_keys, required_keys, KindSpec, CATALOG};
pub use error::KindError;
