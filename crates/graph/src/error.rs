//! Error types for the graph crate.
//!
//! Two families live here and they never mix:
//! - [`StructuralError`] is returned synchronously by a store mutation that
//!   would break referential integrity. The store is left untouched.
//! - [`Reason`] describes one problem found by the validator. Reasons are
//!   data; [`ValidationError`] only bundles them so they can travel through `?`.

use serde::Serialize;
use thiserror::Error;

/// A rejected edit operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// An operation referenced a node id that is not in the store.
    #[error("unknown node: '{0}'")]
    UnknownNode(String),

    /// Self-loops are never allowed.
    #[error("invalid edge: node '{0}' cannot depend on itself")]
    InvalidEdge(String),

    /// A caller-chosen id is already taken.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    #[error("node kind must not be empty")]
    EmptyKind,
}

/// One problem that prevents a graph from being exported.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Reason {
    #[error("node '{node_id}' has an empty kind")]
    EmptyKind { node_id: String },

    #[error("node '{node_id}' has unknown kind '{kind}'")]
    UnknownKind { node_id: String, kind: String },

    #[error("node '{node_id}' ({kind}) is missing required config key '{key}'")]
    MissingConfig {
        node_id: String,
        kind: String,
        key: String,
    },

    #[error("duplicate node ID: '{node_id}'")]
    DuplicateNodeId { node_id: String },

    /// An edge endpoint does not exist. One reason per missing endpoint.
    #[error("edge '{from}' -> '{to}' references unknown node '{missing}'")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    /// Node ids along the cycle, starting at the node the back-edge returns to.
    #[error("cycle detected: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("every node has an incoming dependency; the workflow has no entry point")]
    NoEntryPoint,
}

/// All reasons a graph failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("workflow graph is invalid ({} problem(s)): {}", .reasons.len(), summary(.reasons))]
pub struct ValidationError {
    pub reasons: Vec<Reason>,
}

impl ValidationError {
    pub fn new(reasons: Vec<Reason>) -> Self {
        Self { reasons }
    }
}

fn summary(reasons: &[Reason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
