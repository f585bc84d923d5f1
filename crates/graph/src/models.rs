//! Core domain models for the workflow graph.
//!
//! A [`Graph`] is the plain, serialisable snapshot of what the user has drawn.
//! It may arrive from a file as well as from live editing, so nothing about it
//! is trusted until [`crate::validate`] has looked at it.

use serde::{Deserialize, Serialize};

use crate::document::WorkflowDocument;

/// Opaque per-task settings, interpreted by the executor.
pub type Config = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Canvas coordinate of a node. Display-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single task in the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within this graph (referenced by edges).
    pub id: String,
    /// Agent kind, e.g. `llm` or `api_connector`.
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub config: Config,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            position: Position::default(),
            config: Config::new(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Directed dependency: `target` runs after `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// An immutable snapshot of nodes and edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rebuild a graph from an exported document. Positions are not part of
    /// the document and come back at the origin.
    pub fn from_document(document: &WorkflowDocument) -> Self {
        let nodes = document
            .tasks
            .iter()
            .map(|(id, task)| Node::new(id.clone(), task.kind.clone()).with_config(task.config.clone()))
            .collect();

        let edges = document
            .dependencies
            .iter()
            .map(|dep| Edge::new(dep.from.clone(), dep.to.clone()))
            .collect();

        Self { nodes, edges }
    }
}
