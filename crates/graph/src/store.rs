//! `GraphStore`: the live, mutable graph behind an editing session.
//!
//! Invariant: every stored edge has both endpoints in the store and
//! `source != target`. Each mutation either succeeds completely or returns a
//! [`StructuralError`] and leaves the store unchanged.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::StructuralError;
use crate::models::{Config, Edge, Graph, Node, Position};

/// Outcome of [`GraphStore::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    /// A new edge was inserted.
    Created(Edge),
    /// The pair was already connected; nothing changed.
    Existing(Edge),
}

impl Connection {
    pub fn edge(&self) -> &Edge {
        match self {
            Self::Created(edge) | Self::Existing(edge) => edge,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Nodes keyed by id plus a set of edges.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: BTreeMap<String, Node>,
    edges: BTreeSet<Edge>,
    /// Source of generated ids. Never decremented, so an id freed by a
    /// removal is never handed out again.
    next_id: u64,
    revision: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot through the regular mutation path, so a graph that
    /// breaks the store invariants is rejected at the first bad element.
    pub fn from_graph(graph: &Graph) -> Result<Self, StructuralError> {
        let mut store = Self::new();
        for node in &graph.nodes {
            store.insert_node(node.clone())?;
        }
        for edge in &graph.edges {
            store.connect(&edge.source, &edge.target)?;
        }
        Ok(store)
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Create a node with a freshly generated id of the form `<kind>-<n>`.
    pub fn add_node(
        &mut self,
        kind: impl Into<String>,
        position: Position,
        config: Config,
    ) -> Result<Node, StructuralError> {
        let kind = kind.into();
        if kind.trim().is_empty() {
            return Err(StructuralError::EmptyKind);
        }

        let id = self.fresh_id(&kind);
        let node = Node {
            id: id.clone(),
            kind,
            position,
            config,
        };

        debug!(node_id = %id, kind = %node.kind, "node added");
        self.nodes.insert(id, node.clone());
        self.bump();
        Ok(node)
    }

    /// Insert a node under its own id.
    pub fn insert_node(&mut self, node: Node) -> Result<Node, StructuralError> {
        if node.kind.trim().is_empty() {
            return Err(StructuralError::EmptyKind);
        }
        if self.nodes.contains_key(&node.id) {
            return Err(StructuralError::DuplicateNodeId(node.id));
        }

        debug!(node_id = %node.id, kind = %node.kind, "node inserted");
        self.nodes.insert(node.id.clone(), node.clone());
        self.bump();
        Ok(node)
    }

    /// Remove a node and every edge touching it. Returns the removed node, or
    /// `None` if the id was unknown.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let node = self.nodes.remove(id)?;

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        debug!(node_id = %id, edges_removed = before - self.edges.len(), "node removed");

        self.bump();
        Some(node)
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), StructuralError> {
        let node = self.node_mut(id)?;
        node.position = position;
        self.bump();
        Ok(())
    }

    /// Replace a node's config mapping.
    pub fn update_config(&mut self, id: &str, config: Config) -> Result<(), StructuralError> {
        let node = self.node_mut(id)?;
        node.config = config;
        debug!(node_id = %id, "node config updated");
        self.bump();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Connect `source → target`. Connecting an already connected pair is a
    /// no-op and returns [`Connection::Existing`].
    pub fn connect(&mut self, source: &str, target: &str) -> Result<Connection, StructuralError> {
        for id in [source, target] {
            if !self.nodes.contains_key(id) {
                return Err(StructuralError::UnknownNode(id.to_owned()));
            }
        }
        if source == target {
            return Err(StructuralError::InvalidEdge(source.to_owned()));
        }

        let edge = Edge::new(source, target);
        if self.edges.contains(&edge) {
            return Ok(Connection::Existing(edge));
        }

        debug!(source, target, "edge added");
        self.edges.insert(edge.clone());
        self.bump();
        Ok(Connection::Created(edge))
    }

    /// Remove `source → target` if present. Returns whether anything changed.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let removed = self.edges.remove(&Edge::new(source, target));
        if removed {
            debug!(source, target, "edge removed");
            self.bump();
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edges.contains(&Edge::new(source, target))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Incremented by every mutation that changed the graph.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Owned copy of the current graph. Later edits do not affect it.
    pub fn snapshot(&self) -> Graph {
        Graph {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.iter().cloned().collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn fresh_id(&mut self, kind: &str) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("{kind}-{}", self.next_id);
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, StructuralError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| StructuralError::UnknownNode(id.to_owned()))
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
