//! DAG validation: run this before exporting a workflow.
//!
//! Rules enforced (all of them, every time, so the caller sees every problem):
//! 1. Node IDs must be unique.
//! 2. Every node has a non-empty, recognized kind, and its config carries
//!    the keys the catalog requires for that kind.
//! 3. Every edge must reference existing nodes (both `source` and `target`).
//! 4. The directed graph must be acyclic.
//! 5. A non-empty graph must have at least one node with no incoming edge.
//!
//! Validation is a pure function of the snapshot and runs in O(V + E).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use nodes::AgentKind;
use tracing::debug;

use crate::error::{Reason, ValidationError};
use crate::models::Graph;

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<Reason>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reasons(&self) -> &[Reason] {
        match self {
            Self::Valid => &[],
            Self::Invalid(reasons) => reasons,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(reasons) => Err(ValidationError::new(reasons)),
        }
    }
}

/// Check every structural rule and collect all problems found.
pub fn validate(graph: &Graph) -> ValidationResult {
    let mut reasons = Vec::new();

    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut node_set: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !node_set.insert(node.id.as_str()) {
            reasons.push(Reason::DuplicateNodeId { node_id: node.id.clone() });
        }
    }

    // -----------------------------------------------------------------------
    // 2. Kinds and required config
    // -----------------------------------------------------------------------
    for node in &graph.nodes {
        if node.kind.trim().is_empty() {
            reasons.push(Reason::EmptyKind { node_id: node.id.clone() });
            continue;
        }
        match node.kind.parse::<AgentKind>() {
            Ok(kind) => {
                for key in nodes::missing_keys(kind, &node.config) {
                    reasons.push(Reason::MissingConfig {
                        node_id: node.id.clone(),
                        kind: node.kind.clone(),
                        key: key.to_owned(),
                    });
                }
            }
            Err(_) => reasons.push(Reason::UnknownKind {
                node_id: node.id.clone(),
                kind: node.kind.clone(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // 3. Validate edge endpoints
    // -----------------------------------------------------------------------
    // Only edges whose endpoints both exist take part in the later checks.
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> =
        node_set.iter().map(|&id| (id, BTreeSet::new())).collect();

    for edge in &graph.edges {
        let mut dangling = false;
        for endpoint in [&edge.source, &edge.target] {
            if !node_set.contains(endpoint.as_str()) {
                dangling = true;
                reasons.push(Reason::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
        if !dangling {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .insert(edge.target.as_str());
        }
    }

    // -----------------------------------------------------------------------
    // 4. Cycle detection (one report per strongly connected component)
    // -----------------------------------------------------------------------
    for cycle in find_cycles(&adjacency) {
        reasons.push(Reason::CycleDetected { cycle });
    }

    // -----------------------------------------------------------------------
    // 5. Entry point
    // -----------------------------------------------------------------------
    if !node_set.is_empty() {
        let with_incoming: HashSet<&str> = adjacency.values().flatten().copied().collect();
        if node_set.iter().all(|id| with_incoming.contains(id)) {
            reasons.push(Reason::NoEntryPoint);
        }
    }

    if reasons.is_empty() {
        debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "graph is valid");
        ValidationResult::Valid
    } else {
        debug!(problems = reasons.len(), "graph is invalid");
        ValidationResult::Invalid(reasons)
    }
}

/// Node ids of a valid graph in dependency order, ties broken by id.
///
/// Returns `None` if the graph fails validation.
pub fn topological_order(graph: &Graph) -> Option<Vec<String>> {
    if !validate(graph).is_valid() {
        return None;
    }

    // Kahn's algorithm over the de-duplicated edge set.
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();

    for node in &graph.nodes {
        adjacency.entry(node.id.as_str()).or_default();
        in_degree.entry(node.id.as_str()).or_insert(0);
    }
    for edge in &graph.edges {
        if adjacency
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.as_str())
        {
            *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
        }
    }

    // Seed the ready set with nodes that have no incoming edges.
    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut sorted = Vec::with_capacity(graph.nodes.len());
    while let Some(node_id) = ready.pop_first() {
        sorted.push(node_id.to_owned());
        for &next in &adjacency[node_id] {
            if let Some(deg) = in_degree.get_mut(next) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(next);
                }
            }
        }
    }

    (sorted.len() == graph.nodes.len()).then_some(sorted)
}

type Adjacency<'a> = BTreeMap<&'a str, BTreeSet<&'a str>>;

fn children<'a, 'g>(adjacency: &'g Adjacency<'a>, id: &str) -> impl Iterator<Item = &'a str> + 'g {
    adjacency.get(id).into_iter().flatten().copied()
}

/// One cycle per strongly connected component that contains a loop, ordered
/// by the smallest id in the component. The reported cycle starts at that id
/// and is a shortest loop back to it.
fn find_cycles(adjacency: &Adjacency<'_>) -> Vec<Vec<String>> {
    let component = strongly_connected(adjacency);

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for &c in component.values() {
        *sizes.entry(c).or_insert(0) += 1;
    }

    let mut seen = HashSet::new();
    let mut cycles = Vec::new();
    for &id in adjacency.keys() {
        let Some(&c) = component.get(id) else { continue };
        if !seen.insert(c) {
            continue;
        }
        let self_loop = children(adjacency, id).any(|child| child == id);
        if sizes.get(&c) == Some(&1) && !self_loop {
            continue;
        }
        if let Some(cycle) = shortest_cycle_through(id, adjacency, &component) {
            cycles.push(cycle);
        }
    }
    cycles
}

/// Iterative Tarjan. Maps every node to the index of its component.
fn strongly_connected<'a>(adjacency: &Adjacency<'a>) -> HashMap<&'a str, usize> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(adjacency.len());
    let mut low: HashMap<&str, usize> = HashMap::with_capacity(adjacency.len());
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();
    let mut component: HashMap<&'a str, usize> = HashMap::with_capacity(adjacency.len());
    let mut next_component = 0;

    for &root in adjacency.keys() {
        if index.contains_key(root) {
            continue;
        }

        let n = index.len();
        index.insert(root, n);
        low.insert(root, n);
        stack.push(root);
        on_stack.insert(root);
        let mut call = vec![(root, children(adjacency, root))];

        while let Some((node, iter)) = call.last_mut() {
            let node = *node;
            match iter.next() {
                Some(child) => match index.get(child) {
                    None => {
                        let n = index.len();
                        index.insert(child, n);
                        low.insert(child, n);
                        stack.push(child);
                        on_stack.insert(child);
                        call.push((child, children(adjacency, child)));
                    }
                    Some(&child_index) if on_stack.contains(child) => {
                        if let Some(l) = low.get_mut(node) {
                            *l = (*l).min(child_index);
                        }
                    }
                    Some(_) => {}
                },
                None => {
                    call.pop();
                    let node_low = low.get(node).copied().unwrap_or(usize::MAX);
                    if let Some((parent, _)) = call.last() {
                        if let Some(l) = low.get_mut(parent) {
                            *l = (*l).min(node_low);
                        }
                    }
                    if Some(&node_low) == index.get(node) {
                        while let Some(member) = stack.pop() {
                            on_stack.remove(member);
                            component.insert(member, next_component);
                            if member == node {
                                break;
                            }
                        }
                        next_component += 1;
                    }
                }
            }
        }
    }

    component
}

/// Breadth-first search from `start` inside its own component until an edge
/// leads back to `start`.
fn shortest_cycle_through(
    start: &str,
    adjacency: &Adjacency<'_>,
    component: &HashMap<&str, usize>,
) -> Option<Vec<String>> {
    if children(adjacency, start).any(|child| child == start) {
        return Some(vec![start.to_owned()]);
    }

    let target = component.get(start)?;
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for child in children(adjacency, node) {
            if child == start {
                let mut cycle = vec![node.to_owned()];
                let mut current = node;
                while let Some(&prev) = parent.get(current) {
                    cycle.push(prev.to_owned());
                    current = prev;
                }
                cycle.reverse();
                return Some(cycle);
            }
            if component.get(child) == Some(target) && !parent.contains_key(child) {
                parent.insert(child, node);
                queue.push_back(child);
            }
        }
    }
    None
}
