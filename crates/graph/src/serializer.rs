//! Projection of a validated graph into a [`WorkflowDocument`].

use std::collections::BTreeSet;

use tracing::info;

use crate::dag::{validate, ValidationResult};
use crate::document::{Dependency, Task, WorkflowDocument};
use crate::error::ValidationError;
use crate::models::Graph;

/// Serialize `graph` into the canonical document.
///
/// The graph is validated first; an invalid graph is never projected, the
/// reasons come back as a [`ValidationError`] instead. Dependencies are
/// de-duplicated and sorted by `(from, to)`.
pub fn serialize(graph: &Graph) -> Result<WorkflowDocument, ValidationError> {
    if let ValidationResult::Invalid(reasons) = validate(graph) {
        return Err(ValidationError::new(reasons));
    }

    let tasks = graph
        .nodes
        .iter()
        .map(|node| {
            let task = Task {
                kind: node.kind.clone(),
                config: node.config.clone(),
            };
            (node.id.clone(), task)
        })
        .collect();

    let dependencies: BTreeSet<Dependency> = graph
        .edges
        .iter()
        .map(|edge| Dependency {
            from: edge.source.clone(),
            to: edge.target.clone(),
        })
        .collect();

    let document = WorkflowDocument {
        tasks,
        dependencies: dependencies.into_iter().collect(),
    };
    info!(
        tasks = document.tasks.len(),
        dependencies = document.dependencies.len(),
        "workflow serialized"
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;
    use crate::models::{Edge, Node};
    use serde_json::json;

    #[test]
    fn dependencies_are_sorted_and_deduplicated() {
        let graph = Graph::new(
            vec![Node::new("c", "llm"), Node::new("a", "llm"), Node::new("b", "llm")],
            vec![
                Edge::new("b", "c"),
                Edge::new("a", "c"),
                Edge::new("a", "b"),
                Edge::new("a", "c"),
            ],
        );
        let document = serialize(&graph).unwrap();
        let pairs: Vec<(&str, &str)> = document
            .dependencies
            .iter()
            .map(|d| (d.from.as_str(), d.to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
    }

    #[test]
    fn output_is_byte_identical_regardless_of_input_order() {
        let config = json!({ "model": "gpt-4o", "api_provider": "openai" });
        let config = config.as_object().unwrap().clone();

        let forward = Graph::new(
            vec![Node::new("x", "llm").with_config(config.clone()), Node::new("y", "custom_task")],
            vec![Edge::new("x", "y")],
        );
        let reversed = Graph::new(
            vec![Node::new("y", "custom_task"), Node::new("x", "llm").with_config(config)],
            vec![Edge::new("x", "y")],
        );

        let a = serialize(&forward).unwrap().to_json().unwrap();
        let b = serialize(&reversed).unwrap().to_json().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, serialize(&forward).unwrap().to_json().unwrap());
    }

    #[test]
    fn invalid_graph_is_refused() {
        let graph = Graph::new(vec![Node::new("a", "api_connector")], vec![]);
        let err = serialize(&graph).unwrap_err();
        assert_eq!(
            err.reasons,
            vec![Reason::MissingConfig {
                node_id: "a".into(),
                kind: "api_connector".into(),
                key: "base_url".into(),
            }]
        );
    }

    #[test]
    fn document_round_trips_into_an_equivalent_graph() {
        let config = json!({ "base_url": "https://api.example.com" });
        let graph = Graph::new(
            vec![
                Node::new("fetch", "api_connector").with_config(config.as_object().unwrap().clone()),
                Node::new("summarize", "llm"),
            ],
            vec![Edge::new("fetch", "summarize")],
        );
        let document = serialize(&graph).unwrap();
        let rebuilt = Graph::from_document(&document);
        assert_eq!(serialize(&rebuilt).unwrap(), document);
    }
}
