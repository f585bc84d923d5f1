//! Reading workflow files from disk.
//!
//! A file holds either an editor graph (`{ "nodes": [...], "edges": [...] }`)
//! or an exported document (`{ "tasks": {...}, "dependencies": [...] }`),
//! encoded as JSON or YAML depending on the extension.

use std::path::Path;

use anyhow::{bail, Context, Result};
use graph::{Graph, WorkflowDocument};
use serde_json::Value;

pub fn read_graph(path: &Path) -> Result<Graph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    parse_graph(&content, extension(path))
        .with_context(|| format!("cannot parse workflow file {}", path.display()))
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("json")
}

fn parse_graph(content: &str, extension: &str) -> Result<Graph> {
    let value: Value = match extension {
        "yaml" | "yml" => serde_yaml::from_str(content)?,
        "json" => serde_json::from_str(content)?,
        other => bail!("unsupported file format '.{other}', use .json, .yaml or .yml"),
    };

    if value.get("nodes").is_some() || value.get("edges").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        let document: WorkflowDocument = serde_json::from_value(value)?;
        Ok(Graph::from_document(&document))
    }
}
