//! The canonical workflow document exchanged with the remote executor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Config;

/// One task entry, keyed by node id in [`WorkflowDocument::tasks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: Config,
}

/// `to` depends on `from`. Ordering is lexicographic on `(from, to)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    pub from: String,
    pub to: String,
}

/// Task map plus dependency list.
///
/// `tasks` is a `BTreeMap` so the serialised form has a stable key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl WorkflowDocument {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Compact JSON encoding. Identical documents encode to identical bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
