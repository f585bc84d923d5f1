//! Per-kind configuration requirements, declared as data.
//!
//! Adding a kind means adding a row to [`CATALOG`]; nothing else branches on
//! the kind name.

use serde_json::{Map, Value};

use crate::AgentKind;

/// Requirements for one agent kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub kind: AgentKind,
    /// Keys that must be present in a task's `config` mapping.
    pub required_keys: &'static [&'static str],
}

/// The catalog of recognized kinds.
pub const CATALOG: &[KindSpec] = &[
    KindSpec { kind: AgentKind::Llm,           required_keys: &[] },
    KindSpec { kind: AgentKind::DataRetrieval, required_keys: &["db_path"] },
    KindSpec { kind: AgentKind::CustomTask,    required_keys: &[] },
    KindSpec { kind: AgentKind::ApiConnector,  required_keys: &["base_url"] },
];

/// Required config keys for `kind`.
pub fn required_keys(kind: AgentKind) -> &'static [&'static str] {
    CATALOG
        .iter()
        .find(|spec| spec.kind == kind)
        .map(|spec| spec.required_keys)
        .unwrap_or(&[])
}

/// Required keys for `kind` that are absent from `config`, in catalog order.
pub fn missing_keys(kind: AgentKind, config: &Map<String, Value>) -> Vec<&'static str> {
    required_keys(kind)
        .iter()
        .copied()
        .filter(|key| !config.contains_key(*key))
        .collect()
}
