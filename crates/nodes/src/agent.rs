//! Agent kinds and the standalone agent definition accepted by the remote service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::KindError;

/// The closed set of agent kinds the remote executor knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// A call to a language model.
    Llm,
    /// Retrieval from a vector store or document index.
    DataRetrieval,
    /// User-supplied task logic.
    CustomTask,
    /// A call to an external HTTP API.
    ApiConnector,
}

impl AgentKind {
    /// Every recognized kind, in catalog order.
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Llm,
        AgentKind::DataRetrieval,
        AgentKind::CustomTask,
        AgentKind::ApiConnector,
    ];

    /// Wire name of the kind (`"llm"`, `"data_retrieval"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::DataRetrieval => "data_retrieval",
            Self::CustomTask => "custom_task",
            Self::ApiConnector => "api_connector",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llm"            => Ok(Self::Llm),
            "data_retrieval" => Ok(Self::DataRetrieval),
            "custom_task"    => Ok(Self::CustomTask),
            "api_connector"  => Ok(Self::ApiConnector),
            other            => Err(KindError::Unknown(other.to_string())),
        }
    }
}

/// A standalone agent definition, submitted on its own rather than as part of
/// a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(rename = "type")]
    pub kind: AgentKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Opaque settings interpreted by the executor.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl AgentConfig {
    pub fn new(kind: AgentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            config: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_parse_back() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.as_str().parse::<AgentKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            "webhook".parse::<AgentKind>(),
            Err(KindError::Unknown("webhook".into()))
        );
    }

    #[test]
    fn agent_config_uses_type_field_on_the_wire() {
        let agent = AgentConfig::new(AgentKind::DataRetrieval, "retriever");
        let value = serde_json::to_value(&agent).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "data_retrieval",
                "name": "retriever",
                "description": "",
                "config": {}
            })
        );
    }
}
