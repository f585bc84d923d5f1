//! `MockClient`: a test double for `RemoteWorkflowClient` and
//! `DocumentClient`.
//!
//! Records every document, workflow id, agent and upload it receives and
//! answers with a programmer-specified behaviour, optionally after a delay.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use graph::WorkflowDocument;
use nodes::AgentConfig;
use serde_json::{json, Value};

use crate::models::{DocumentMetadata, ExecutionResult, TaskStatus, WorkflowId, WorkflowStatus};
use crate::traits::{DocumentClient, RemoteWorkflowClient};
use crate::TransportError;

/// Behaviour injected into `MockClient` at construction time.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Accept everything; workflow ids are `wf-1`, `wf-2`, ...
    Succeed,
    /// Reject every call as unauthorized.
    FailUnauthorized,
    /// Fail every call with the given status and message.
    FailService { status: u16, message: String },
}

#[derive(Debug, Default)]
struct Calls {
    submitted: Vec<WorkflowDocument>,
    executed: Vec<WorkflowId>,
    agents: Vec<AgentConfig>,
    uploads: Vec<(DocumentMetadata, usize)>,
    searches: Vec<String>,
}

impl Calls {
    fn workflow_status(&self, index: usize) -> &'static str {
        let id = WorkflowId(format!("wf-{}", index + 1));
        if self.executed.contains(&id) {
            "completed"
        } else {
            "created"
        }
    }
}

/// A mock service that records calls and returns canned results.
#[derive(Debug, Clone)]
pub struct MockClient {
    behaviour: MockBehaviour,
    delay: Option<Duration>,
    calls: Arc<Mutex<Calls>>,
}

impl MockClient {
    /// A mock that accepts every request.
    pub fn succeeding() -> Self {
        Self::with_behaviour(MockBehaviour::Succeed)
    }

    /// A mock that fails every request with a service error.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self::with_behaviour(MockBehaviour::FailService {
            status,
            message: message.into(),
        })
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            delay: None,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    /// Wait this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Documents received by `submit`, in call order.
    pub fn submitted(&self) -> Vec<WorkflowDocument> {
        self.lock().submitted.clone()
    }

    /// Workflow ids received by `execute`, in call order.
    pub fn executed(&self) -> Vec<WorkflowId> {
        self.lock().executed.clone()
    }

    pub fn agents(&self) -> Vec<AgentConfig> {
        self.lock().agents.clone()
    }

    /// Metadata and byte count of every upload, in call order.
    pub fn uploads(&self) -> Vec<(DocumentMetadata, usize)> {
        self.lock().uploads.clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.lock().searches.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn respond(&self) -> Result<(), TransportError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behaviour {
            MockBehaviour::Succeed => Ok(()),
            MockBehaviour::FailUnauthorized => Err(TransportError::Unauthorized {
                status: 401,
                message: "invalid API key".into(),
            }),
            MockBehaviour::FailService { status, message } => Err(TransportError::Service {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

#[async_trait]
impl RemoteWorkflowClient for MockClient {
    async fn submit(&self, document: &WorkflowDocument) -> Result<WorkflowId, TransportError> {
        self.respond().await?;
        let mut calls = self.lock();
        calls.submitted.push(document.clone());
        Ok(WorkflowId(format!("wf-{}", calls.submitted.len())))
    }

    async fn execute(&self, workflow_id: &WorkflowId) -> Result<ExecutionResult, TransportError> {
        self.respond().await?;
        self.lock().executed.push(workflow_id.clone());
        Ok(ExecutionResult {
            workflow_id: workflow_id.clone(),
            output: json!({ "status": "completed" }),
        })
    }

    async fn status(&self, workflow_id: &WorkflowId) -> Result<WorkflowStatus, TransportError> {
        self.respond().await?;
        let executed = self.lock().executed.contains(workflow_id);
        Ok(WorkflowStatus {
            workflow_id: workflow_id.clone(),
            status: if executed { "completed" } else { "created" }.to_string(),
            created_at: None,
            results: None,
        })
    }

    async fn list_workflows(&self) -> Result<Vec<Value>, TransportError> {
        self.respond().await?;
        let calls = self.lock();
        Ok((0..calls.submitted.len())
            .map(|i| json!({ "workflow_id": format!("wf-{}", i + 1), "status": calls.workflow_status(i) }))
            .collect())
    }

    async fn create_agent(&self, agent: &AgentConfig) -> Result<String, TransportError> {
        self.respond().await?;
        let mut calls = self.lock();
        calls.agents.push(agent.clone());
        Ok(format!("agent-{}", calls.agents.len()))
    }

    async fn list_agents(&self) -> Result<Vec<Value>, TransportError> {
        self.respond().await?;
        let calls = self.lock();
        Ok(calls
            .agents
            .iter()
            .enumerate()
            .map(|(i, agent)| {
                json!({ "agent_id": format!("agent-{}", i + 1), "type": agent.kind, "name": agent.name })
            })
            .collect())
    }

    /// Every task of every submitted document, in submission order.
    async fn list_tasks(&self) -> Result<Vec<Value>, TransportError> {
        self.respond().await?;
        let calls = self.lock();
        Ok(calls
            .submitted
            .iter()
            .enumerate()
            .flat_map(|(i, document)| {
                let status = calls.workflow_status(i);
                document.tasks.iter().map(move |(task_id, task)| {
                    json!({
                        "task_id": task_id,
                        "workflow_id": format!("wf-{}", i + 1),
                        "type": task.kind,
                        "status": status,
                    })
                })
            })
            .collect())
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, TransportError> {
        self.respond().await?;
        let calls = self.lock();
        let found = calls
            .submitted
            .iter()
            .position(|document| document.tasks.contains_key(task_id));
        match found {
            Some(i) => Ok(TaskStatus {
                task_id: task_id.to_owned(),
                status: calls.workflow_status(i).to_string(),
            }),
            None => Err(TransportError::Service {
                status: 404,
                message: "Task not found".into(),
            }),
        }
    }
}

#[async_trait]
impl DocumentClient for MockClient {
    async fn upload_document(
        &self,
        contents: Vec<u8>,
        metadata: &DocumentMetadata,
    ) -> Result<String, TransportError> {
        self.respond().await?;
        let mut calls = self.lock();
        calls.uploads.push((metadata.clone(), contents.len()));
        Ok(format!("doc-{}", calls.uploads.len()))
    }

    /// Case-insensitive substring match on title, description and filename,
    /// in upload order.
    async fn search_documents(&self, query: &str, limit: usize) -> Result<Vec<Value>, TransportError> {
        self.respond().await?;
        let mut calls = self.lock();
        calls.searches.push(query.to_owned());

        let needle = query.to_lowercase();
        Ok(calls
            .uploads
            .iter()
            .enumerate()
            .filter(|(_, (meta, _))| {
                [&meta.title, &meta.description, &meta.filename]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .take(limit)
            .map(|(i, (meta, _))| json!({ "document_id": format!("doc-{}", i + 1), "metadata": meta }))
            .collect())
    }
}
