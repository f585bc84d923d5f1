//! The capabilities the graph core needs from the remote service.

use async_trait::async_trait;
use graph::WorkflowDocument;
use nodes::AgentConfig;
use serde_json::Value;

use crate::models::{DocumentMetadata, ExecutionResult, TaskStatus, WorkflowId, WorkflowStatus};
use crate::TransportError;

/// Workflow and agent submission.
///
/// Implementations surface every failure as a [`TransportError`]; retry
/// policy, if any, lives inside the implementation.
#[async_trait]
pub trait RemoteWorkflowClient: Send + Sync {
    /// Register a workflow document and return the identifier assigned to it.
    async fn submit(&self, document: &WorkflowDocument) -> Result<WorkflowId, TransportError>;

    /// Run a previously submitted workflow.
    async fn execute(&self, workflow_id: &WorkflowId) -> Result<ExecutionResult, TransportError>;

    async fn status(&self, workflow_id: &WorkflowId) -> Result<WorkflowStatus, TransportError>;

    /// Every workflow the service knows, as reported by it.
    async fn list_workflows(&self) -> Result<Vec<Value>, TransportError>;

    /// Register a standalone agent and return its identifier.
    async fn create_agent(&self, agent: &AgentConfig) -> Result<String, TransportError>;

    async fn list_agents(&self) -> Result<Vec<Value>, TransportError>;

    /// Tasks queued or running on the service.
    async fn list_tasks(&self) -> Result<Vec<Value>, TransportError>;

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, TransportError>;
}

/// Document upload and search. Independent of the graph core.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Upload file contents with metadata and return the document identifier.
    async fn upload_document(
        &self,
        contents: Vec<u8>,
        metadata: &DocumentMetadata,
    ) -> Result<String, TransportError>;

    /// Free-text search. Results keep the service's relevance order.
    async fn search_documents(&self, query: &str, limit: usize) -> Result<Vec<Value>, TransportError>;
}
