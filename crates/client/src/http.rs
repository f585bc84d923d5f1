//! HTTP implementation of the remote collaborators.
//!
//! Routes:
//!   POST /workflows                  → `{ "workflow_id": ... }`
//!   POST /workflows/{id}/execute     → task results
//!   GET  /workflows/{id}/status      → status report
//!   GET  /workflows                  → `{ "workflows": [...] }`
//!   POST /agents                     → `{ "agent_id": ... }`
//!   GET  /agents                     → `{ "agents": [...] }`
//!   GET  /tasks                      → `{ "tasks": [...] }`
//!   GET  /tasks/{id}/status          → `{ "task_id": ..., "status": ... }`
//!   POST /documents/upload           → `{ "document_id": ... }` (multipart)
//!   GET  /documents/search           → `{ "results": [...] }`
//!
//! Ids are pushed as single escaped path segments, so an id can never
//! select a different route.

use async_trait::async_trait;
use graph::WorkflowDocument;
use nodes::AgentConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::models::{DocumentMetadata, ExecutionResult, TaskStatus, WorkflowId, WorkflowStatus};
use crate::traits::{DocumentClient, RemoteWorkflowClient};
use crate::TransportError;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SubmitResponse {
    workflow_id: String,
}

#[derive(Deserialize)]
struct AgentResponse {
    /// Some deployments return a number here.
    agent_id: Value,
}

#[derive(Deserialize)]
struct UploadResponse {
    document_id: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Deserialize)]
struct WorkflowList {
    #[serde(default)]
    workflows: Vec<Value>,
}

#[derive(Deserialize)]
struct AgentList {
    #[serde(default)]
    agents: Vec<Value>,
}

#[derive(Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<Value>,
}

// ---------------------------------------------------------------------------
// HttpWorkflowClient
// ---------------------------------------------------------------------------

/// Talks to the workflow service over HTTP with a bearer credential.
#[derive(Debug, Clone)]
pub struct HttpWorkflowClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpWorkflowClient {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                TransportError::Config("API key contains characters not allowed in a header".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TransportError::Config(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Config(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(builder_error)?;

        Ok(Self { http, base_url })
    }

    /// Base URL extended by `segments`, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::Config(format!("base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send the request and decode a success body as `T`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = status_error(status, &body);
            warn!("request failed: {err}");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }
}

/// A client or request that cannot be built is a configuration problem.
fn builder_error(err: reqwest::Error) -> TransportError {
    TransportError::Config(format!("cannot build HTTP client: {err}"))
}

/// Map a non-success status to a transport error, keeping the service's own
/// message when the body carries one.
fn status_error(status: StatusCode, body: &[u8]) -> TransportError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("no response body").to_string()
            } else {
                text.chars().take(200).collect()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        _ => TransportError::Service {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl RemoteWorkflowClient for HttpWorkflowClient {
    #[instrument(skip(self, document), fields(tasks = document.tasks.len()))]
    async fn submit(&self, document: &WorkflowDocument) -> Result<WorkflowId, TransportError> {
        let response: SubmitResponse = self
            .send(self.http.post(self.endpoint(&["workflows"])?).json(document))
            .await?;
        debug!(workflow_id = %response.workflow_id, "workflow submitted");
        Ok(WorkflowId(response.workflow_id))
    }

    #[instrument(skip(self, workflow_id), fields(workflow_id = %workflow_id))]
    async fn execute(&self, workflow_id: &WorkflowId) -> Result<ExecutionResult, TransportError> {
        let url = self.endpoint(&["workflows", workflow_id.as_str(), "execute"])?;
        let output: Value = self.send(self.http.post(url)).await?;
        Ok(ExecutionResult {
            workflow_id: workflow_id.clone(),
            output,
        })
    }

    #[instrument(skip(self, workflow_id), fields(workflow_id = %workflow_id))]
    async fn status(&self, workflow_id: &WorkflowId) -> Result<WorkflowStatus, TransportError> {
        let url = self.endpoint(&["workflows", workflow_id.as_str(), "status"])?;
        self.send(self.http.get(url)).await
    }

    #[instrument(skip(self))]
    async fn list_workflows(&self) -> Result<Vec<Value>, TransportError> {
        let response: WorkflowList = self.send(self.http.get(self.endpoint(&["workflows"])?)).await?;
        Ok(response.workflows)
    }

    #[instrument(skip(self, agent), fields(kind = %agent.kind, name = %agent.name))]
    async fn create_agent(&self, agent: &AgentConfig) -> Result<String, TransportError> {
        let response: AgentResponse = self
            .send(self.http.post(self.endpoint(&["agents"])?).json(agent))
            .await?;
        match response.agent_id {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(TransportError::MalformedResponse(format!(
                "unexpected agent_id: {other}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn list_agents(&self) -> Result<Vec<Value>, TransportError> {
        let response: AgentList = self.send(self.http.get(self.endpoint(&["agents"])?)).await?;
        Ok(response.agents)
    }

    #[instrument(skip(self))]
    async fn list_tasks(&self) -> Result<Vec<Value>, TransportError> {
        let response: TaskList = self.send(self.http.get(self.endpoint(&["tasks"])?)).await?;
        Ok(response.tasks)
    }

    #[instrument(skip(self))]
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, TransportError> {
        let url = self.endpoint(&["tasks", task_id, "status"])?;
        self.send(self.http.get(url)).await
    }
}

#[async_trait]
impl DocumentClient for HttpWorkflowClient {
    #[instrument(skip(self, contents, metadata), fields(filename = %metadata.filename, bytes = contents.len()))]
    async fn upload_document(
        &self,
        contents: Vec<u8>,
        metadata: &DocumentMetadata,
    ) -> Result<String, TransportError> {
        let metadata_json = serde_json::to_string(metadata)
            .map_err(|e| TransportError::Config(format!("cannot encode metadata: {e}")))?;
        let form = Form::new()
            .part("file", Part::bytes(contents).file_name(metadata.filename.clone()))
            .text("metadata", metadata_json);

        let response: UploadResponse = self
            .send(self.http.post(self.endpoint(&["documents", "upload"])?).multipart(form))
            .await?;
        Ok(response.document_id)
    }

    #[instrument(skip(self))]
    async fn search_documents(&self, query: &str, limit: usize) -> Result<Vec<Value>, TransportError> {
        let limit = limit.to_string();
        let response: SearchResponse = self
            .send(
                self.http
                    .get(self.endpoint(&["documents", "search"])?)
                    .query(&[("query", query), ("limit", limit.as_str())]),
            )
            .await?;
        Ok(response.results)
    }
}
