//! HTTP client tests against a local wiremock server.

use client::{
    ClientConfig, DocumentClient, DocumentMetadata, HttpWorkflowClient, RemoteWorkflowClient,
    TransportError, WorkflowId,
};
use graph::{serialize, Edge, Graph, Node};
use nodes::{AgentConfig, AgentKind};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPERS
// =============================================================================

fn client_for(server: &MockServer) -> HttpWorkflowClient {
    let config = ClientConfig::new(server.uri()).with_api_key("test-key");
    HttpWorkflowClient::new(&config).expect("client builds")
}

fn sample_document() -> graph::WorkflowDocument {
    let graph = Graph::new(
        vec![Node::new("A", "llm"), Node::new("B", "custom_task")],
        vec![Edge::new("A", "B")],
    );
    serialize(&graph).expect("valid graph")
}

// =============================================================================
// WORKFLOWS
// =============================================================================

#[tokio::test]
async fn submit_posts_document_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "tasks": {
                "A": { "type": "llm", "config": {} },
                "B": { "type": "custom_task", "config": {} }
            },
            "dependencies": [ { "from": "A", "to": "B" } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workflow_id": "wf-42" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server).submit(&sample_document()).await.unwrap();
    assert_eq!(id, WorkflowId::new("wf-42"));
}

#[tokio::test]
async fn execute_returns_service_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows/wf-42/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "A": { "status": "success", "output": "hello" }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .execute(&WorkflowId::new("wf-42"))
        .await
        .unwrap();
    assert_eq!(result.workflow_id, WorkflowId::new("wf-42"));
    assert_eq!(result.output["A"]["status"], "success");
}

#[tokio::test]
async fn status_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflows/wf-42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_id": "wf-42",
            "status": "running",
            "created_at": null,
            "results": null
        })))
        .mount(&server)
        .await;

    let status = client_for(&server).status(&WorkflowId::new("wf-42")).await.unwrap();
    assert_eq!(status.status, "running");
    assert!(status.results.is_none());
}

#[tokio::test]
async fn workflow_id_cannot_escape_its_path_segment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows/other"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hit": "wrong route" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&WorkflowId::new("other?x="))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Service { status: 404, .. }));
}

#[tokio::test]
async fn odd_workflow_id_reaches_its_own_route() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflows/a%2Fb%3Fc/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_id": "a/b?c",
            "status": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client_for(&server).status(&WorkflowId::new("a/b?c")).await.unwrap();
    assert_eq!(status.workflow_id, WorkflowId::new("a/b?c"));
}

#[tokio::test]
async fn workflows_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflows"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflows": [
                { "workflow_id": "wf-1", "status": "completed" },
                { "workflow_id": "wf-2", "status": "created" }
            ]
        })))
        .mount(&server)
        .await;

    let workflows = client_for(&server).list_workflows().await.unwrap();
    assert_eq!(workflows.len(), 2);
    assert_eq!(workflows[1]["status"], "created");
}

// =============================================================================
// TASKS
// =============================================================================

#[tokio::test]
async fn tasks_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [ { "task_id": "A" }, { "task_id": "B" } ]
        })))
        .mount(&server)
        .await;

    let tasks = client_for(&server).list_tasks().await.unwrap();
    let ids: Vec<&str> = tasks.iter().filter_map(|t| t["task_id"].as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
}

#[tokio::test]
async fn task_status_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/summarize/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task_id": "summarize",
            "status": "running"
        })))
        .mount(&server)
        .await;

    let status = client_for(&server).task_status("summarize").await.unwrap();
    assert_eq!(status.task_id, "summarize");
    assert_eq!(status.status, "running");
}

#[tokio::test]
async fn unknown_task_is_a_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/ghost/status"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Task not found" })))
        .mount(&server)
        .await;

    let err = client_for(&server).task_status("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Service { status: 404, ref message } if message == "Task not found"
    ));
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

#[tokio::test]
async fn rejected_credential_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid API key" })))
        .mount(&server)
        .await;

    let err = client_for(&server).submit(&sample_document()).await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Unauthorized { status: 401, ref message } if message == "invalid API key"
    ));
}

#[tokio::test]
async fn server_error_keeps_detail_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "Failed to create workflow" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).submit(&sample_document()).await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Service { status: 500, ref message } if message == "Failed to create workflow"
    ));
}

#[tokio::test]
async fn success_without_workflow_id_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "wf-1" })))
        .mount(&server)
        .await;

    let err = client_for(&server).submit(&sample_document()).await.unwrap_err();
    assert!(matches!(err, TransportError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Nothing listens on port 1.
    let client = HttpWorkflowClient::new(&ClientConfig::new("http://127.0.0.1:1")).unwrap();

    let err = client.submit(&sample_document()).await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

// =============================================================================
// AGENTS AND DOCUMENTS
// =============================================================================

#[tokio::test]
async fn numeric_agent_id_is_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agents"))
        .and(body_json(json!({
            "type": "llm",
            "name": "summarizer",
            "description": "",
            "config": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "agent_id": 140234 })))
        .mount(&server)
        .await;

    let agent = AgentConfig::new(AgentKind::Llm, "summarizer");
    let id = client_for(&server).create_agent(&agent).await.unwrap();
    assert_eq!(id, "140234");
}

#[tokio::test]
async fn agents_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agents": [ { "type": "llm", "name": "summarizer" } ]
        })))
        .mount(&server)
        .await;

    let agents = client_for(&server).list_agents().await.unwrap();
    assert_eq!(agents, vec![json!({ "type": "llm", "name": "summarizer" })]);
}

#[tokio::test]
async fn upload_returns_document_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/upload"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "document_id": "doc-7" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut metadata = DocumentMetadata::new("notes.txt");
    metadata.title = "Notes".into();
    metadata.tags = vec!["research".into()];

    let id = client_for(&server)
        .upload_document(b"hello".to_vec(), &metadata)
        .await
        .unwrap();
    assert_eq!(id, "doc-7");
}

#[tokio::test]
async fn search_keeps_service_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents/search"))
        .and(query_param("query", "transformers"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ { "id": "doc-2" }, { "id": "doc-1" } ]
        })))
        .mount(&server)
        .await;

    let results = client_for(&server)
        .search_documents("transformers", 2)
        .await
        .unwrap();
    let ids: Vec<&str> = results.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["doc-2", "doc-1"]);
}
