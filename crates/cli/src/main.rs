//! `reasonflow` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate`: check a workflow file and list every problem.
//! - `export`: print the canonical document for a workflow file.
//! - `submit`: submit a workflow file, optionally running it.
//! - `execute`: run a previously submitted workflow.
//! - `status`: show the status of a submitted workflow.
//! - `workflows`: list workflows known to the service.
//! - `agent`: register a standalone agent.
//! - `agents`: list registered agents.
//! - `tasks`: list tasks or show one task's status.
//! - `docs`: upload or search documents.

mod load;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client::{
    ClientConfig, DocumentClient, DocumentMetadata, HttpWorkflowClient, RemoteWorkflowClient,
    WorkflowId, WorkflowSession,
};
use graph::{serialize, topological_order, validate, GraphStore, ValidationResult};
use nodes::{AgentConfig, AgentKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "reasonflow",
    about = "Build, validate and submit agent workflows",
    version
)]
struct Cli {
    #[command(flatten)]
    remote: RemoteArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct RemoteArgs {
    /// Root URL of the workflow service.
    #[arg(long, global = true, env = "REASONFLOW_BASE_URL", default_value = client::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Bearer credential sent on every request.
    #[arg(long, global = true, env = "REASONFLOW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,
}

impl RemoteArgs {
    fn client(&self) -> Result<HttpWorkflowClient> {
        let mut config = ClientConfig::new(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        Ok(HttpWorkflowClient::new(&config)?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow file.
    Validate {
        /// Path to the workflow file (.json, .yaml or .yml).
        path: PathBuf,
        /// Print the problems as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical workflow document.
    Export {
        path: PathBuf,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Submit a workflow file to the service.
    Submit {
        path: PathBuf,
        /// Run the workflow once it has been accepted.
        #[arg(long)]
        execute: bool,
    },
    /// Run a submitted workflow.
    Execute { workflow_id: String },
    /// Show the status of a submitted workflow.
    Status { workflow_id: String },
    /// List workflows known to the service.
    Workflows,
    /// Register a standalone agent.
    Agent {
        /// One of: llm, data_retrieval, custom_task, api_connector.
        #[arg(long = "type")]
        kind: AgentKind,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Agent settings as a JSON object.
        #[arg(long, default_value = "{}")]
        config: String,
    },
    /// List registered agents.
    Agents,
    /// List tasks or show the status of one.
    #[command(subcommand)]
    Tasks(TasksCommand),
    /// Upload or search documents.
    #[command(subcommand)]
    Docs(DocsCommand),
}

#[derive(Subcommand)]
enum TasksCommand {
    /// List tasks queued or running on the service.
    List,
    /// Show the status of a single task.
    Status { task_id: String },
}

#[derive(Subcommand)]
enum DocsCommand {
    /// Upload a file with metadata.
    Upload {
        path: PathBuf,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// May be given more than once.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Search uploaded documents.
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path, json } => {
            let graph = load::read_graph(&path)?;
            let result = validate(&graph);
            if json {
                println!("{}", serde_json::to_string_pretty(result.reasons())?);
                if !result.is_valid() {
                    std::process::exit(1);
                }
                return Ok(());
            }
            match result {
                ValidationResult::Valid => {
                    let order = topological_order(&graph).unwrap_or_default();
                    println!("✅ Workflow is valid. Execution order: {order:?}");
                }
                ValidationResult::Invalid(reasons) => {
                    eprintln!("❌ Validation failed ({} problem(s)):", reasons.len());
                    for reason in &reasons {
                        eprintln!("  - {reason}");
                    }
                    std::process::exit(1);
                }
            }
        }
        Command::Export { path, output } => {
            let graph = load::read_graph(&path)?;
            let document = serialize(&graph)?;
            let json = serde_json::to_string_pretty(&document)?;
            match output {
                Some(target) => {
                    std::fs::write(&target, json + "\n")
                        .with_context(|| format!("cannot write {}", target.display()))?;
                    info!("document written to {}", target.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Submit { path, execute } => {
            let graph = load::read_graph(&path)?;
            // Report every problem before the store rejects the first one.
            validate(&graph).into_result()?;
            let store = GraphStore::from_graph(&graph)?;
            let session = WorkflowSession::with_store(Arc::new(cli.remote.client()?), store);

            if execute {
                let (workflow_id, result) = session.submit_and_execute().await?;
                println!("workflow_id: {workflow_id}");
                println!("{}", serde_json::to_string_pretty(&result.output)?);
            } else {
                let workflow_id = session.submit()?.wait().await?;
                println!("{workflow_id}");
            }
        }
        Command::Execute { workflow_id } => {
            let result = cli.remote.client()?.execute(&WorkflowId::new(workflow_id)).await?;
            println!("{}", serde_json::to_string_pretty(&result.output)?);
        }
        Command::Status { workflow_id } => {
            let status = cli.remote.client()?.status(&WorkflowId::new(workflow_id)).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Workflows => {
            let workflows = cli.remote.client()?.list_workflows().await?;
            println!("{}", serde_json::to_string_pretty(&workflows)?);
        }
        Command::Agents => {
            let agents = cli.remote.client()?.list_agents().await?;
            println!("{}", serde_json::to_string_pretty(&agents)?);
        }
        Command::Tasks(TasksCommand::List) => {
            let tasks = cli.remote.client()?.list_tasks().await?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        Command::Tasks(TasksCommand::Status { task_id }) => {
            let status = cli.remote.client()?.task_status(&task_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Agent { kind, name, description, config } => {
            let config: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&config).context("--config must be a JSON object")?;
            let agent = AgentConfig { kind, name, description, config };
            let agent_id = cli.remote.client()?.create_agent(&agent).await?;
            println!("{agent_id}");
        }
        Command::Docs(DocsCommand::Upload { path, title, description, tags }) => {
            let contents = tokio::fs::read(&path)
                .await
                .with_context(|| format!("cannot read file {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let metadata = DocumentMetadata { title, description, tags, filename };
            let document_id = cli.remote.client()?.upload_document(contents, &metadata).await?;
            println!("{document_id}");
        }
        Command::Docs(DocsCommand::Search { query, limit }) => {
            let results = cli.remote.client()?.search_documents(&query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
