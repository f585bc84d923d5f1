//! `WorkflowSession`: one editable graph bound to a remote client.
//!
//! Edits are plain method calls on the store and never wait on the network.
//! A submission exports an immutable snapshot, then runs on the tokio runtime
//! while editing continues. The returned [`PendingSubmission`] carries the
//! store revision it was taken at, so the caller can tell whether the graph
//! has moved on and abandon the submission with [`PendingSubmission::cancel`].

use std::panic;
use std::sync::Arc;

use graph::{serialize, validate, GraphStore, ValidationError, ValidationResult, WorkflowDocument};
use tokio::task::JoinHandle;
use tracing::info;

use crate::models::{ExecutionResult, WorkflowId};
use crate::traits::RemoteWorkflowClient;
use crate::{TransportError, WorkflowError};

/// An in-flight submission.
///
/// Dropping it detaches the request; call [`cancel`](Self::cancel) to abandon it.
#[derive(Debug)]
pub struct PendingSubmission {
    revision: u64,
    handle: JoinHandle<Result<WorkflowId, TransportError>>,
}

impl PendingSubmission {
    /// Store revision the submitted snapshot was taken at.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Abandon the request. A later [`wait`](Self::wait) returns
    /// [`TransportError::Cancelled`] unless the request had already finished.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the service to answer.
    pub async fn wait(self) -> Result<WorkflowId, TransportError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(_) => Err(TransportError::Cancelled),
        }
    }
}

/// A single editing session.
pub struct WorkflowSession<C: ?Sized> {
    store: GraphStore,
    client: Arc<C>,
}

impl<C> WorkflowSession<C>
where
    C: RemoteWorkflowClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>) -> Self {
        Self::with_store(client, GraphStore::new())
    }

    pub fn with_store(client: Arc<C>, store: GraphStore) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Mutable access for edit operations.
    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn validate(&self) -> ValidationResult {
        validate(&self.store.snapshot())
    }

    /// Validate and serialize the current graph.
    pub fn export(&self) -> Result<WorkflowDocument, ValidationError> {
        serialize(&self.store.snapshot())
    }

    /// Export the current graph and start submitting it in the background.
    ///
    /// Must be called from within a tokio runtime. Validation problems are
    /// reported here, before anything is sent.
    pub fn submit(&self) -> Result<PendingSubmission, ValidationError> {
        let document = self.export()?;
        let revision = self.store.revision();
        let client = Arc::clone(&self.client);

        info!(revision, tasks = document.tasks.len(), "submitting workflow");
        let handle = tokio::spawn(async move { client.submit(&document).await });
        Ok(PendingSubmission { revision, handle })
    }

    /// Whether the graph has been edited since `pending` was started.
    pub fn is_stale(&self, pending: &PendingSubmission) -> bool {
        pending.revision != self.store.revision()
    }

    /// Submit the current graph and run it, waiting for both steps.
    pub async fn submit_and_execute(&self) -> Result<(WorkflowId, ExecutionResult), WorkflowError> {
        let pending = self.submit()?;
        let workflow_id = pending.wait().await?;
        let result = self.client.execute(&workflow_id).await?;
        info!(%workflow_id, "workflow executed");
        Ok((workflow_id, result))
    }
}
