//! `client` crate: the boundary to the remote workflow service.
//!
//! [`RemoteWorkflowClient`] and [`DocumentClient`] are the capabilities the
//! graph core depends on; [`HttpWorkflowClient`] implements both over HTTP.
//! [`WorkflowSession`] ties one editable graph to a client and hands out
//! cancellable submissions.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod models;
pub mod session;
pub mod traits;

pub use config::ClientConfig;
pub use error::{TransportError, WorkflowError};
pub use http::HttpWorkflowClient;
pub use models::{DocumentMetadata, ExecutionResult, TaskStatus, WorkflowId, WorkflowStatus};
pub use session::{PendingSubmission, WorkflowSession};
pub use traits::{DocumentClient, RemoteWorkflowClient};
