//! Error types for the service boundary.

use graph::{StructuralError, ValidationError};
use thiserror::Error;

/// Failures of the remote collaborator. Never produced by local graph logic.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service rejected the credential (401/403).
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success status.
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// A success status whose body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The client could not be built from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The submission was abandoned before it resolved.
    #[error("submission cancelled")]
    Cancelled,
}

/// Every way a build-and-submit round trip can fail, one variant per family:
/// the edit was rejected, the graph is not exportable, or the service failed.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
