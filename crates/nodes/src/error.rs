//! Catalog-level error type.

use thiserror::Error;

/// Errors produced when interpreting agent kind strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KindError {
    /// The string is not one of the recognized agent kinds.
    #[error("unknown agent kind: '{0}'")]
    Unknown(String),
}
