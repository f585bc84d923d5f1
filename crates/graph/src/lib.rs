//! `graph` crate: the in-memory workflow graph, its validation, and its
//! projection into the document accepted by the remote executor.
//!
//! Edit events flow through [`GraphStore`]; [`validate`] and [`serialize`]
//! operate on an owned [`Graph`] snapshot and never touch the store.

pub mod dag;
pub mod document;
pub mod error;
pub mod models;
pub mod serializer;
pub mod store;

pub use dag::{topological_order, validate, ValidationResult};
pub use document::{Dependency, Task, WorkflowDocument};
pub use error::{Reason, StructuralError, ValidationError};
pub use models::{Config, Edge, Graph, Node, Position};
pub use serializer::serialize;
pub use store::{Connection, GraphStore};
