//! Error types for Weaver Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// A specification violated a construction invariant
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    /// A property path string could not be parsed
    #[error("Invalid property path: {0}")]
    InvalidPropertyPath(String),

    /// An edge or lookup referenced a node the DAG does not contain
    #[error("Node not found in DAG: {0}")]
    NodeNotFound(String),

    /// Topological sort could not order the graph
    #[error("Cycle detected in DAG involving nodes: {0:?}")]
    CycleDetected(Vec<String>),

    /// A configuration value failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A registration key was already taken
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// A config variant has no step-type entry
    #[error("Unknown config type: {0}")]
    UnknownConfigType(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
