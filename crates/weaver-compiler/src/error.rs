//! Compiler error types

use thiserror::Error;

/// Config resolution error
#[derive(Error, Debug)]
pub enum ConfigResolutionError {
    /// DAG nodes for which no configuration cleared the confidence floor
    #[error("No configuration resolved for DAG nodes: {0:?}")]
    UnresolvedNodes(Vec<String>),

    /// The supplied configuration collection is unusable
    #[error("Configuration catalog error: {0}")]
    Catalog(String),
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, ConfigResolutionError>;
