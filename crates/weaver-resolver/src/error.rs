//! Resolver error types

use thiserror::Error;

/// Resolution error
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// A consumer declared required dependencies no producer satisfies
    #[error("Step '{step_name}' has unresolved required dependencies: {names:?}")]
    UnresolvedDependencies { step_name: String, names: Vec<String> },

    /// No specification is registered under the given step name
    #[error("No specification registered for step '{0}'")]
    SpecificationNotFound(String),

    /// A lazy property reference could not be resolved against its step
    #[error("Cannot resolve property '{property_path}' on step '{step_name}'")]
    PropertyResolution {
        step_name: String,
        property_path: String,
    },
}

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolutionError>;
