//! Assembler error types

use crate::contract::StepBuilderError;
use thiserror::Error;
use weaver_core::CoreError;

/// Assembly error
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// DAG nodes with no corresponding configuration
    #[error("Missing configs for nodes: {0:?}")]
    MissingConfigs(Vec<String>),

    /// A config variant has no step-type entry, so no builder can be found
    #[error("Config variant '{0}' has no registered step type")]
    UnknownConfigVariant(String),

    /// An edge references a node the DAG does not contain
    #[error("Edge references node not in DAG: {0}")]
    DanglingEdge(String),

    /// Builder construction failed for one node
    #[error("Failed to initialize step builder for '{step_name}'")]
    BuilderInit {
        step_name: String,
        #[source]
        source: StepBuilderError,
    },

    /// Required dependencies that found no producer ("step.dependency" pairs)
    #[error("Unresolved required dependencies: {0:?}")]
    UnresolvedDependencies(Vec<String>),

    /// Step creation failed for one node
    #[error("Failed to build step '{step_name}'")]
    StepBuild {
        step_name: String,
        #[source]
        source: StepBuilderError,
    },

    /// The DAG could not be ordered (cycle or dangling edge)
    #[error("Failed to determine build order")]
    BuildOrder {
        #[from]
        source: CoreError,
    },
}

/// Result type for assembly operations
pub type Result<T> = std::result::Result<T, AssemblyError>;
