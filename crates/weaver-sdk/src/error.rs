//! SDK error types

use thiserror::Error;

/// Top-level pipeline API error
#[derive(Error, Debug)]
pub enum PipelineApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Config catalog error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Node-to-config resolution error
    #[error("Resolution error: {0}")]
    Resolution(#[from] weaver_compiler::ConfigResolutionError),

    /// Dependency resolution error
    #[error("Dependency error: {0}")]
    Dependency(#[from] weaver_resolver::ResolutionError),

    /// Assembly error
    #[error("Assembly error: {0}")]
    Assembly(#[from] weaver_assembler::AssemblyError),

    /// Core data-model error
    #[error("Core error: {0}")]
    Core(#[from] weaver_core::CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any failure inside a compile entry point, with the cause preserved
    #[error("DAG compilation failed: {source}")]
    CompilationFailed {
        #[source]
        source: Box<PipelineApiError>,
    },
}

impl PipelineApiError {
    /// Wrap an internal failure as a compilation failure
    pub fn compilation(source: impl Into<PipelineApiError>) -> Self {
        Self::CompilationFailed {
            source: Box::new(source.into()),
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, PipelineApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compilation_wrapper_preserves_cause() {
        let inner = PipelineApiError::Configuration("bad field".to_string());
        let wrapped = PipelineApiError::compilation(inner);

        assert!(wrapped.to_string().contains("DAG compilation failed"));
        assert!(wrapped.to_string().contains("bad field"));
        assert!(std::error::Error::source(&wrapped).is_some());
    }

    #[test]
    fn test_core_error_conversion() {
        let core = weaver_core::CoreError::NodeNotFound("ghost".to_string());
        let api: PipelineApiError = core.into();
        assert!(api.to_string().contains("ghost"));
    }
}
