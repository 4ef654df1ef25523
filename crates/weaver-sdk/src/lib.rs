//! Weaver SDK - High-level API for compiling DAGs into executable pipelines
//!
//! The façade over the whole workspace: load a config catalog, point a
//! [`DagCompiler`] at a [`PipelineDag`], and compile, validate or preview.
//!
//! ```rust,ignore
//! use weaver_sdk::{compile_dag_to_pipeline, ConfigCatalog, DagCompiler};
//!
//! let catalog = ConfigCatalog::from_yaml_file("configs/pipeline.yaml", &config_types)?;
//! let compiler = DagCompiler::new(catalog, builder_registry, session);
//!
//! let report = compiler.validate_dag_compatibility(&dag);
//! if report.is_valid {
//!     let output = compiler.compile(&dag, None)?;
//!     println!("compiled {}", output.pipeline.name());
//! }
//! ```

pub mod catalog;
pub mod dag_compiler;
pub mod error;
pub mod template;

// Re-export main types
pub use catalog::{CatalogMetadata, ConfigCatalog, ConfigTypeRegistry};
pub use dag_compiler::{compile_dag_to_pipeline, CatalogValidation, DagCompiler};
pub use error::{PipelineApiError, Result};
pub use template::PipelineTemplate;

// Re-export commonly used types from the workspace
pub use weaver_assembler::{
    AssemblyOutput, BuilderRegistry, ExecutablePipeline, SessionContext, StepBuilder,
    StepBuilderError, StepHandle, StepInput, StepRequirements,
};
pub use weaver_compiler::{ConversionReport, ResolutionPreview, ValidationResult};
pub use weaver_core::{
    BaseConfig, DependencySpec, DependencyType, NodeType, OutputSpec, PipelineDag, PropertyPath,
    StepConfig, StepSpecification,
};
