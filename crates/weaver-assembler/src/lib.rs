//! Weaver Assembler - builds executable pipelines from a DAG and builders
//!
//! This crate owns the step-instantiation side of compilation:
//! - the collaborator contracts the orchestration SDK plugs into
//!   ([`StepBuilder`], [`StepHandle`], [`ExecutablePipeline`])
//! - the [`BuilderRegistry`] mapping config variants to builder factories
//! - the [`PipelineAssembler`] state machine that wires and instantiates
//!   steps in topological order

pub mod assembler;
pub mod builder_registry;
pub mod contract;
pub mod error;

// Re-export main types
pub use assembler::{AssemblyOutput, AssemblyState, MessageMatch, PipelineAssembler};
pub use builder_registry::BuilderRegistry;
pub use contract::{
    BuilderContext, ExecutablePipeline, SessionContext, StepBuilder, StepBuilderError, StepHandle,
    StepInput, StepRequirements,
};
pub use error::{AssemblyError, Result};
