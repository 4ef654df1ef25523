//! Weaver Core - Core types and definitions for the Weaver pipeline compiler
//!
//! This crate provides the fundamental types used across the Weaver workspace:
//! - Step specifications (declared inputs and outputs) that drive matching
//! - The pipeline DAG and its topological ordering
//! - Typed property paths into opaque step objects
//! - Configuration contracts and the config-to-step-type mapping
//! - Error types

pub mod config;
pub mod dag;
pub mod error;
pub mod property;
pub mod spec;
pub mod step_types;

// Re-export commonly used types
pub use config::{BaseConfig, BaseConfigBuilder, StepConfig};
pub use dag::PipelineDag;
pub use error::{CoreError, Result};
pub use property::{PathSegment, PropertyBag, PropertyPath};
pub use spec::{DependencySpec, DependencyType, NodeType, OutputSpec, StepSpecification};
pub use step_types::StepTypeMap;
