//! Collaborator contracts
//!
//! The assembler never touches the orchestration SDK directly; it talks to
//! these traits. A step builder turns one configuration into one executable
//! step; a step handle is the opaque object the SDK returns, exposing only a
//! name, a dependency-attachment operation, and a runtime property tree.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use weaver_core::{PropertyBag, StepConfig, StepSpecification};
use weaver_resolver::{DependencyResolver, SpecificationRegistry};

/// Error raised inside a step builder
#[derive(Error, Debug)]
pub enum StepBuilderError {
    /// The configuration is invalid for this builder
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The step object could not be created
    #[error("Step creation failed: {0}")]
    Creation(String),
}

/// Opaque session handle passed through to builders
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    name: String,
    settings: IndexMap<String, String>,
}

impl SessionContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}

/// Everything a builder factory receives for one node
pub struct BuilderContext {
    /// The configuration resolved for this node
    pub config: Arc<dyn StepConfig>,
    /// Orchestration session handle
    pub session: Arc<SessionContext>,
    /// Execution role identifier
    pub role: Option<String>,
    /// Specification registry for the active context
    pub registry: Arc<SpecificationRegistry>,
    /// Dependency resolver for the active context
    pub resolver: Arc<DependencyResolver>,
}

/// A resolved input handed to a step builder
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Lazily resolved accessor into a producing step's runtime properties
    Reference { source_step: String, value: Value },
    /// Literal location string (generated path or degradation placeholder)
    Location(String),
}

/// Assembled inputs/outputs for one step-creation call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepRequirements {
    /// Resolved input values keyed by dependency logical name
    pub inputs: IndexMap<String, StepInput>,
    /// Output locations keyed by output logical name
    pub outputs: IndexMap<String, String>,
    /// Names of DAG-predecessor steps already instantiated
    pub dependencies: Vec<String>,
    /// Whether the orchestration service may cache this step
    pub enable_caching: bool,
}

/// Opaque executable step object produced by a builder
pub trait StepHandle: PropertyBag + Send + Sync {
    /// Step name as known to the orchestration service
    fn name(&self) -> &str;

    /// Attach an explicit ordering dependency on an upstream step
    fn add_dependency(&mut self, upstream: &str);
}

/// Contract every step builder implements
pub trait StepBuilder: Send + Sync {
    /// Step type this builder produces
    fn step_type(&self) -> &str;

    /// Declared specification, when the builder carries one
    fn specification(&self) -> Option<&StepSpecification> {
        None
    }

    /// Check the configuration before any step is created
    fn validate_configuration(&self) -> std::result::Result<(), StepBuilderError>;

    /// Create the executable step from assembled requirements
    fn create_step(
        &mut self,
        requirements: StepRequirements,
    ) -> std::result::Result<Box<dyn StepHandle>, StepBuilderError>;

    /// Auxiliary payload to surface to the caller after assembly
    fn execution_payload(&self) -> Option<Value> {
        None
    }
}

/// The orchestration-service pipeline object
///
/// Construction is delegated to the external SDK and treated as infallible
/// from the core's perspective.
pub struct ExecutablePipeline {
    name: String,
    steps: Vec<Box<dyn StepHandle>>,
}

impl ExecutablePipeline {
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn StepHandle>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names must be globally unique in the target service; the compiler
    /// overrides them after assembly
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Steps in build order
    pub fn steps(&self) -> &[Box<dyn StepHandle>] {
        &self.steps
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for ExecutablePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutablePipeline")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}
