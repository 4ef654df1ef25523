//! Weaver Resolver - specification registry and dependency resolution
//!
//! This crate decides which upstream output satisfies which downstream input:
//! - [`SpecificationRegistry`] / [`RegistryManager`]: per-context stores of
//!   step specifications
//! - [`SemanticMatcher`]: scores a (dependency, output) pair for compatibility
//! - [`DependencyResolver`]: picks the best producer output per dependency,
//!   with memoization tied to the registry generation
//! - [`PropertyReference`]: lazy pointer into a producing step's runtime
//!   properties

pub mod error;
pub mod matcher;
pub mod property_reference;
pub mod registry;
pub mod resolver;

// Re-export main types
pub use error::{ResolutionError, Result};
pub use matcher::SemanticMatcher;
pub use property_reference::PropertyReference;
pub use registry::{PipelineComponents, RegistryManager, SpecificationRegistry};
pub use resolver::{DependencyResolver, ResolvedMatch, Resolution, ACCEPTANCE_THRESHOLD};
