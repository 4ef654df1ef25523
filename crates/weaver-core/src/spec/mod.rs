//! Step specification definitions
//!
//! A specification declares a step's logical inputs (dependencies) and
//! outputs, independent of any configuration instance. Specifications are the
//! sole source of truth for dependency matching.

mod dependency;
mod output;
mod step_spec;

pub use dependency::{DependencySpec, DependencyType};
pub use output::OutputSpec;
pub use step_spec::{NodeType, StepSpecification};
