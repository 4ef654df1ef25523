//! Lazy property references
//!
//! A [`PropertyReference`] points at a value that will only exist once the
//! producing step has been instantiated by the orchestration service. It is
//! created per resolved edge during assembly and resolved against the
//! producer's property bag just before the consuming step is built; it never
//! outlives the assembly.

use crate::error::{ResolutionError, Result};
use serde_json::Value;
use std::fmt;
use weaver_core::{OutputSpec, PropertyBag};

/// Lazy pointer to a producing step's runtime output value
#[derive(Debug, Clone)]
pub struct PropertyReference {
    /// Name of the producing step
    pub step_name: String,
    /// The output whose property path is traversed
    pub output_spec: OutputSpec,
}

impl PropertyReference {
    pub fn new(step_name: impl Into<String>, output_spec: OutputSpec) -> Self {
        Self {
            step_name: step_name.into(),
            output_spec,
        }
    }

    /// Resolve into the concrete runtime accessor exposed by the step
    pub fn resolve(&self, step: &dyn PropertyBag) -> Result<Value> {
        let root = step.property_root().ok_or_else(|| self.unresolved())?;
        self.output_spec
            .property_path
            .resolve(&root)
            .cloned()
            .ok_or_else(|| self.unresolved())
    }

    fn unresolved(&self) -> ResolutionError {
        ResolutionError::PropertyResolution {
            step_name: self.step_name.clone(),
            property_path: self.output_spec.property_path.to_string(),
        }
    }
}

impl fmt::Display for PropertyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.step_name, self.output_spec.property_path)
    }
}
