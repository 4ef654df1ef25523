//! Step specifications
//!
//! Ties a step type to its declared dependencies and outputs and enforces the
//! structural invariants at construction:
//! - logical names are unique within dependencies and within outputs
//! - the node type matches the declared shape (SOURCE produces only,
//!   SINK consumes only, INTERNAL does both, SINGULAR does neither)

use super::{DependencySpec, OutputSpec};
use crate::error::{CoreError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Position of a step in the pipeline graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Produces outputs, consumes nothing
    Source,
    /// Consumes and produces
    Internal,
    /// Consumes inputs, produces nothing
    Sink,
    /// Participates in no wiring at all
    Singular,
}

/// Declarative description of a step's logical inputs and outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpecification {
    /// Step type tag, e.g. "DataLoad" or "XgboostTraining"
    pub step_type: String,

    /// Position of this step in the graph
    pub node_type: NodeType,

    /// Declared input slots keyed by logical name
    pub dependencies: IndexMap<String, DependencySpec>,

    /// Declared output slots keyed by logical name
    pub outputs: IndexMap<String, OutputSpec>,
}

impl StepSpecification {
    /// Build and validate a specification
    pub fn new(
        step_type: impl Into<String>,
        node_type: NodeType,
        dependencies: Vec<DependencySpec>,
        outputs: Vec<OutputSpec>,
    ) -> Result<Self> {
        let step_type = step_type.into();

        let mut dep_map = IndexMap::with_capacity(dependencies.len());
        for dep in dependencies {
            if dep_map.contains_key(&dep.logical_name) {
                return Err(CoreError::InvalidSpecification(format!(
                    "step type '{}' declares duplicate dependency '{}'",
                    step_type, dep.logical_name
                )));
            }
            dep_map.insert(dep.logical_name.clone(), dep);
        }

        let mut out_map = IndexMap::with_capacity(outputs.len());
        for out in outputs {
            if out_map.contains_key(&out.logical_name) {
                return Err(CoreError::InvalidSpecification(format!(
                    "step type '{}' declares duplicate output '{}'",
                    step_type, out.logical_name
                )));
            }
            out_map.insert(out.logical_name.clone(), out);
        }

        let spec = Self {
            step_type,
            node_type,
            dependencies: dep_map,
            outputs: out_map,
        };
        spec.validate_shape()?;
        Ok(spec)
    }

    fn validate_shape(&self) -> Result<()> {
        let (has_deps, has_outs) = (!self.dependencies.is_empty(), !self.outputs.is_empty());
        let shape_error = |expected: &str| {
            Err(CoreError::InvalidSpecification(format!(
                "step type '{}' is declared {:?} but {}",
                self.step_type, self.node_type, expected
            )))
        };

        match self.node_type {
            NodeType::Source if has_deps => shape_error("declares dependencies"),
            NodeType::Source if !has_outs => shape_error("declares no outputs"),
            NodeType::Sink if has_outs => shape_error("declares outputs"),
            NodeType::Sink if !has_deps => shape_error("declares no dependencies"),
            NodeType::Internal if !has_deps || !has_outs => {
                shape_error("must declare both dependencies and outputs")
            }
            NodeType::Singular if has_deps || has_outs => {
                shape_error("declares dependencies or outputs")
            }
            _ => Ok(()),
        }
    }

    /// Look up a dependency by logical name
    pub fn dependency(&self, logical_name: &str) -> Option<&DependencySpec> {
        self.dependencies.get(logical_name)
    }

    /// Look up an output by logical name
    pub fn output(&self, logical_name: &str) -> Option<&OutputSpec> {
        self.outputs.get(logical_name)
    }

    /// Look up an output by logical name or any of its aliases
    pub fn output_by_name_or_alias(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs
            .get(name)
            .or_else(|| self.outputs.values().find(|out| out.answers_to(name)))
    }

    /// Iterate the dependencies that must be satisfied for this step to build
    pub fn required_dependencies(&self) -> impl Iterator<Item = &DependencySpec> {
        self.dependencies.values().filter(|dep| dep.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyPath;
    use crate::spec::DependencyType;

    fn make_dep(name: &str) -> DependencySpec {
        DependencySpec::new(name, DependencyType::ProcessingOutput)
    }

    fn make_out(name: &str) -> OutputSpec {
        OutputSpec::new(
            name,
            DependencyType::ProcessingOutput,
            PropertyPath::parse("properties.S3Uri").unwrap(),
        )
    }

    #[test]
    fn test_internal_spec() {
        let spec = StepSpecification::new(
            "Preprocess",
            NodeType::Internal,
            vec![make_dep("raw_data")],
            vec![make_out("processed_data")],
        )
        .unwrap();

        assert!(spec.dependency("raw_data").is_some());
        assert!(spec.output("processed_data").is_some());
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let result = StepSpecification::new(
            "Preprocess",
            NodeType::Internal,
            vec![make_dep("raw_data"), make_dep("raw_data")],
            vec![make_out("processed_data")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let result = StepSpecification::new(
            "Preprocess",
            NodeType::Internal,
            vec![make_dep("raw_data")],
            vec![make_out("processed_data"), make_out("processed_data")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_source_with_dependencies_rejected() {
        let result = StepSpecification::new(
            "DataLoad",
            NodeType::Source,
            vec![make_dep("raw_data")],
            vec![make_out("data")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sink_with_outputs_rejected() {
        let result = StepSpecification::new(
            "Register",
            NodeType::Sink,
            vec![make_dep("model")],
            vec![make_out("data")],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_singular_spec() {
        let spec = StepSpecification::new("Notify", NodeType::Singular, vec![], vec![]).unwrap();
        assert!(spec.dependencies.is_empty());
        assert!(spec.outputs.is_empty());
    }

    #[test]
    fn test_output_by_alias() {
        let out = make_out("processed_data").with_aliases(["data"]);
        let spec =
            StepSpecification::new("DataLoad", NodeType::Source, vec![], vec![out]).unwrap();

        assert!(spec.output_by_name_or_alias("data").is_some());
        assert!(spec.output_by_name_or_alias("processed_data").is_some());
        assert!(spec.output_by_name_or_alias("missing").is_none());
    }

    #[test]
    fn test_required_dependencies_filter() {
        let spec = StepSpecification::new(
            "Eval",
            NodeType::Sink,
            vec![make_dep("model"), make_dep("metrics").optional()],
            vec![],
        )
        .unwrap();

        let required: Vec<_> = spec.required_dependencies().collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].logical_name, "model");
    }
}
