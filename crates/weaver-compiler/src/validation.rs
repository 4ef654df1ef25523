//! Validation and compilation reporting
//!
//! Structured result types for the façade's validation-oriented entry
//! points. These are informational objects, not errors: validation collects
//! everything it finds and never aborts early.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use weaver_core::{StepConfig, StepTypeMap};

/// Outcome of DAG-compatibility validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// True when nothing below is populated except warnings
    pub is_valid: bool,

    /// DAG nodes with no corresponding configuration
    pub missing_configs: Vec<String>,

    /// Config variants whose step type has no registered builder
    pub unresolvable_builders: Vec<String>,

    /// Named groups of configuration errors
    pub config_errors: IndexMap<String, Vec<String>>,

    /// Dependency wiring problems found during a dry resolution run
    pub dependency_issues: Vec<String>,

    /// Non-fatal findings
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A result with nothing to report
    pub fn success() -> Self {
        Self {
            is_valid: true,
            missing_configs: Vec::new(),
            unresolvable_builders: Vec::new(),
            config_errors: IndexMap::new(),
            dependency_issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A failed result carrying a single named error group
    pub fn failure(group: impl Into<String>, errors: Vec<String>) -> Self {
        let mut result = Self::success();
        result.is_valid = false;
        result.config_errors.insert(group.into(), errors);
        result
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        if self.is_valid {
            format!("valid ({} warnings)", self.warnings.len())
        } else {
            format!(
                "invalid: {} missing configs, {} unresolvable builders, {} config errors, {} dependency issues",
                self.missing_configs.len(),
                self.unresolvable_builders.len(),
                self.config_errors.values().map(Vec::len).sum::<usize>(),
                self.dependency_issues.len(),
            )
        }
    }
}

/// Preview of how DAG nodes would resolve, without building anything
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionPreview {
    /// Node name → resolved config variant ("UNRESOLVED" when none)
    pub node_config_map: IndexMap<String, String>,

    /// Config variant → builder step type
    pub config_builder_map: IndexMap<String, String>,

    /// Node name → top candidate confidence
    pub resolution_confidence: IndexMap<String, f64>,

    /// Nodes whose top candidates are too close to call
    pub ambiguous_resolutions: Vec<String>,

    /// Suggested caller actions (renames, missing configs)
    pub recommendations: Vec<String>,
}

/// Per-node details included in a conversion report
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionDetail {
    pub config_type: String,
    pub builder_type: String,
    pub confidence: f64,
}

/// Report produced alongside a compiled pipeline
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub pipeline_name: String,
    pub steps: Vec<String>,
    pub resolution_details: IndexMap<String, ResolutionDetail>,
    pub avg_confidence: f64,
    pub warnings: Vec<String>,
    pub metadata: IndexMap<String, serde_json::Value>,
    pub compiled_at: DateTime<Utc>,
}

impl ConversionReport {
    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "pipeline '{}': {} steps, avg confidence {:.2}, {} warnings",
            self.pipeline_name,
            self.steps.len(),
            self.avg_confidence,
            self.warnings.len(),
        )
    }
}

/// Runs the static compatibility checks behind `validate_dag_compatibility`
#[derive(Debug, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Check that every node has a config and every config a builder
    ///
    /// `registered_step_types` lists the builder registry contents; the
    /// resolved `config_map` is keyed by node name.
    pub fn validate_dag_compatibility(
        &self,
        dag_nodes: &[String],
        config_map: &IndexMap<String, Arc<dyn StepConfig>>,
        step_types: &StepTypeMap,
        registered_step_types: &[String],
    ) -> ValidationResult {
        let mut result = ValidationResult::success();

        for node in dag_nodes {
            match config_map.get(node) {
                None => result.missing_configs.push(node.clone()),
                Some(config) => match step_types.step_type_for(config.config_type()) {
                    Ok(step_type) => {
                        if !registered_step_types.iter().any(|t| t == step_type) {
                            result.unresolvable_builders.push(config.config_type().to_string());
                        }
                    }
                    Err(_) => {
                        result.unresolvable_builders.push(config.config_type().to_string());
                    }
                },
            }
        }

        result.is_valid =
            result.missing_configs.is_empty() && result.unresolvable_builders.is_empty();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct FakeConfig(&'static str);

    impl StepConfig for FakeConfig {
        fn config_type(&self) -> &str {
            self.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn config_map(entries: Vec<(&str, &'static str)>) -> IndexMap<String, Arc<dyn StepConfig>> {
        entries
            .into_iter()
            .map(|(node, config_type)| {
                let config: Arc<dyn StepConfig> = Arc::new(FakeConfig(config_type));
                (node.to_string(), config)
            })
            .collect()
    }

    #[test]
    fn test_all_resolvable_is_valid() {
        let mut step_types = StepTypeMap::new();
        step_types.register("DataLoadConfig", "DataLoad").unwrap();

        let engine = ValidationEngine::new();
        let result = engine.validate_dag_compatibility(
            &["load".to_string()],
            &config_map(vec![("load", "DataLoadConfig")]),
            &step_types,
            &["DataLoad".to_string()],
        );

        assert!(result.is_valid);
        assert_eq!(result.summary(), "valid (0 warnings)");
    }

    #[test]
    fn test_missing_config_reported() {
        let engine = ValidationEngine::new();
        let result = engine.validate_dag_compatibility(
            &["load".to_string(), "train".to_string()],
            &config_map(vec![("load", "DataLoadConfig")]),
            &StepTypeMap::new(),
            &[],
        );

        assert!(!result.is_valid);
        assert_eq!(result.missing_configs, vec!["train"]);
        // "load" resolves to no step type either
        assert_eq!(result.unresolvable_builders, vec!["DataLoadConfig"]);
    }

    #[test]
    fn test_builder_not_registered_reported() {
        let mut step_types = StepTypeMap::new();
        step_types.register("DataLoadConfig", "DataLoad").unwrap();

        let engine = ValidationEngine::new();
        let result = engine.validate_dag_compatibility(
            &["load".to_string()],
            &config_map(vec![("load", "DataLoadConfig")]),
            &step_types,
            &["Training".to_string()],
        );

        assert!(!result.is_valid);
        assert_eq!(result.unresolvable_builders, vec!["DataLoadConfig"]);
    }

    #[test]
    fn test_failure_constructor() {
        let result = ValidationResult::failure("resolution", vec!["boom".to_string()]);
        assert!(!result.is_valid);
        assert!(result.summary().contains("1 config errors"));
    }
}
