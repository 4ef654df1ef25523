//! DAG compiler façade
//!
//! The main API for turning a [`PipelineDag`] plus a config catalog into an
//! executable pipeline. Validation-oriented entry points
//! (`validate_dag_compatibility`, `preview_resolution`) never let internal
//! errors escape; they convert everything into structured results.
//! Compilation-oriented entry points (`compile`, `compile_with_report`) wrap
//! any internal failure into [`PipelineApiError::CompilationFailed`] with the
//! causal chain preserved.

use crate::catalog::ConfigCatalog;
use crate::error::{PipelineApiError, Result};
use crate::template::PipelineTemplate;
use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use weaver_assembler::{AssemblyOutput, BuilderRegistry, PipelineAssembler, SessionContext};
use weaver_compiler::{
    generate_pipeline_name, ConfigResolutionError, ConfigResolver, ConversionReport,
    ResolutionDetail, ResolutionPreview, ValidationEngine, ValidationResult, AMBIGUITY_MARGIN,
};
use weaver_core::PipelineDag;

/// Confidence below which a resolution is worth a recommendation
const LOW_CONFIDENCE: f64 = 0.8;

/// Structural summary of a loaded catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogValidation {
    pub valid: bool,
    pub config_count: usize,
    pub config_types: Vec<String>,
    pub config_names: Vec<String>,
    pub errors: Vec<String>,
}

/// Compiles pipeline DAGs against one catalog and builder registry
pub struct DagCompiler {
    catalog: ConfigCatalog,
    config_resolver: ConfigResolver,
    builder_registry: Arc<BuilderRegistry>,
    validation_engine: ValidationEngine,
    session: Arc<SessionContext>,
    role: Option<String>,
}

impl DagCompiler {
    /// Create a compiler over a catalog and builder registry
    ///
    /// The config resolver is seeded with the registry's config-to-step-type
    /// map so node names can be matched against step types too.
    pub fn new(
        catalog: ConfigCatalog,
        builder_registry: Arc<BuilderRegistry>,
        session: SessionContext,
    ) -> Self {
        let config_resolver = ConfigResolver::with_step_types(builder_registry.step_types().clone());
        Self {
            catalog,
            config_resolver,
            builder_registry,
            validation_engine: ValidationEngine::new(),
            session: Arc::new(session),
            role: None,
        }
    }

    /// Set the execution role passed through to builders
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Step types with a registered builder
    pub fn supported_step_types(&self) -> Vec<String> {
        self.builder_registry.supported_step_types()
    }

    /// Create a template for inspection before pipeline generation
    pub fn create_template(&self, dag: &PipelineDag) -> Result<PipelineTemplate> {
        if dag.is_empty() {
            return Err(PipelineApiError::Configuration(
                "DAG must contain at least one node".to_string(),
            ));
        }
        dag.validate()?;

        Ok(PipelineTemplate::new(
            dag.clone(),
            self.catalog.configs().clone(),
            self.catalog.metadata().cloned(),
            self.config_resolver.clone(),
            self.builder_registry.clone(),
            self.session.clone(),
            self.role.clone(),
        ))
    }

    /// Validate that DAG nodes resolve to configs, builders and dependencies
    ///
    /// Never raises: every failure mode is converted into the structured
    /// result, including internal errors.
    pub fn validate_dag_compatibility(&self, dag: &PipelineDag) -> ValidationResult {
        tracing::info!(nodes = dag.node_count(), "validating DAG compatibility");

        let template = match self.create_template(dag) {
            Ok(template) => template,
            Err(e) => return ValidationResult::failure("template", vec![e.to_string()]),
        };

        let config_map = match template.resolve_config_map() {
            Ok(map) => map,
            Err(ConfigResolutionError::UnresolvedNodes(nodes)) => {
                let mut result = ValidationResult::success();
                result.is_valid = false;
                result.missing_configs = nodes;
                return result;
            }
            Err(e) => return ValidationResult::failure("resolution", vec![e.to_string()]),
        };

        let dag_nodes: Vec<String> = dag.nodes().map(str::to_string).collect();
        let mut result = self.validation_engine.validate_dag_compatibility(
            &dag_nodes,
            &config_map,
            self.builder_registry.step_types(),
            &self.builder_registry.supported_step_types(),
        );

        // Dry-run the wiring for dependency issues; builder construction
        // failures are validation findings here, not aborts
        if result.is_valid {
            match PipelineAssembler::new(
                dag.clone(),
                config_map,
                self.builder_registry.clone(),
                self.session.clone(),
                self.role.clone(),
                None,
                None,
            ) {
                Ok(mut assembler) => {
                    result.dependency_issues = assembler.check_wiring();
                    if !result.dependency_issues.is_empty() {
                        result.is_valid = false;
                    }
                }
                Err(e) => {
                    result.is_valid = false;
                    result
                        .config_errors
                        .insert("assembly".to_string(), vec![e.to_string()]);
                }
            }
        }

        tracing::info!(summary = %result.summary(), "validation completed");
        result
    }

    /// Preview how DAG nodes would resolve, without committing to a build
    pub fn preview_resolution(&self, dag: &PipelineDag) -> ResolutionPreview {
        tracing::info!(nodes = dag.node_count(), "previewing resolution");

        let mut preview = ResolutionPreview {
            node_config_map: IndexMap::new(),
            config_builder_map: IndexMap::new(),
            resolution_confidence: IndexMap::new(),
            ambiguous_resolutions: Vec::new(),
            recommendations: Vec::new(),
        };

        let dag_nodes: Vec<String> = dag.nodes().map(str::to_string).collect();
        let candidates_by_node = self
            .config_resolver
            .preview_resolution(&dag_nodes, self.catalog.configs());

        for (node, candidates) in candidates_by_node {
            match candidates.first() {
                Some(best) => {
                    preview
                        .node_config_map
                        .insert(node.clone(), best.config_type.clone());
                    preview
                        .resolution_confidence
                        .insert(node.clone(), best.confidence);

                    let builder_type = self
                        .builder_registry
                        .step_type_for(&best.config_type)
                        .map(str::to_string)
                        .unwrap_or_else(|_| "UNKNOWN".to_string());
                    preview
                        .config_builder_map
                        .insert(best.config_type.clone(), builder_type);

                    if let Some(runner_up) = candidates.get(1) {
                        if (best.confidence - runner_up.confidence).abs() < AMBIGUITY_MARGIN {
                            preview.ambiguous_resolutions.push(format!(
                                "{} has {} similar candidates",
                                node,
                                candidates.len()
                            ));
                        }
                    }
                    if best.confidence < LOW_CONFIDENCE {
                        preview.recommendations.push(format!(
                            "Consider renaming '{}' for better matching",
                            node
                        ));
                    }
                }
                None => {
                    preview
                        .node_config_map
                        .insert(node.clone(), "UNRESOLVED".to_string());
                    preview.resolution_confidence.insert(node.clone(), 0.0);
                    preview
                        .recommendations
                        .push(format!("Add configuration for node '{}'", node));
                }
            }
        }

        preview
    }

    /// Compile a DAG into an executable pipeline
    ///
    /// The pipeline is named with `pipeline_name` verbatim when supplied,
    /// otherwise with a generated unique name.
    pub fn compile(
        &self,
        dag: &PipelineDag,
        pipeline_name: Option<&str>,
    ) -> Result<AssemblyOutput> {
        self.compile_inner(dag, pipeline_name)
            .map_err(PipelineApiError::compilation)
    }

    fn compile_inner(
        &self,
        dag: &PipelineDag,
        pipeline_name: Option<&str>,
    ) -> Result<AssemblyOutput> {
        tracing::info!(nodes = dag.node_count(), "compiling DAG to pipeline");

        let template = self.create_template(dag)?;
        let name = match pipeline_name {
            Some(name) => name.to_string(),
            None => generate_pipeline_name(&template.base_name(), &template.version()),
        };

        let output = template.generate_pipeline(&name)?;
        tracing::info!(pipeline = %output.pipeline.name(), "successfully compiled DAG to pipeline");
        Ok(output)
    }

    /// Compile and return a detailed conversion report alongside the pipeline
    pub fn compile_with_report(
        &self,
        dag: &PipelineDag,
        pipeline_name: Option<&str>,
    ) -> Result<(AssemblyOutput, ConversionReport)> {
        let output = self.compile(dag, pipeline_name)?;
        let preview = self.preview_resolution(dag);

        let dag_nodes: Vec<String> = dag.nodes().map(str::to_string).collect();
        let mut resolution_details = IndexMap::new();
        let mut warnings = Vec::new();
        let mut total_confidence = 0.0;

        for node in &dag_nodes {
            let config_type = preview
                .node_config_map
                .get(node)
                .cloned()
                .unwrap_or_else(|| "UNRESOLVED".to_string());
            let confidence = preview.resolution_confidence.get(node).copied().unwrap_or(0.0);
            let builder_type = preview
                .config_builder_map
                .get(&config_type)
                .cloned()
                .unwrap_or_else(|| "UNKNOWN".to_string());

            if confidence < LOW_CONFIDENCE {
                warnings.push(format!(
                    "Low confidence resolution for node '{}': {:.2}",
                    node, confidence
                ));
            }
            total_confidence += confidence;
            resolution_details.insert(
                node.clone(),
                ResolutionDetail {
                    config_type,
                    builder_type,
                    confidence,
                },
            );
        }
        warnings.extend(preview.ambiguous_resolutions.iter().cloned());

        let avg_confidence = if dag_nodes.is_empty() {
            0.0
        } else {
            total_confidence / dag_nodes.len() as f64
        };

        let mut metadata = IndexMap::new();
        metadata.insert("dag_nodes".to_string(), serde_json::json!(dag.node_count()));
        metadata.insert("dag_edges".to_string(), serde_json::json!(dag.edge_count()));
        metadata.insert("catalog_configs".to_string(), serde_json::json!(self.catalog.len()));
        metadata.insert(
            "supported_step_types".to_string(),
            serde_json::json!(self.supported_step_types()),
        );

        let report = ConversionReport {
            pipeline_name: output.pipeline.name().to_string(),
            steps: dag_nodes,
            resolution_details,
            avg_confidence,
            warnings,
            metadata,
            compiled_at: Utc::now(),
        };

        tracing::info!(summary = %report.summary(), "compilation completed with report");
        Ok((output, report))
    }

    /// Report the catalog's structure without compiling anything
    pub fn validate_catalog(&self) -> CatalogValidation {
        let mut config_types: Vec<String> = Vec::new();
        let mut errors = Vec::new();

        for (name, config) in self.catalog.configs() {
            let config_type = config.config_type().to_string();
            if self.builder_registry.step_type_for(&config_type).is_err() {
                errors.push(format!(
                    "config '{}' has unmapped type '{}'",
                    name, config_type
                ));
            }
            if !config_types.contains(&config_type) {
                config_types.push(config_type);
            }
        }

        CatalogValidation {
            valid: errors.is_empty(),
            config_count: self.catalog.len(),
            config_types,
            config_names: self.catalog.configs().keys().cloned().collect(),
            errors,
        }
    }
}

/// One-call compilation from DAG to executable pipeline
pub fn compile_dag_to_pipeline(
    dag: &PipelineDag,
    catalog: ConfigCatalog,
    builder_registry: Arc<BuilderRegistry>,
    session: SessionContext,
    role: Option<String>,
    pipeline_name: Option<&str>,
) -> Result<AssemblyOutput> {
    let mut compiler = DagCompiler::new(catalog, builder_registry, session);
    if let Some(role) = role {
        compiler = compiler.with_role(role);
    }
    compiler.compile(dag, pipeline_name)
}
